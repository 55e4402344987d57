use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use codenames_cup::calculate::{
    compute_standings, project_table, recent_rounds, upcoming_rounds, GroupSource, RoundSchedule,
    Standings,
};
use codenames_cup::config::AppConfig;
use codenames_cup::models::{score_string, GameResult, Group, ResultType, TeamId};
use codenames_cup::storage::jsonl::merge_standard_result_types;
use codenames_cup::storage::{CupSnapshot, StorageConfig};

#[derive(Parser)]
#[command(name = "codenames-cup")]
#[command(about = "Standings and result tables for Codenames cup groups")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the standings of a group
    Standings {
        /// Group name, e.g. "A"
        #[arg(long)]
        group: String,

        /// Cup number (default: current cup from config)
        #[arg(long)]
        cup: Option<u32>,

        /// Print standings as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the result table of a group
    Table {
        #[arg(long)]
        group: String,

        #[arg(long)]
        cup: Option<u32>,
    },

    /// Show recent and upcoming rounds of a group
    Schedule {
        #[arg(long)]
        group: String,

        #[arg(long)]
        cup: Option<u32>,
    },

    /// Load the data directory and check it for consistency
    Validate,

    /// List the standard result types
    ResultTypes {
        /// Add missing standard result types to the data directory
        #[arg(long)]
        write: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = PathBuf::from(&cli.config);
    let mut config = AppConfig::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = PathBuf::from(data_dir);
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting codenames-cup v{}", env!("CARGO_PKG_VERSION"));

    let storage = StorageConfig::new(config.data_dir.clone());

    match cli.command {
        Commands::Standings { group, cup, json } => {
            let snapshot = CupSnapshot::load(&storage)?;
            let group = find_group(&snapshot, cup.unwrap_or(config.current_cup), &group)?;
            let standings = standings_for(&snapshot, group, &config)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&standings)?);
            } else {
                print_standings(&heading(&snapshot, group), &standings);
            }
        }

        Commands::Table { group, cup } => {
            let snapshot = CupSnapshot::load(&storage)?;
            let group = find_group(&snapshot, cup.unwrap_or(config.current_cup), &group)?;
            let standings = standings_for(&snapshot, group, &config)?;

            println!("\n=== {} ===", heading(&snapshot, group));
            print!("{}", project_table(&standings));
        }

        Commands::Schedule { group, cup } => {
            let snapshot = CupSnapshot::load(&storage)?;
            let group = find_group(&snapshot, cup.unwrap_or(config.current_cup), &group)?;
            let games = snapshot.group_games(&group.id);
            let label = |game: &GameResult| snapshot.arena_label(game);

            let recent = recent_rounds(&games, config.schedule.recent_rounds, label);
            let upcoming = upcoming_rounds(&games, config.schedule.upcoming_rounds, label);

            let title = heading(&snapshot, group);
            println!("\n=== {}: recent rounds ===", title);
            print_rounds(&snapshot, &recent);
            println!("\n=== {}: upcoming rounds ===", title);
            print_rounds(&snapshot, &upcoming);
        }

        Commands::Validate => {
            let snapshot = CupSnapshot::load(&storage)
                .with_context(|| format!("Validation of {:?} failed", storage.data_dir))?;
            let order = config.tie_breaker_order()?;

            println!("\n=== Validation Results ===");
            println!("Cups:             {}", snapshot.cups.len());
            println!("Players:          {}", snapshot.players.len());
            println!("Teams:            {}", snapshot.teams.len());
            println!("Groups:           {}", snapshot.groups.len());
            println!("Arenas:           {}", snapshot.arenas.len());
            println!("Result types:     {}", snapshot.result_types.len());
            println!("Games:            {}", snapshot.games.len());
            println!("Tie breakers:     {}", order.names().join(", "));

            let groups = snapshot.groups_of_cup(config.current_cup);
            if !groups.is_empty() {
                match snapshot.cup(config.current_cup) {
                    Some(cup) => println!("\n{}:", cup),
                    None => println!("\nCup {}:", config.current_cup),
                }
                for group in groups {
                    let games = snapshot.group_games(&group.id);
                    let finished = games.iter().filter(|g| g.is_finished()).count();
                    println!(
                        "  group {}: {} teams, {}/{} games finished",
                        group.short(),
                        snapshot.teams(&group.id).len(),
                        finished,
                        games.len()
                    );
                }
            }
        }

        Commands::ResultTypes { write } => {
            println!("\n=== Result Types ===");
            for rt in ResultType::standard_set() {
                let score = rt
                    .auto_score
                    .map(score_string)
                    .unwrap_or_else(|| "words".to_string());
                println!("  {:<3} {:<26} {}", rt.code, rt.description, score);
            }

            if write {
                let added = merge_standard_result_types(&storage)?;
                println!("\nAdded {} result types to {:?}", added, storage.data_dir);
            }
        }
    }

    Ok(())
}

fn find_group<'a>(snapshot: &'a CupSnapshot, cup: u32, name: &str) -> Result<&'a Group> {
    snapshot.group(cup, name).ok_or_else(|| {
        let known: Vec<&str> = snapshot
            .groups_of_cup(cup)
            .into_iter()
            .map(|g| g.short())
            .collect();
        anyhow!(
            "No group {} in cup {} (known groups: {})",
            name,
            cup,
            if known.is_empty() {
                "none".to_string()
            } else {
                known.join(", ")
            }
        )
    })
}

/// "Cup 5, 16.03.2024, Moscow, group A", or the bare group name without a stored cup.
fn heading(snapshot: &CupSnapshot, group: &Group) -> String {
    match snapshot.cup(group.cup_number) {
        Some(cup) => format!("{}, group {}", cup, group.short()),
        None => group.long(),
    }
}

fn standings_for(snapshot: &CupSnapshot, group: &Group, config: &AppConfig) -> Result<Standings> {
    let order = config.tie_breaker_order()?;
    let standings = compute_standings(snapshot, &group.id, &order);
    tracing::info!(
        "Computed standings for {}: {} teams, {:?}",
        group,
        standings.rows.len(),
        standings.state
    );
    Ok(standings)
}

fn print_standings(title: &str, standings: &Standings) {
    println!("\n=== {} ===", title);
    println!(
        "{:>2}  {:<32} {:>6} {:>4} {:>4} {:>5} {:>5}",
        "#", "Team", "Played", "Won", "Lost", "+/−", "Fouls"
    );
    for row in &standings.rows {
        let stats = &row.statistics;
        println!(
            "{:>2}  {:<32} {:>6} {:>4} {:>4} {:>5} {:>5}",
            row.place,
            row.name,
            stats.games_played,
            stats.won,
            stats.lost,
            stats.words_difference,
            stats.fouls
        );
    }

    let applied: Vec<String> = standings
        .steps
        .iter()
        .filter(|step| step.ties_after < step.ties_before)
        .map(|step| step.tie_breaker.name())
        .collect();
    if !applied.is_empty() {
        println!("\nDecided by: {}", applied.join(", "));
    }
    println!("State:      {:?}", standings.state);
}

fn print_rounds(snapshot: &CupSnapshot, rounds: &[RoundSchedule<'_>]) {
    if rounds.is_empty() {
        println!("  (none)");
        return;
    }

    let name = |id: &TeamId| {
        snapshot
            .team(id)
            .map(|team| snapshot.team_name(team))
            .unwrap_or_else(|| id.to_string())
    };

    for round in rounds {
        println!("Round {}", round.label);
        for game in &round.games {
            let result = match &game.result_type {
                Some(rt) if rt.is_auto => format!("{} ({})", score_string(game.effective_score()), rt),
                Some(_) => score_string(game.effective_score()),
                None => String::new(),
            };
            println!(
                "  {:<4} {} vs {}  {}",
                snapshot.arena_label(game),
                name(&game.home_team),
                name(&game.away_team),
                result
            );
        }
    }
}
