//! Read-only snapshot of the cup data.
//!
//! Everything is read once, checked against the model invariants and then
//! served to the standings engine through [`GroupSource`].

use std::collections::{HashMap, HashSet};

use tracing::info;

use super::jsonl::{EntityType, JsonlReader};
use super::{StorageConfig, StorageError};
use crate::calculate::standings::GroupSource;
use crate::models::{
    Arena, Cup, GameRecord, GameResult, Group, GroupId, Player, PlayerId, ResultType, Team, TeamId,
    MAX_ARENAS_NUMBER, MAX_GROUP_SIZE,
};

/// Validated cup data.
#[derive(Debug, Clone, Default)]
pub struct CupSnapshot {
    pub cups: Vec<Cup>,
    pub players: Vec<Player>,
    pub teams: Vec<Team>,
    pub groups: Vec<Group>,
    pub arenas: Vec<Arena>,
    pub result_types: Vec<ResultType>,
    pub games: Vec<GameResult>,
}

impl CupSnapshot {
    /// Load every entity file under the data directory. Cups, players, teams
    /// and groups must exist; arenas and games may be absent.
    pub fn load(config: &StorageConfig) -> Result<Self, StorageError> {
        let result_types_reader: JsonlReader<ResultType> =
            JsonlReader::for_entity(config, EntityType::ResultType);
        let result_types = if result_types_reader.exists() {
            result_types_reader.read_all()?
        } else {
            info!("No stored result types, using the standard set");
            ResultType::standard_set()
        };

        let snapshot = Self::from_parts(
            JsonlReader::for_entity(config, EntityType::Cup).read_existing()?,
            JsonlReader::for_entity(config, EntityType::Player).read_existing()?,
            JsonlReader::for_entity(config, EntityType::Team).read_existing()?,
            JsonlReader::for_entity(config, EntityType::Group).read_existing()?,
            JsonlReader::for_entity(config, EntityType::Arena).read_all()?,
            result_types,
            JsonlReader::for_entity(config, EntityType::Game).read_all()?,
        )?;

        info!(
            "Loaded {} cups, {} players, {} teams, {} groups, {} arenas, {} result types, {} games from {:?}",
            snapshot.cups.len(),
            snapshot.players.len(),
            snapshot.teams.len(),
            snapshot.groups.len(),
            snapshot.arenas.len(),
            snapshot.result_types.len(),
            snapshot.games.len(),
            config.data_dir
        );
        Ok(snapshot)
    }

    /// Build a snapshot from already parsed entities, resolving result codes
    /// and rejecting inconsistent data.
    pub fn from_parts(
        cups: Vec<Cup>,
        players: Vec<Player>,
        teams: Vec<Team>,
        groups: Vec<Group>,
        arenas: Vec<Arena>,
        result_types: Vec<ResultType>,
        records: Vec<GameRecord>,
    ) -> Result<Self, StorageError> {
        check_result_types(&result_types)?;
        check_cups(&cups, &groups)?;
        check_arenas(&arenas, &groups)?;
        check_seeds(&teams, &groups)?;

        let mut snapshot = Self {
            cups,
            players,
            teams,
            groups,
            arenas,
            result_types,
            games: Vec::with_capacity(records.len()),
        };

        for record in records {
            let game = snapshot.resolve(record)?;
            snapshot.games.push(game);
        }

        Ok(snapshot)
    }

    fn resolve(&self, record: GameRecord) -> Result<GameResult, StorageError> {
        let result_type = match &record.result_type {
            None => None,
            Some(code) => Some(self.result_type(code).cloned().ok_or_else(|| {
                StorageError::Inconsistent(format!(
                    "game {}: unknown result type {}",
                    record.id, code
                ))
            })?),
        };

        for team_id in [&record.home_team, &record.away_team] {
            let in_group = self
                .team(team_id)
                .is_some_and(|t| t.group_id.as_ref() == Some(&record.group_id));
            if !in_group {
                return Err(StorageError::Inconsistent(format!(
                    "game {}: team {} is not in group {}",
                    record.id, team_id, record.group_id
                )));
            }
        }
        if record.home_team == record.away_team {
            return Err(StorageError::Inconsistent(format!(
                "game {}: team {} plays itself",
                record.id, record.home_team
            )));
        }

        let game = record.resolve(result_type);
        game.validate()
            .map_err(|e| StorageError::Inconsistent(e.to_string()))?;
        Ok(game)
    }

    pub fn team(&self, id: &TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| &t.id == id)
    }

    pub fn cup(&self, number: u32) -> Option<&Cup> {
        self.cups.iter().find(|c| c.number == number)
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    /// Look up a group by cup number and name (case-insensitive).
    pub fn group(&self, cup_number: u32, name: &str) -> Option<&Group> {
        self.groups
            .iter()
            .find(|g| g.cup_number == cup_number && g.name.eq_ignore_ascii_case(name))
    }

    /// Groups of one cup, by name.
    pub fn groups_of_cup(&self, cup_number: u32) -> Vec<&Group> {
        let mut groups: Vec<&Group> = self
            .groups
            .iter()
            .filter(|g| g.cup_number == cup_number)
            .collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        groups
    }

    pub fn group_games(&self, group: &GroupId) -> Vec<&GameResult> {
        self.games.iter().filter(|g| &g.group_id == group).collect()
    }

    /// Short arena name of a game, e.g. "A3"; empty when no arena is assigned.
    pub fn arena_label(&self, game: &GameResult) -> String {
        let arena = game
            .arena_id
            .as_ref()
            .and_then(|id| self.arenas.iter().find(|a| &a.id == id));
        let group = self.groups.iter().find(|g| g.id == game.group_id);
        match (arena, group) {
            (Some(arena), Some(group)) => arena.short(group),
            _ => String::new(),
        }
    }
}

impl GroupSource for CupSnapshot {
    fn teams(&self, group: &GroupId) -> Vec<&Team> {
        self.teams
            .iter()
            .filter(|t| t.group_id.as_ref() == Some(group))
            .collect()
    }

    fn games_where_team_is_home(&self, team: &TeamId, group: &GroupId) -> Vec<&GameResult> {
        self.games
            .iter()
            .filter(|g| &g.group_id == group && &g.home_team == team)
            .collect()
    }

    fn games_where_team_is_away(&self, team: &TeamId, group: &GroupId) -> Vec<&GameResult> {
        self.games
            .iter()
            .filter(|g| &g.group_id == group && &g.away_team == team)
            .collect()
    }

    fn result_type(&self, code: &str) -> Option<&ResultType> {
        self.result_types.iter().find(|rt| rt.code == code)
    }

    fn team_name(&self, team: &Team) -> String {
        match (self.player(&team.first_player), self.player(&team.second_player)) {
            (Some(first), Some(second)) => Team::short_name(first, second),
            _ => team.id.to_string(),
        }
    }
}

fn check_result_types(result_types: &[ResultType]) -> Result<(), StorageError> {
    let mut codes = HashSet::new();
    for rt in result_types {
        rt.validate()
            .map_err(|e| StorageError::Inconsistent(e.to_string()))?;
        if !codes.insert(rt.code.as_str()) {
            return Err(StorageError::Inconsistent(format!(
                "duplicate result type code {}",
                rt.code
            )));
        }
    }
    Ok(())
}

/// Cup numbers are positive and unique, and every group belongs to a stored cup.
fn check_cups(cups: &[Cup], groups: &[Group]) -> Result<(), StorageError> {
    let mut numbers = HashSet::new();
    for cup in cups {
        if cup.number == 0 {
            return Err(StorageError::Inconsistent(
                "cup number must be positive".to_string(),
            ));
        }
        if !numbers.insert(cup.number) {
            return Err(StorageError::Inconsistent(format!(
                "cup {} is stored twice",
                cup.number
            )));
        }
    }
    for group in groups {
        if !numbers.contains(&group.cup_number) {
            return Err(StorageError::Inconsistent(format!(
                "{}: unknown cup {}",
                group, group.cup_number
            )));
        }
    }
    Ok(())
}

fn check_arenas(arenas: &[Arena], groups: &[Group]) -> Result<(), StorageError> {
    for arena in arenas {
        if arena.number > MAX_ARENAS_NUMBER {
            return Err(StorageError::Inconsistent(format!(
                "arena {}: number {} is above {}",
                arena.id, arena.number, MAX_ARENAS_NUMBER
            )));
        }
        if !groups.iter().any(|g| g.id == arena.group_id) {
            return Err(StorageError::Inconsistent(format!(
                "arena {}: unknown group {}",
                arena.id, arena.group_id
            )));
        }
    }
    Ok(())
}

/// Within every group, seeds must be present, unique and cover `[0, n)`.
fn check_seeds(teams: &[Team], groups: &[Group]) -> Result<(), StorageError> {
    let mut by_group: HashMap<&GroupId, Vec<&Team>> = HashMap::new();
    for team in teams {
        if let Some(group_id) = &team.group_id {
            by_group.entry(group_id).or_default().push(team);
        }
    }

    for (group_id, members) in by_group {
        let Some(group) = groups.iter().find(|g| &g.id == group_id) else {
            return Err(StorageError::Inconsistent(format!(
                "unknown group {} referenced by team {}",
                group_id, members[0].id
            )));
        };
        let size = members.len();
        if size > MAX_GROUP_SIZE as usize {
            return Err(StorageError::Inconsistent(format!(
                "{}: {} teams, at most {} allowed",
                group, size, MAX_GROUP_SIZE
            )));
        }

        let mut seen = HashSet::new();
        for team in members {
            let seed = team.seed.ok_or_else(|| {
                StorageError::Inconsistent(format!("{}: team {} has no seed", group, team.id))
            })?;
            if seed as usize >= size {
                return Err(StorageError::Inconsistent(format!(
                    "{}: team {} has seed {} outside [0, {})",
                    group, team.id, seed, size
                )));
            }
            if !seen.insert(seed) {
                return Err(StorageError::Inconsistent(format!(
                    "{}: seed {} is used twice",
                    group, seed
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::ranking::TieBreakerOrder;
    use crate::calculate::standings::compute_standings;
    use crate::storage::jsonl::JsonlWriter;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    struct Fixture {
        cup: Cup,
        players: Vec<Player>,
        teams: Vec<Team>,
        group: Group,
        arenas: Vec<Arena>,
    }

    fn fixture() -> Fixture {
        let cup = Cup::new(5)
            .with_date(NaiveDate::from_ymd_opt(2024, 3, 16).unwrap())
            .with_place("Moscow");
        let group = Group::new(5, "A".to_string());
        let names = [
            ("Ivan", "Ivanov"),
            ("Petr", "Petrov"),
            ("Anna", "Smirnova"),
            ("Olga", "Volkova"),
            ("Egor", "Kuznetsov"),
            ("Maria", "Popova"),
        ];
        let players: Vec<Player> = names
            .iter()
            .map(|(first, last)| Player::new(first.to_string(), last.to_string()))
            .collect();
        let teams = players
            .chunks(2)
            .enumerate()
            .map(|(seed, pair)| {
                Team::new(pair[0].id.clone(), pair[1].id.clone())
                    .in_group(group.id.clone(), seed as u32)
            })
            .collect();
        let arenas = vec![
            Arena::new(group.id.clone(), 1),
            Arena::new(group.id.clone(), 2),
        ];
        Fixture {
            cup,
            players,
            teams,
            group,
            arenas,
        }
    }

    impl Fixture {
        fn game(&self, round: u32, home: usize, away: usize) -> GameRecord {
            GameRecord::new(
                self.group.id.clone(),
                round,
                self.teams[home].id.clone(),
                self.teams[away].id.clone(),
            )
            .with_arena(self.arenas[(home + away) % 2].id.clone())
        }

        fn snapshot(&self, games: Vec<GameRecord>) -> Result<CupSnapshot, StorageError> {
            CupSnapshot::from_parts(
                vec![self.cup.clone()],
                self.players.clone(),
                self.teams.clone(),
                vec![self.group.clone()],
                self.arenas.clone(),
                ResultType::standard_set(),
                games,
            )
        }

        fn write_to(&self, config: &StorageConfig, games: &[GameRecord]) {
            JsonlWriter::for_entity(config, EntityType::Cup)
                .write_all(&[self.cup.clone()])
                .unwrap();
            JsonlWriter::for_entity(config, EntityType::Player)
                .write_all(&self.players)
                .unwrap();
            JsonlWriter::for_entity(config, EntityType::Team)
                .write_all(&self.teams)
                .unwrap();
            JsonlWriter::for_entity(config, EntityType::Group)
                .write_all(&[self.group.clone()])
                .unwrap();
            JsonlWriter::for_entity(config, EntityType::Arena)
                .write_all(&self.arenas)
                .unwrap();
            JsonlWriter::for_entity(config, EntityType::Game)
                .write_all(games)
                .unwrap();
        }
    }

    fn inconsistent(result: Result<CupSnapshot, StorageError>) -> String {
        match result {
            Err(StorageError::Inconsistent(message)) => message,
            other => panic!("expected inconsistent data, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_load_from_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config = StorageConfig::new(temp_dir.path().to_path_buf());
        let f = fixture();
        f.write_to(
            &config,
            &[
                f.game(0, 0, 1).with_result("W1", 4).with_fouls(1, 0),
                f.game(1, 2, 0),
            ],
        );

        let snapshot = CupSnapshot::load(&config).unwrap();

        assert_eq!(snapshot.teams.len(), 3);
        assert_eq!(snapshot.games.len(), 2);
        assert_eq!(
            snapshot.cup(5).map(|c| c.to_string()).as_deref(),
            Some("Cup 5, 16.03.2024, Moscow")
        );
        // result_types.jsonl is absent
        assert_eq!(snapshot.result_types.len(), 10);
        assert!(snapshot.games[0].is_finished());
        assert!(!snapshot.games[1].is_finished());
    }

    #[test]
    fn test_group_source_views() {
        let f = fixture();
        let snapshot = f
            .snapshot(vec![
                f.game(0, 0, 1).with_result("W2", -3),
                f.game(1, 2, 0).with_result("B1", 0),
            ])
            .unwrap();
        let group = &f.group.id;
        let first = &f.teams[0].id;

        assert_eq!(snapshot.teams(group).len(), 3);
        assert_eq!(snapshot.games_where_team_is_home(first, group).len(), 1);
        assert_eq!(snapshot.games_where_team_is_away(first, group).len(), 1);
        assert_eq!(snapshot.result_type("T2").map(|rt| rt.is_auto), Some(true));
        assert_eq!(snapshot.team_name(&f.teams[0]), "Ivanov I./Petrov P.");
        assert_eq!(snapshot.group(5, "a").map(|g| &g.id), Some(group));
        assert!(snapshot.group(4, "A").is_none());
        assert_eq!(snapshot.groups_of_cup(5).len(), 1);
        assert_eq!(snapshot.group_games(group).len(), 2);
    }

    #[test]
    fn test_arena_label() {
        let f = fixture();
        let snapshot = f.snapshot(vec![f.game(0, 0, 1)]).unwrap();
        assert_eq!(snapshot.arena_label(&snapshot.games[0]), "A2");

        let mut unassigned = snapshot.games[0].clone();
        unassigned.arena_id = None;
        assert_eq!(snapshot.arena_label(&unassigned), "");
    }

    #[test]
    fn test_snapshot_feeds_standings() {
        let f = fixture();
        let snapshot = f
            .snapshot(vec![
                f.game(0, 0, 1).with_result("W2", -3),
                f.game(1, 2, 0).with_result("A2", 0),
                f.game(2, 1, 2).with_result("W1", 1),
            ])
            .unwrap();

        let standings = compute_standings(&snapshot, &f.group.id, &TieBreakerOrder::default());
        let seeds: Vec<u32> = standings.rows.iter().map(|r| r.seed).collect();
        // seed 1 won twice; seed 0 won by forfeit, seed 2 was absent
        assert_eq!(seeds, vec![1, 0, 2]);
        assert_eq!(standings.rows[0].name, "Smirnova A./Volkova O.");
    }

    #[test]
    fn test_unknown_result_code() {
        let f = fixture();
        let message = inconsistent(f.snapshot(vec![f.game(0, 0, 1).with_result("Z9", 2)]));
        assert!(message.contains("unknown result type Z9"));
    }

    #[test]
    fn test_bad_score_is_rejected() {
        let f = fixture();
        let message = inconsistent(f.snapshot(vec![f.game(0, 0, 1).with_result("W1", -2)]));
        assert!(message.contains("contradicts the winner"));
    }

    #[test]
    fn test_team_outside_group() {
        let mut f = fixture();
        f.teams[2].group_id = None;
        let message = inconsistent(f.snapshot(vec![f.game(0, 0, 2)]));
        assert!(message.contains("is not in group"));
    }

    #[test]
    fn test_duplicate_seed() {
        let mut f = fixture();
        f.teams[2].seed = Some(0);
        let message = inconsistent(f.snapshot(Vec::new()));
        assert!(message.contains("used twice"));
    }

    #[test]
    fn test_missing_and_out_of_range_seed() {
        let mut f = fixture();
        f.teams[1].seed = None;
        assert!(inconsistent(f.snapshot(Vec::new())).contains("has no seed"));

        let mut f = fixture();
        f.teams[1].seed = Some(3);
        assert!(inconsistent(f.snapshot(Vec::new())).contains("outside [0, 3)"));
    }

    #[test]
    fn test_invalid_result_type_file() {
        let f = fixture();
        let mut types = ResultType::standard_set();
        types.push(ResultType::words("W1", "duplicate", true));
        let result = CupSnapshot::from_parts(
            vec![f.cup.clone()],
            f.players.clone(),
            f.teams.clone(),
            vec![f.group.clone()],
            f.arenas.clone(),
            types,
            Vec::new(),
        );
        assert!(inconsistent(result).contains("duplicate result type code W1"));
    }

    #[test]
    fn test_missing_required_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = StorageConfig::new(temp_dir.path().to_path_buf());
        let f = fixture();
        f.write_to(&config, &[]);
        std::fs::remove_file(config.entity_path(EntityType::Cup)).unwrap();

        match CupSnapshot::load(&config) {
            Err(StorageError::PathNotFound(path)) => {
                assert_eq!(path, temp_dir.path().join("cups.jsonl"))
            }
            other => panic!("expected a missing file, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_optional_files_may_be_absent() {
        let temp_dir = TempDir::new().unwrap();
        let config = StorageConfig::new(temp_dir.path().to_path_buf());
        let f = fixture();
        f.write_to(&config, &[]);
        std::fs::remove_file(config.entity_path(EntityType::Game)).unwrap();
        std::fs::remove_file(config.entity_path(EntityType::Arena)).unwrap();

        let snapshot = CupSnapshot::load(&config).unwrap();
        assert!(snapshot.games.is_empty());
        assert!(snapshot.arenas.is_empty());
    }

    #[test]
    fn test_group_of_unknown_cup() {
        let mut f = fixture();
        f.cup = Cup::new(4);
        let message = inconsistent(f.snapshot(Vec::new()));
        assert!(message.contains("unknown cup 5"), "{}", message);
    }

    #[test]
    fn test_duplicate_cup() {
        let f = fixture();
        let result = CupSnapshot::from_parts(
            vec![f.cup.clone(), Cup::new(5)],
            f.players.clone(),
            f.teams.clone(),
            vec![f.group.clone()],
            f.arenas.clone(),
            ResultType::standard_set(),
            Vec::new(),
        );
        assert!(inconsistent(result).contains("cup 5 is stored twice"));
    }
}
