//! Result table projection.
//!
//! Turns computed standings into a presentation grid: rows in rank order and
//! head-to-head columns in the same rank order.

use std::fmt;

use serde::Serialize;

use super::standings::{HeadToHead, Standings, StandingsRow};
use crate::models::{score_string, GameResult};

pub const SCHEDULED_TOOLTIP: &str = "Game hasn't finished yet";

/// How a head-to-head cell should be styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellClass {
    Scheduled,
    Win,
    AutoWin,
    Loss,
    AutoLoss,
    Itself,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub content: String,
    pub classification: CellClass,
    pub tooltip: Option<String>,
}

impl Cell {
    fn itself() -> Self {
        Self {
            content: String::new(),
            classification: CellClass::Itself,
            tooltip: None,
        }
    }

    fn not_scheduled() -> Self {
        Self {
            content: String::new(),
            classification: CellClass::Scheduled,
            tooltip: None,
        }
    }

    /// Cell for `game` as seen by the home or the away team.
    pub fn for_game(game: &GameResult, is_home: bool) -> Self {
        let Some(rt) = &game.result_type else {
            return Self {
                content: format!("R{}", game.round_number + 1),
                classification: CellClass::Scheduled,
                tooltip: Some(SCHEDULED_TOOLTIP.to_string()),
            };
        };

        let classification = match (rt.is_home_win == is_home, rt.is_auto) {
            (true, false) => CellClass::Win,
            (true, true) => CellClass::AutoWin,
            (false, false) => CellClass::Loss,
            (false, true) => CellClass::AutoLoss,
        };
        let score = if is_home {
            game.effective_score()
        } else {
            -game.effective_score()
        };

        Self {
            content: score_string(score),
            classification,
            tooltip: rt.is_auto.then(|| rt.description.clone()),
        }
    }
}

/// One team's line of the result table.
#[derive(Debug, Clone, Serialize)]
pub struct TableRow {
    pub place: usize,
    pub team: String,
    /// Head-to-head cells in rank order
    pub results: Vec<Cell>,
    pub played: i64,
    pub won: i64,
    pub lost: i64,
    pub words_difference: i64,
    pub fouls: i64,
}

impl TableRow {
    fn summary_cells(&self) -> [String; 5] {
        [
            self.played.to_string(),
            self.won.to_string(),
            self.lost.to_string(),
            format_difference(self.words_difference),
            self.fouls.to_string(),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultTable {
    pub header: Vec<String>,
    pub rows: Vec<TableRow>,
}

/// Build the result table from standings, re-indexing head-to-head results
/// from seed order to rank order.
pub fn project_table(standings: &Standings) -> ResultTable {
    let group_size = standings.rows.len();

    let mut header = vec!["#".to_string(), "Team".to_string()];
    header.extend((1..=group_size).map(|i| i.to_string()));
    header.extend(
        ["Played", "Won", "Lost", "+/−", "Fouls"]
            .iter()
            .map(|s| s.to_string()),
    );

    let rows = standings
        .rows
        .iter()
        .map(|row| project_row(row, standings))
        .collect();

    ResultTable { header, rows }
}

fn project_row(row: &StandingsRow, standings: &Standings) -> TableRow {
    let results = standings
        .rows
        .iter()
        .map(|rival| {
            match row.opponents.get(rival.slot) {
                Some(HeadToHead::Itself) => Cell::itself(),
                Some(HeadToHead::Game { game, is_home }) => Cell::for_game(game, *is_home),
                Some(HeadToHead::NotScheduled) | None => Cell::not_scheduled(),
            }
        })
        .collect();

    let stats = &row.statistics;
    TableRow {
        place: row.place,
        team: row.name.clone(),
        results,
        played: stats.games_played,
        won: stats.won,
        lost: stats.lost,
        words_difference: stats.words_difference,
        fouls: stats.fouls,
    }
}

fn format_difference(value: i64) -> String {
    if value > 0 {
        format!("+{}", value)
    } else {
        value.to_string()
    }
}

impl fmt::Display for ResultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<Vec<String>> = std::iter::once(self.header.clone())
            .chain(self.rows.iter().map(|row| {
                let mut line = vec![row.place.to_string(), row.team.clone()];
                line.extend(row.results.iter().map(|cell| match cell.classification {
                    CellClass::Itself => "X".to_string(),
                    _ => cell.content.clone(),
                }));
                line.extend(row.summary_cells());
                line
            }))
            .collect();

        let columns = self.header.len();
        let widths: Vec<usize> = (0..columns)
            .map(|i| {
                lines
                    .iter()
                    .filter_map(|line| line.get(i))
                    .map(|s| s.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        for line in &lines {
            let padded: Vec<String> = line
                .iter()
                .zip(&widths)
                .enumerate()
                .map(|(i, (value, width))| {
                    if i == 1 {
                        format!("{:<width$}", value, width = width)
                    } else {
                        format!("{:>width$}", value, width = width)
                    }
                })
                .collect();
            writeln!(f, "{}", padded.join("  ").trim_end())?;
        }
        Ok(())
    }
}
