//! Round listings for a group: what is up next and what was just played.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::models::GameResult;

pub const DEFAULT_UPCOMING_ROUNDS: usize = 2;
pub const DEFAULT_RECENT_ROUNDS: usize = 2;

/// Games of one round, ordered by arena.
#[derive(Debug, Clone, Serialize)]
pub struct RoundSchedule<'a> {
    /// One-based round label
    pub label: String,
    pub games: Vec<&'a GameResult>,
}

/// The `count` earliest rounds that still have unfinished games.
pub fn upcoming_rounds<'a, F>(
    games: &[&'a GameResult],
    count: usize,
    arena_label: F,
) -> Vec<RoundSchedule<'a>>
where
    F: Fn(&GameResult) -> String,
{
    let pending: Vec<&GameResult> = games
        .iter()
        .copied()
        .filter(|g| !g.is_finished())
        .collect();
    let rounds: BTreeSet<u32> = pending.iter().map(|g| g.round_number).collect();

    rounds
        .into_iter()
        .take(count)
        .map(|round| round_schedule(round, &pending, &arena_label))
        .collect()
}

/// The `count` latest rounds with finished games, most recent first.
pub fn recent_rounds<'a, F>(
    games: &[&'a GameResult],
    count: usize,
    arena_label: F,
) -> Vec<RoundSchedule<'a>>
where
    F: Fn(&GameResult) -> String,
{
    let finished: Vec<&GameResult> = games
        .iter()
        .copied()
        .filter(|g| g.is_finished())
        .collect();
    let rounds: BTreeSet<u32> = finished.iter().map(|g| g.round_number).collect();

    rounds
        .into_iter()
        .rev()
        .take(count)
        .map(|round| round_schedule(round, &finished, &arena_label))
        .collect()
}

fn round_schedule<'a, F>(
    round: u32,
    games: &[&'a GameResult],
    arena_label: &F,
) -> RoundSchedule<'a>
where
    F: Fn(&GameResult) -> String,
{
    let mut round_games: Vec<&GameResult> = games
        .iter()
        .copied()
        .filter(|g| g.round_number == round)
        .collect();
    round_games.sort_by_cached_key(|g| arena_label(g));

    RoundSchedule {
        label: (round + 1).to_string(),
        games: round_games,
    }
}
