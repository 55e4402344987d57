//! Standings calculation engine.
//!
//! Computes derived results from a snapshot of group data:
//! - Per-team statistics over finished games
//! - Places via the tie-breaker cascade
//! - The head-to-head result table
//! - Upcoming and recent round listings

pub mod ranking;
pub mod schedule;
pub mod standings;
pub mod statistics;
pub mod table;

pub use ranking::{
    rank, Contender, RankedEntry, Ranking, RankingState, RankingStep, TieBreaker,
    TieBreakerOrder, UnknownTieBreaker, DEFAULT_TIE_BREAKERS,
};
pub use schedule::{recent_rounds, upcoming_rounds, RoundSchedule};
pub use standings::{compute_standings, GroupSource, HeadToHead, Standings, StandingsRow};
pub use statistics::{Statistic, TeamGames, TeamStatistics};
pub use table::{project_table, Cell, CellClass, ResultTable, TableRow};
