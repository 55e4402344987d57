//! # Codenames Cup
//!
//! Standings engine for round-robin Codenames cup groups.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (players, teams, groups, games, result types)
//! - **calculate**: Statistics, tie-breaker ranking, result tables and round listings
//! - **storage**: Filesystem data lake operations (JSONL) and validated snapshots
//! - **config**: Configuration loading and validation

pub mod calculate;
pub mod config;
pub mod models;
pub mod storage;

pub use models::*;
