//! Core data models for the cup tracker.

mod game_result;
mod group;
mod ids;
mod player;
mod result_type;
mod team;

pub use game_result::*;
pub use group::*;
pub use ids::*;
pub use player::*;
pub use result_type::*;
pub use team::*;
