//! Core data models for league analytics.

mod bracket;
mod league;
mod matchup;
mod player;
mod roster;
mod standings;
mod stats;

pub use bracket::*;
pub use league::*;
pub use matchup::*;
pub use player::*;
pub use roster::*;
pub use standings::*;
pub use stats::*;
