//! Derived-metric computation engines.
//!
//! Pure functions over already-fetched weekly data:
//! - **expected_wins**: all-play luck-adjusted standings
//! - **benchmarks**: positional output/efficiency vs the league average and
//!   per-player POLA attribution
//! - **bracket**: final-rank resolution from placement matches
//! - **aggregate**: cross-season and cross-league rollups

pub mod aggregate;
pub mod benchmarks;
pub mod bracket;
pub mod expected_wins;

pub use aggregate::*;
pub use benchmarks::*;
pub use bracket::*;
pub use expected_wins::*;
