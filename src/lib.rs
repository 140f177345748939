//! # League Lens
//!
//! Fantasy-football league analytics over the Sleeper API.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (leagues, rosters, matchups, brackets)
//! - **client**: Typed read-only API wrapper with batched multi-league fetches
//! - **cache**: Tiered TTL cache (in-memory session scope + persisted local scope)
//! - **analysis**: Derived metrics — expected wins, positional benchmarks,
//!   final-rank resolution, cross-season rollups
//! - **scan**: Orchestration joining client and analysis with progress and
//!   cooperative cancellation
//! - **config**: Configuration loading and validation

pub mod analysis;
pub mod cache;
pub mod client;
pub mod config;
pub mod models;
pub mod progress;
pub mod scan;

pub use models::*;
