//! Derived positional statistics models.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::Position;

/// Season totals for one position, for one team or for the league average.
///
/// `games_played` counts the weeks the roster was active, independent of
/// whether it started anyone at this position that week, so
/// `avg_points_per_week` can be zero without being undefined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionStats {
    pub position: Position,
    pub total_points: f64,
    /// Starter slots filled at this position across counted weeks. Fractional
    /// for league averages (slots per team-week).
    pub starter_count: f64,
    pub games_played: u32,
    pub avg_points_per_week: f64,
    pub avg_points_per_starter: f64,
}

impl PositionStats {
    /// Zero stats for a position the team never started anyone at.
    pub fn empty(position: Position, games_played: u32) -> Self {
        Self {
            position,
            total_points: 0.0,
            starter_count: 0.0,
            games_played,
            avg_points_per_week: 0.0,
            avg_points_per_starter: 0.0,
        }
    }
}

/// A player's cumulative over/under-performance against the weekly positional
/// baseline, attributed to the owner who started them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerImpact {
    pub player_id: String,
    pub name: String,
    pub position: Position,
    /// Sum of weekly (points − league avg points-per-starter at position).
    pub total_pola: f64,
    pub weeks_started: u32,
    pub avg_pola: f64,
    pub owner_id: String,
    pub owner_name: String,
    /// Weeks the player was started, keyed by season, for traceability.
    pub started_weeks: HashMap<String, Vec<u32>>,
}

/// Owner display metadata attached to multi-team comparison output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterMeta {
    pub user_id: String,
    pub display_name: String,
    pub avatar: Option<String>,
    pub team_name: Option<String>,
}

/// Full positional-benchmark output for one league season.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueBenchmarkResult {
    pub league_id: String,
    pub league_name: String,
    /// The target owner's stats per position.
    pub user_stats: HashMap<Position, PositionStats>,
    /// League-average stats per position, normalized to the target owner's
    /// games played so the two sides compare on a matched denominator.
    pub league_average_stats: HashMap<Position, PositionStats>,
    /// Every started player's impact, sorted by total POLA descending.
    pub player_impacts: Vec<PlayerImpact>,
    /// Per-owner position stats for multi-team comparison views.
    pub all_roster_stats: HashMap<String, HashMap<Position, PositionStats>>,
    pub roster_meta: HashMap<String, RosterMeta>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_position_stats() {
        let stats = PositionStats::empty(Position::TE, 14);
        assert_eq!(stats.games_played, 14);
        assert_eq!(stats.avg_points_per_week, 0.0);
        assert_eq!(stats.avg_points_per_starter, 0.0);
    }

    #[test]
    fn test_benchmark_result_round_trips() {
        let result = LeagueBenchmarkResult {
            league_id: "1".to_string(),
            league_name: "L".to_string(),
            user_stats: HashMap::from([(Position::QB, PositionStats::empty(Position::QB, 10))]),
            league_average_stats: HashMap::new(),
            player_impacts: vec![],
            all_roster_stats: HashMap::new(),
            roster_meta: HashMap::new(),
        };
        let json = serde_json::to_string(&result).unwrap();
        let back: LeagueBenchmarkResult = serde_json::from_str(&json).unwrap();
        assert!(back.user_stats.contains_key(&Position::QB));
    }
}
