//! Derived standings models.

use serde::{Deserialize, Serialize};

/// Luck-adjusted record for one roster over one season.
///
/// `expected_wins` is the all-play total: for each active week, the fraction
/// of other active rosters the team outscored (ties count one-half). The gap
/// between `actual_wins` and `expected_wins` is the team's schedule luck.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpectedWinsStanding {
    pub roster_id: u32,
    pub actual_wins: f64,
    pub expected_wins: f64,
    pub points_for: f64,
    pub points_against: f64,
    /// Weeks in which the roster fielded a lineup.
    pub active_weeks: u32,
}

/// An expected-wins standing joined with owner display metadata, as consumed
/// by history views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerStanding {
    pub owner_id: String,
    pub display_name: String,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(flatten)]
    pub standing: ExpectedWinsStanding,
}

/// All owner standings for one analyzed league season.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonStandings {
    pub league_id: String,
    pub season: u32,
    pub standings: Vec<OwnerStanding>,
}

/// Resolved final placement for one roster in one season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalRank {
    /// 1-based final standing.
    pub rank: u32,
    /// True if the roster appeared in any bracket match, whether or not a
    /// placement match resolved its rank.
    pub made_playoffs: bool,
}

/// One league's outcome within a season performance scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaguePerformance {
    pub league_id: String,
    pub league_name: String,
    pub roster_id: u32,
    pub rank: u32,
    pub made_playoffs: bool,
    pub points_for: f64,
}
