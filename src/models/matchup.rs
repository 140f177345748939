//! Weekly matchup record model.

use serde::{Deserialize, Serialize};

/// One roster's side of a head-to-head pairing for one week.
///
/// `matchup_id` groups the two rosters of a pairing. A record with no
/// starters, or with `matchup_id == 0` and zero points, is a placeholder for
/// a team that did not field a lineup; such records are excluded from every
/// aggregate, and the same predicate (`is_active`) is applied everywhere
/// weekly data is consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyMatchupRecord {
    pub roster_id: u32,
    #[serde(default)]
    pub matchup_id: Option<u32>,
    /// Full roster that week, starters and bench.
    #[serde(default)]
    pub players: Option<Vec<String>>,
    #[serde(default)]
    pub starters: Option<Vec<String>>,
    /// Per-starter points, parallel to `starters`. A missing array is
    /// treated as all-zero rather than rejecting the record.
    #[serde(default)]
    pub starters_points: Option<Vec<f64>>,
    #[serde(default)]
    pub points: f64,
}

impl WeeklyMatchupRecord {
    /// Whether this roster actually played this week.
    pub fn is_active(&self) -> bool {
        let has_starters = self
            .starters
            .as_ref()
            .map(|s| !s.is_empty())
            .unwrap_or(false);
        if !has_starters {
            return false;
        }
        !(self.matchup_id.unwrap_or(0) == 0 && self.points == 0.0)
    }

    /// Points scored by the starter at `index`; 0 when the points array is
    /// missing or short.
    pub fn starter_points(&self, index: usize) -> f64 {
        self.starters_points
            .as_ref()
            .and_then(|p| p.get(index))
            .copied()
            .unwrap_or(0.0)
    }

    /// Iterate over (player_id, points) for each starter slot.
    pub fn starter_lines(&self) -> impl Iterator<Item = (&str, f64)> {
        self.starters
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), self.starter_points(i)))
    }
}

/// All matchup records for one scored week.
#[derive(Debug, Clone)]
pub struct WeekRecords {
    pub week: u32,
    pub records: Vec<WeeklyMatchupRecord>,
}

impl WeekRecords {
    /// Records for rosters that fielded a lineup this week.
    pub fn active(&self) -> impl Iterator<Item = &WeeklyMatchupRecord> {
        self.records.iter().filter(|r| r.is_active())
    }
}
