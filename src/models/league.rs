//! League season snapshot model.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a league season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeagueStatus {
    PreDraft,
    Drafting,
    InSeason,
    Playoffs,
    Complete,
    /// Statuses the API may add that we don't interpret.
    #[serde(other)]
    Unknown,
}

impl LeagueStatus {
    /// Whether at least one week of this season has been scored.
    pub fn has_games(&self) -> bool {
        matches!(
            self,
            LeagueStatus::InSeason | LeagueStatus::Playoffs | LeagueStatus::Complete
        )
    }
}

/// Scoring-relevant league settings.
///
/// The API returns many more settings; only the fields the analytics engines
/// read are modeled. Absent fields fall back to the standard NFL schedule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeagueSettings {
    pub start_week: Option<u32>,
    pub playoff_week_start: Option<u32>,
    pub last_scored_leg: Option<u32>,
    pub playoff_teams: Option<u32>,
    /// League type; 3 = guillotine/elimination.
    #[serde(rename = "type")]
    pub league_type: Option<u32>,
    /// 1 = best-ball (no managed lineups).
    pub best_ball: Option<u32>,
}

impl LeagueSettings {
    pub fn start_week(&self) -> u32 {
        self.start_week.unwrap_or(1)
    }

    pub fn playoff_week_start(&self) -> u32 {
        self.playoff_week_start.unwrap_or(15)
    }

    pub fn last_scored_week(&self) -> u32 {
        self.last_scored_leg.unwrap_or(18)
    }
}

/// One season of a league, as returned by the remote API.
///
/// Seasons form a chain: each snapshot optionally points at its predecessor
/// via `previous_league_id` (an id-only weak reference, never an owned link).
/// A snapshot is immutable once `status` is `Complete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueSnapshot {
    pub league_id: String,
    pub name: String,
    /// Season year as the API sends it ("2024").
    pub season: String,
    pub status: LeagueStatus,
    pub total_rosters: u32,
    #[serde(default)]
    pub previous_league_id: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub settings: LeagueSettings,
}

impl LeagueSnapshot {
    /// Season year as a number; 0 if the API sends something unparseable.
    pub fn season_year(&self) -> u32 {
        self.season.parse().unwrap_or(0)
    }

    /// Leagues excluded from comparative analysis: elimination formats and
    /// best-ball have no meaningful head-to-head lineups, and test/mock
    /// leagues pollute multi-league aggregates.
    pub fn should_ignore(&self) -> bool {
        if self.settings.league_type == Some(3) {
            return true;
        }
        if self.settings.best_ball == Some(1) {
            return true;
        }

        let name = self.name.to_lowercase();
        ["test", "mock", "guillotine", "chopped", "eliminator"]
            .iter()
            .any(|kw| name.contains(kw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(name: &str) -> LeagueSnapshot {
        LeagueSnapshot {
            league_id: "111".to_string(),
            name: name.to_string(),
            season: "2024".to_string(),
            status: LeagueStatus::Complete,
            total_rosters: 12,
            previous_league_id: None,
            avatar: None,
            settings: LeagueSettings::default(),
        }
    }

    #[test]
    fn test_status_deserializes_unknown_variant() {
        let status: LeagueStatus = serde_json::from_str("\"post_season\"").unwrap();
        assert_eq!(status, LeagueStatus::Unknown);
    }

    #[test]
    fn test_status_has_games() {
        assert!(LeagueStatus::Complete.has_games());
        assert!(LeagueStatus::InSeason.has_games());
        assert!(!LeagueStatus::PreDraft.has_games());
    }

    #[test]
    fn test_settings_defaults() {
        let settings = LeagueSettings::default();
        assert_eq!(settings.start_week(), 1);
        assert_eq!(settings.playoff_week_start(), 15);
        assert_eq!(settings.last_scored_week(), 18);
    }

    #[test]
    fn test_season_year() {
        assert_eq!(snapshot("A").season_year(), 2024);

        let mut bad = snapshot("A");
        bad.season = "n/a".to_string();
        assert_eq!(bad.season_year(), 0);
    }

    #[test]
    fn test_should_ignore_by_name() {
        assert!(snapshot("Guillotine League").should_ignore());
        assert!(snapshot("My Mock Draft").should_ignore());
        assert!(!snapshot("Dynasty Warriors").should_ignore());
    }

    #[test]
    fn test_should_ignore_by_settings() {
        let mut league = snapshot("Serious League");
        league.settings.league_type = Some(3);
        assert!(league.should_ignore());

        let mut league = snapshot("Serious League");
        league.settings.best_ball = Some(1);
        assert!(league.should_ignore());
    }

    #[test]
    fn test_snapshot_deserializes_api_shape() {
        let json = r#"{
            "league_id": "987",
            "name": "The League",
            "season": "2023",
            "status": "complete",
            "total_rosters": 10,
            "previous_league_id": "654",
            "settings": {"playoff_week_start": 15, "last_scored_leg": 17}
        }"#;
        let league: LeagueSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(league.previous_league_id.as_deref(), Some("654"));
        assert_eq!(league.settings.last_scored_week(), 17);
        assert_eq!(league.settings.start_week(), 1);
    }
}
