//! Roster model: one team within a league season.

use serde::{Deserialize, Serialize};

/// Season win/loss and points totals kept by the API per roster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterRecord {
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub ties: u32,
    /// Points-for, integer part.
    #[serde(default)]
    pub fpts: f64,
    #[serde(default)]
    pub fpts_against: Option<f64>,
}

/// A team in a league season.
///
/// `roster_id` is unique within one league season only; `owner_id` is the
/// stable identity across a league's history chain and the join key for
/// cross-season aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roster {
    pub roster_id: u32,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub players: Option<Vec<String>>,
    #[serde(default)]
    pub starters: Option<Vec<String>>,
    #[serde(default)]
    pub settings: RosterRecord,
}

impl Roster {
    pub fn points_for(&self) -> f64 {
        self.settings.fpts
    }
}

/// League member profile, used for display metadata only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueUser {
    pub user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub metadata: Option<UserMetadata>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub team_name: Option<String>,
}

impl LeagueUser {
    pub fn team_name(&self) -> Option<&str> {
        self.metadata.as_ref()?.team_name.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_deserializes_with_null_lists() {
        let json = r#"{
            "roster_id": 3,
            "owner_id": "u1",
            "players": null,
            "starters": null,
            "settings": {"wins": 8, "losses": 6, "ties": 0, "fpts": 1523.5}
        }"#;
        let roster: Roster = serde_json::from_str(json).unwrap();
        assert_eq!(roster.roster_id, 3);
        assert!(roster.players.is_none());
        assert_eq!(roster.points_for(), 1523.5);
    }

    #[test]
    fn test_roster_missing_settings_defaults_to_zero() {
        let roster: Roster = serde_json::from_str(r#"{"roster_id": 1}"#).unwrap();
        assert_eq!(roster.settings.wins, 0);
        assert_eq!(roster.points_for(), 0.0);
    }

    #[test]
    fn test_user_team_name() {
        let json = r#"{
            "user_id": "u1",
            "display_name": "dec",
            "metadata": {"team_name": "The Declanators"}
        }"#;
        let user: LeagueUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.team_name(), Some("The Declanators"));

        let bare: LeagueUser =
            serde_json::from_str(r#"{"user_id": "u2", "display_name": "x"}"#).unwrap();
        assert_eq!(bare.team_name(), None);
    }
}
