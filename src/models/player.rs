//! Player reference data and the local player directory.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lineup positions that participate in positional aggregation.
///
/// Anything else the directory reports (IDP slots, unknown ids, long-snappers)
/// maps to `Other` and is excluded from per-position stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    QB,
    RB,
    WR,
    TE,
    K,
    DEF,
    Other,
}

/// The positions counted in positional benchmarks, in display order.
pub const SCORED_POSITIONS: [Position; 6] = [
    Position::QB,
    Position::RB,
    Position::WR,
    Position::TE,
    Position::K,
    Position::DEF,
];

impl Position {
    pub fn parse(s: &str) -> Self {
        match s {
            "QB" => Position::QB,
            "RB" => Position::RB,
            "WR" => Position::WR,
            "TE" => Position::TE,
            "K" => Position::K,
            "DEF" => Position::DEF,
            _ => Position::Other,
        }
    }

    /// Whether this position is counted in positional stats.
    pub fn is_scored(&self) -> bool {
        !matches!(self, Position::Other)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Position::QB => "QB",
            Position::RB => "RB",
            Position::WR => "WR",
            Position::TE => "TE",
            Position::K => "K",
            Position::DEF => "DEF",
            Position::Other => "OTHER",
        };
        write!(f, "{}", s)
    }
}

/// Display data for one player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRef {
    pub player_id: String,
    pub name: String,
    pub position: Position,
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to read player directory: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse player directory: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Raw directory entry as stored in the players JSON snapshot.
#[derive(Debug, Deserialize)]
struct RawPlayer {
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    position: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDirectory {
    players: HashMap<String, RawPlayer>,
}

/// Offline player-id lookup built from a periodically refreshed JSON snapshot
/// of the remote player database (the full dump is too large to fetch per
/// session).
#[derive(Debug, Clone, Default)]
pub struct PlayerDirectory {
    players: HashMap<String, PlayerRef>,
}

impl PlayerDirectory {
    pub fn load(path: &Path) -> Result<Self, DirectoryError> {
        let raw = std::fs::read_to_string(path)?;
        let parsed: RawDirectory = serde_json::from_str(&raw)?;

        let players = parsed
            .players
            .into_iter()
            .map(|(id, p)| {
                let name = match (p.first_name.as_deref(), p.last_name.as_deref()) {
                    (Some(first), Some(last)) => format!("{} {}", first, last),
                    (Some(first), None) => first.to_string(),
                    (None, Some(last)) => last.to_string(),
                    (None, None) => id.clone(),
                };
                let position = p
                    .position
                    .as_deref()
                    .map(Position::parse)
                    .unwrap_or(Position::Other);
                (
                    id.clone(),
                    PlayerRef {
                        player_id: id,
                        name,
                        position,
                    },
                )
            })
            .collect();

        Ok(Self { players })
    }

    /// Build a directory from already-typed refs (used by tests and tools).
    pub fn from_refs(refs: impl IntoIterator<Item = PlayerRef>) -> Self {
        Self {
            players: refs
                .into_iter()
                .map(|p| (p.player_id.clone(), p))
                .collect(),
        }
    }

    pub fn get(&self, player_id: &str) -> Option<&PlayerRef> {
        self.players.get(player_id)
    }

    /// Position for a player id; unknown ids bucket to `Other`.
    pub fn position_of(&self, player_id: &str) -> Position {
        self.get(player_id)
            .map(|p| p.position)
            .unwrap_or(Position::Other)
    }

    /// Display name for a player id, falling back to the raw id.
    pub fn name_of<'a>(&'a self, player_id: &'a str) -> &'a str {
        self.get(player_id).map(|p| p.name.as_str()).unwrap_or(player_id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
