//! Playoff bracket model.

use serde::{Deserialize, Serialize};

/// Reference to the winner or loser of an earlier bracket match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l: Option<u32>,
}

/// An input slot of a bracket match, resolved from the wire fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketSlot {
    /// A seeded roster.
    Roster(u32),
    /// Winner of a prior match.
    WinnerOf(u32),
    /// Loser of a prior match.
    LoserOf(u32),
}

/// One match of a single-elimination bracket, in the API's compact shape:
/// `r` round, `m` match id, `t1`/`t2` literal roster slots (or `t1_from`/
/// `t2_from` references to earlier matches), `w`/`l` the resulting winner and
/// loser, `p` the final place decided by this match (1 = championship,
/// 3 = third-place match, 5 = fifth-place match, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BracketEdge {
    #[serde(rename = "r")]
    pub round: u32,
    #[serde(rename = "m")]
    pub match_id: u32,
    #[serde(default)]
    pub t1: Option<u32>,
    #[serde(default)]
    pub t2: Option<u32>,
    #[serde(default)]
    pub w: Option<u32>,
    #[serde(default)]
    pub l: Option<u32>,
    #[serde(default, rename = "p")]
    pub place: Option<u32>,
    #[serde(default)]
    pub t1_from: Option<MatchRef>,
    #[serde(default)]
    pub t2_from: Option<MatchRef>,
}

impl BracketEdge {
    /// Resolve an input slot, preferring the literal roster id.
    fn slot(literal: Option<u32>, from: Option<MatchRef>) -> Option<BracketSlot> {
        if let Some(id) = literal {
            return Some(BracketSlot::Roster(id));
        }
        let from = from?;
        if let Some(m) = from.w {
            return Some(BracketSlot::WinnerOf(m));
        }
        from.l.map(BracketSlot::LoserOf)
    }

    pub fn slot_one(&self) -> Option<BracketSlot> {
        Self::slot(self.t1, self.t1_from)
    }

    pub fn slot_two(&self) -> Option<BracketSlot> {
        Self::slot(self.t2, self.t2_from)
    }

    /// Whether the roster appears as a seeded participant of this match.
    pub fn involves(&self, roster_id: u32) -> bool {
        self.t1 == Some(roster_id) || self.t2 == Some(roster_id)
    }
}
