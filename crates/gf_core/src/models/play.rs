use serde::{Deserialize, Serialize};

use super::clock::ClockPosition;
use super::field::FieldOffset;
use super::stats::StatAccumulator;

/// One stat occurrence inside a play, in feed sequence order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayEvent {
    pub sequence: u32,
    /// Player id, or `"0"` for a team-level occurrence.
    pub entity_id: String,
    pub team: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    pub stat_code: u32,
    pub yards: i64,
}

/// Identity of a play across snapshots.
///
/// The feed occasionally reassigns ids when a play is reversed, so the
/// description text is part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayKey {
    pub play_id: u32,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Play {
    pub play_id: u32,
    pub drive_id: u32,
    /// Possessing team.
    pub team: String,
    /// 0 for plays with no down (kickoffs, extra points).
    pub down: u8,
    pub yards_togo: u32,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub clock: ClockPosition,
    /// `None` when the feed left the yard line blank.
    pub position: Option<FieldOffset>,
    pub events: Vec<PlayEvent>,
    /// Per-player statistics, ordered by first appearance in `events`.
    pub players: Vec<StatAccumulator>,
    /// Statistics the feed attributed to the team pseudo-entity.
    pub team_stats: StatAccumulator,
}

impl Play {
    pub fn key(&self) -> PlayKey {
        PlayKey { play_id: self.play_id, description: self.description.clone() }
    }

    pub fn player(&self, player_id: &str) -> Option<&StatAccumulator> {
        self.players.iter().find(|p| p.owner.id == player_id)
    }

    pub fn has_player(&self, player_id: &str) -> bool {
        self.player(player_id).is_some()
    }

    pub fn is_scoring(&self) -> bool {
        self.players.iter().any(|p| p.touchdowns() > 0.0)
            || self.players.iter().any(|p| p.get("kicking_fgm") > 0.0)
            || self.note.as_deref().is_some_and(|n| n == "TD" || n == "FG" || n == "SAF")
    }
}

impl PartialEq for Play {
    fn eq(&self, other: &Self) -> bool {
        self.play_id == other.play_id && self.description == other.description
    }
}

impl Eq for Play {}
