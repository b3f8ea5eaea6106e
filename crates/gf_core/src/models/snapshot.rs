use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::clock::{ClockPosition, PossessionDuration};
use super::drive::Drive;
use super::play::Play;
use super::stats::StatAccumulator;

/// Points per period. Index 0..4 are quarters one to four, 4 is overtime.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Scoreboard {
    pub periods: [u32; 5],
    pub total: u32,
}

impl Scoreboard {
    pub fn period(&self, quarter: u8) -> u32 {
        match quarter {
            1..=5 => self.periods[quarter as usize - 1],
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamSummary {
    pub abbr: String,
    pub score: Scoreboard,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeouts: Option<u8>,
    /// Cumulative team statistics (first downs, yards, penalties, ...).
    pub stats: StatAccumulator,
    pub time_of_possession: PossessionDuration,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoringPlay {
    pub team: String,
    /// "TD", "FG", "SAF", ...
    pub kind: String,
    pub quarter: u8,
    pub description: String,
}

/// How a tied game reports its winner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TiePolicy {
    /// A single synthetic identifier (e.g. "TIE").
    Synthetic { label: String },
    /// Both team identifiers.
    BothTeams,
}

impl Default for TiePolicy {
    fn default() -> Self {
        TiePolicy::Synthetic { label: "TIE".to_string() }
    }
}

/// A point-in-time materialization of one event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSnapshot {
    pub event_id: String,
    pub home: TeamSummary,
    pub away: TeamSummary,
    pub clock: ClockPosition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub down: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yards_togo: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub possession_team: Option<String>,
    pub red_zone: bool,
    pub drives: Vec<Drive>,
    pub scoring: Vec<ScoringPlay>,
    /// Per-player totals summed from the reconstructed plays.
    pub play_totals: BTreeMap<String, StatAccumulator>,
    /// Per-player totals reported by the snapshot's category blocks.
    pub game_totals: BTreeMap<String, StatAccumulator>,
    /// `play_totals` max-merged with `game_totals`; the source for diffs.
    pub entities: BTreeMap<String, StatAccumulator>,
}

impl EventSnapshot {
    pub fn is_over(&self) -> bool {
        self.clock.is_final()
    }

    pub fn has_started(&self) -> bool {
        !self.clock.is_pregame()
    }

    pub fn is_playing(&self) -> bool {
        self.has_started() && !self.is_over()
    }

    pub fn plays(&self) -> impl Iterator<Item = &Play> {
        self.drives.iter().flat_map(|d| d.plays.iter())
    }

    pub fn entity(&self, player_id: &str) -> Option<&StatAccumulator> {
        self.entities.get(player_id)
    }

    /// Winning team identifiers; ties follow `policy`.
    pub fn winner(&self, policy: &TiePolicy) -> Vec<String> {
        let (home, away) = (self.home.score.total, self.away.score.total);
        if home > away {
            vec![self.home.abbr.clone()]
        } else if away > home {
            vec![self.away.abbr.clone()]
        } else {
            match policy {
                TiePolicy::Synthetic { label } => vec![label.clone()],
                TiePolicy::BothTeams => vec![self.home.abbr.clone(), self.away.abbr.clone()],
            }
        }
    }
}
