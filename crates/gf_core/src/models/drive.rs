use serde::{Deserialize, Serialize};

use super::clock::{ClockPosition, PossessionDuration};
use super::field::FieldOffset;
use super::play::Play;
use crate::error::{FeedError, Result};

/// One possession.
///
/// Start and end fields are `None` on drives produced by [`Drive::sum`],
/// since field position and game time do not add up across drives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drive {
    pub drive_id: u32,
    pub team: String,
    pub start_position: Option<FieldOffset>,
    pub end_position: Option<FieldOffset>,
    pub start_time: Option<ClockPosition>,
    pub end_time: Option<ClockPosition>,
    pub first_downs: u32,
    pub penalty_yards: i32,
    pub total_yards: i32,
    pub possession: PossessionDuration,
    /// Feed label such as "Punt", "Touchdown" or "End of Game".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    pub red_zone: bool,
    pub plays: Vec<Play>,
}

impl Drive {
    /// Aggregates two possessions of the same team (e.g. across a week).
    pub fn sum(&self, other: &Drive) -> Result<Drive> {
        if self.team != other.team {
            return Err(FeedError::IdentityMismatch {
                left: format!("drive team {}", self.team),
                right: format!("drive team {}", other.team),
            });
        }
        let mut plays = self.plays.clone();
        plays.extend(other.plays.iter().cloned());
        Ok(Drive {
            drive_id: self.drive_id,
            team: self.team.clone(),
            start_position: None,
            end_position: None,
            start_time: None,
            end_time: None,
            first_downs: self.first_downs + other.first_downs,
            penalty_yards: self.penalty_yards + other.penalty_yards,
            total_yards: self.total_yards + other.total_yards,
            possession: self.possession + other.possession,
            result: None,
            red_zone: self.red_zone || other.red_zone,
            plays,
        })
    }

    pub fn scored(&self) -> bool {
        self.result.as_deref().is_some_and(|r| r.eq_ignore_ascii_case("touchdown"))
            || self.result.as_deref().is_some_and(|r| r.eq_ignore_ascii_case("field goal"))
    }
}
