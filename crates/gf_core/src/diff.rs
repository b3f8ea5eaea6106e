//! Incremental deltas between two snapshots of one event.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::error::{FeedError, Result};
use crate::models::{ClockPosition, EventSnapshot, Play, PlayKey, StatAccumulator};

/// What `after` knows that `before` did not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDiff {
    pub event_id: String,
    pub before_clock: ClockPosition,
    pub after_clock: ClockPosition,
    /// New plays, in `after`'s order.
    pub plays: Vec<Play>,
    /// Per-entity statistic deltas. Entities with no new activity are absent.
    pub entities: BTreeMap<String, StatAccumulator>,
}

impl EventDiff {
    pub fn is_empty(&self) -> bool {
        self.plays.is_empty() && self.entities.is_empty()
    }

    /// Players credited with any new statistic.
    pub fn entity_ids(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }
}

/// Computes the delta from `before` to `after`.
///
/// Plays are matched on [`PlayKey`]; entity statistics come from the
/// max-merged entity maps and are reduced with [`StatAccumulator::subtract`],
/// so `diff(x, x)` is always empty.
pub fn diff(before: &EventSnapshot, after: &EventSnapshot) -> Result<EventDiff> {
    if before.event_id != after.event_id {
        return Err(FeedError::EventIdentityMismatch {
            before: before.event_id.clone(),
            after: after.event_id.clone(),
        });
    }

    let seen: HashSet<PlayKey> = before.plays().map(Play::key).collect();
    let plays = after.plays().filter(|p| !seen.contains(&p.key())).cloned().collect();

    let mut entities = BTreeMap::new();
    for (id, current) in &after.entities {
        let delta = match before.entities.get(id) {
            Some(previous) => current.subtract(previous)?,
            None => Some(current.clone()),
        };
        if let Some(delta) = delta {
            entities.insert(id.clone(), delta);
        }
    }

    Ok(EventDiff {
        event_id: after.event_id.clone(),
        before_clock: before.clock,
        after_clock: after.clock,
        plays,
        entities,
    })
}
