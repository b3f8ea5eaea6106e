use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SeasonPhase {
    Pre,
    Reg,
    Post,
}

/// The season/week pointer the schedule lists events for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleWindow {
    pub year: u16,
    pub phase: SeasonPhase,
    pub week: u8,
}

impl fmt::Display for ScheduleWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?} week {}", self.year, self.phase, self.week)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub event_id: String,
    pub start: DateTime<Utc>,
    pub home: String,
    pub away: String,
}

impl ScheduledEvent {
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.start <= now
    }

    pub fn running_for(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.start
    }
}

/// Authoritative listing of events.
pub trait Schedule: Send + Sync {
    fn current_window(&self) -> Result<ScheduleWindow>;

    fn events_in_window(&self, window: &ScheduleWindow) -> Result<Vec<ScheduledEvent>>;
}

impl<T: Schedule + ?Sized> Schedule for Arc<T> {
    fn current_window(&self) -> Result<ScheduleWindow> {
        (**self).current_window()
    }

    fn events_in_window(&self, window: &ScheduleWindow) -> Result<Vec<ScheduledEvent>> {
        (**self).events_in_window(window)
    }
}
