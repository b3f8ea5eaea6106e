//! Schedule file collaborator.
//!
//! ```json
//! {
//!   "current": { "year": 2012, "phase": "REG", "week": 1 },
//!   "events": [
//!     { "event_id": "2012090900", "start": "2012-09-09T17:00:00Z",
//!       "home": "NE", "away": "MIA", "year": 2012, "phase": "REG", "week": 1 }
//!   ]
//! }
//! ```

use chrono::{DateTime, Utc};
use gf_core::{FeedError, Schedule, ScheduleWindow, ScheduledEvent, SeasonPhase};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleFile {
    pub current: ScheduleWindow,
    #[serde(default)]
    pub events: Vec<ScheduleEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub event_id: String,
    pub start: DateTime<Utc>,
    pub home: String,
    pub away: String,
    pub year: u16,
    pub phase: SeasonPhase,
    pub week: u8,
}

impl ScheduleEntry {
    fn in_window(&self, window: &ScheduleWindow) -> bool {
        self.year == window.year && self.phase == window.phase && self.week == window.week
    }
}

/// Re-reads the file on every call so edits are picked up at the next
/// window refresh.
#[derive(Debug, Clone)]
pub struct JsonSchedule {
    path: PathBuf,
}

impl JsonSchedule {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> gf_core::Result<ScheduleFile> {
        let text = fs::read_to_string(&self.path).map_err(|e| {
            FeedError::Schedule(format!("failed to read {}: {e}", self.path.display()))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            FeedError::Schedule(format!("failed to parse {}: {e}", self.path.display()))
        })
    }
}

impl Schedule for JsonSchedule {
    fn current_window(&self) -> gf_core::Result<ScheduleWindow> {
        Ok(self.load()?.current)
    }

    fn events_in_window(&self, window: &ScheduleWindow) -> gf_core::Result<Vec<ScheduledEvent>> {
        let file = self.load()?;
        let mut events: Vec<ScheduledEvent> = file
            .events
            .into_iter()
            .filter(|e| e.in_window(window))
            .map(|e| ScheduledEvent {
                event_id: e.event_id,
                start: e.start,
                home: e.home,
                away: e.away,
            })
            .collect();
        events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.event_id.cmp(&b.event_id)));
        Ok(events)
    }
}
