//! Live polling: which events to fetch, how often, and what changed.

pub mod config;
pub mod poller;
pub mod schedule;
pub mod source;

pub use config::{PollerConfig, POLLER_CONFIG_ENV};
pub use poller::{LivePoller, PollerState, TickReport};
pub use schedule::{Schedule, ScheduleWindow, ScheduledEvent, SeasonPhase};
pub use source::{Clock, SnapshotFeed, StopHandle, SystemClock};
