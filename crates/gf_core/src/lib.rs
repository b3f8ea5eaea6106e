//! # gf_core - Live Game Feed Reconstruction
//!
//! This library turns raw game-center snapshots of an in-progress game into
//! a typed model (drives, plays, per-player statistics), diffs successive
//! snapshots of the same game, and polls a schedule of games on a two-state
//! cadence.
//!
//! ## Features
//! - Repair of known feed defects (repeated drives and plays, blank yard lines,
//!   stale drive quarters)
//! - Statistic accumulation with play-level and game-level reconciliation
//! - Idempotent diffs: each change is reported once
//! - Parallel per-game fetch and parse inside a poll tick
//! - Player searches and aggregation across plays, drives and games

// Collaborator traits take many generic parameters in tests
#![allow(clippy::type_complexity)]

pub mod data;
pub mod diff;
pub mod error;
pub mod feed;
pub mod live;
pub mod models;
pub mod query;

#[cfg(test)]
pub(crate) mod fixtures;

pub use data::{StandardStatMap, StatExpander};
pub use diff::{diff, EventDiff};
pub use error::{FeedError, Result};
pub use feed::SnapshotParser;
pub use live::{
    Clock, LivePoller, PollerConfig, PollerState, Schedule, ScheduleWindow, ScheduledEvent,
    SeasonPhase, SnapshotFeed, StopHandle, SystemClock, TickReport,
};
pub use models::{
    ClockPosition, Drive, EventSnapshot, FieldOffset, Phase, Play, PossessionDuration,
    StatAccumulator, StatOwner, TiePolicy,
};
pub use query::PlayerStats;
