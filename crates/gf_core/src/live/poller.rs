//! The live polling loop.
//!
//! A `LivePoller` alternates between two states. While `Inactive` it only
//! looks at the schedule, every `inactive_interval`, for an event that is in
//! progress or about to start. While `Active` it fetches every candidate event
//! every `active_interval`, diffs it against the previous tick's snapshot and
//! hands the result to the caller. Events reported final are recorded as
//! completed once and never polled again.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::config::PollerConfig;
use super::schedule::{Schedule, ScheduleWindow, ScheduledEvent};
use super::source::{Clock, SnapshotFeed, StopHandle};
use crate::diff::{diff, EventDiff};
use crate::error::Result;
use crate::feed::SnapshotParser;
use crate::models::EventSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PollerState {
    Inactive,
    Active,
}

/// Everything one active tick produced.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// Snapshots of events still in progress.
    pub active: Vec<EventSnapshot>,
    /// Snapshots of events that went final this tick.
    pub completed: Vec<EventSnapshot>,
    /// Non-empty diffs against the previous tick, one per event at most.
    pub diffs: Vec<EventDiff>,
}

impl TickReport {
    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.completed.is_empty()
    }
}

struct Polled {
    snapshot: EventSnapshot,
    diff: Option<EventDiff>,
    completed: bool,
}

pub struct LivePoller<F, S, C> {
    config: PollerConfig,
    feed: F,
    schedule: S,
    clock: C,
    parser: SnapshotParser,
    state: PollerState,
    window: Option<ScheduleWindow>,
    window_refreshed_at: Option<DateTime<Utc>>,
    events: Vec<ScheduledEvent>,
    completed: Mutex<HashSet<String>>,
    previous: HashMap<String, EventSnapshot>,
    stop: StopHandle,
}

impl<F, S, C> LivePoller<F, S, C>
where
    F: SnapshotFeed,
    S: Schedule,
    C: Clock,
{
    pub fn new(config: PollerConfig, feed: F, schedule: S, clock: C) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            feed,
            schedule,
            clock,
            parser: SnapshotParser::default(),
            state: PollerState::Inactive,
            window: None,
            window_refreshed_at: None,
            events: Vec::new(),
            completed: Mutex::new(HashSet::new()),
            previous: HashMap::new(),
            stop: StopHandle::default(),
        })
    }

    pub fn with_parser(mut self, parser: SnapshotParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    pub fn window(&self) -> Option<ScheduleWindow> {
        self.window
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn is_completed(&self, event_id: &str) -> bool {
        self.completed.lock().unwrap_or_else(PoisonError::into_inner).contains(event_id)
    }

    /// Resets all tracking state and loads the current schedule window.
    ///
    /// Clears a pending stop request. Handles cloned earlier stay attached
    /// and can stop the restarted loop.
    pub fn start(&mut self) -> Result<()> {
        self.stop.reset();
        self.state = PollerState::Inactive;
        self.previous.clear();
        self.completed.get_mut().unwrap_or_else(PoisonError::into_inner).clear();
        let now = self.clock.now();
        self.refresh_window(now)?;
        info!(window = ?self.window, events = self.events.len(), "poller started");
        Ok(())
    }

    /// Requests the loop to exit at the next tick boundary. [`Self::start`]
    /// makes the poller runnable again.
    pub fn stop(&mut self) {
        self.stop.stop();
        self.previous.clear();
        self.state = PollerState::Inactive;
    }

    /// Time to sleep before the next tick in the current state.
    pub fn interval(&self) -> Duration {
        match self.state {
            PollerState::Active => self.config.active_interval(),
            PollerState::Inactive => self.config.inactive_interval(),
        }
    }

    /// Events worth fetching at `now`.
    pub fn candidates(&self, now: DateTime<Utc>) -> Vec<ScheduledEvent> {
        let completed = self.completed.lock().unwrap_or_else(PoisonError::into_inner);
        self.events
            .iter()
            .filter(|e| !completed.contains(&e.event_id))
            .filter(|e| {
                if e.has_started(now) {
                    e.running_for(now) < self.config.max_event_duration()
                } else {
                    e.start - now <= self.config.lookahead()
                }
            })
            .cloned()
            .collect()
    }

    /// Runs one tick. Returns a report when at least one event produced a
    /// snapshot; recoverable per-event failures are logged and skipped.
    pub fn tick(&mut self) -> Result<Option<TickReport>> {
        let now = self.clock.now();
        self.refresh_window_if_due(now)?;

        let candidates = self.candidates(now);
        if candidates.is_empty() {
            if self.state == PollerState::Active {
                info!("no events in progress, going inactive");
                self.previous.clear();
            }
            self.state = PollerState::Inactive;
            return Ok(None);
        }
        if self.state == PollerState::Inactive {
            info!(events = candidates.len(), "events in progress, going active");
            self.state = PollerState::Active;
        }

        let results: Vec<Result<Option<Polled>>> =
            candidates.par_iter().map(|e| self.poll_event(e)).collect();
        let mut polled = Vec::with_capacity(results.len());
        let mut failure = None;
        for result in results {
            match result {
                Ok(p) => polled.extend(p),
                Err(e) => failure = failure.or(Some(e)),
            }
        }
        if let Some(e) = failure {
            // Nothing from this tick is reported, so events marked completed
            // during it must be picked up again next tick.
            let mut done = self.completed.lock().unwrap_or_else(PoisonError::into_inner);
            for p in polled.iter().filter(|p| p.completed) {
                done.remove(&p.snapshot.event_id);
            }
            return Err(e);
        }

        let mut report = TickReport::default();
        let mut retained = HashMap::new();
        for Polled { snapshot, diff: delta, completed } in polled {
            if let Some(delta) = delta.filter(|d| !d.is_empty()) {
                report.diffs.push(delta);
            }
            if completed {
                info!(event_id = %snapshot.event_id, "event completed");
                report.completed.push(snapshot);
            } else {
                retained.insert(snapshot.event_id.clone(), snapshot.clone());
                report.active.push(snapshot);
            }
        }
        self.previous = retained;

        debug!(
            candidates = candidates.len(),
            active = report.active.len(),
            completed = report.completed.len(),
            diffs = report.diffs.len(),
            "tick done"
        );
        Ok((!report.is_empty()).then_some(report))
    }

    /// Ticks until `deadline`, a stop request, or a contract violation.
    /// `on_tick` is invoked for every tick that produced a report.
    pub fn run<H>(&mut self, deadline: Option<DateTime<Utc>>, mut on_tick: H) -> Result<()>
    where
        H: FnMut(&TickReport),
    {
        if self.window.is_none() {
            let now = self.clock.now();
            self.refresh_window(now)?;
        }
        loop {
            if self.stop.is_stopped() {
                info!("stop requested");
                break;
            }
            let now = self.clock.now();
            if deadline.is_some_and(|d| now >= d) {
                info!("deadline reached");
                break;
            }

            if let Some(report) = self.tick()? {
                on_tick(&report);
            }

            let mut pause = self.interval();
            if let Some(d) = deadline {
                let left = (d - self.clock.now()).to_std().unwrap_or(Duration::ZERO);
                pause = pause.min(left);
            }
            self.clock.sleep(pause);
        }
        Ok(())
    }

    fn poll_event(&self, event: &ScheduledEvent) -> Result<Option<Polled>> {
        let id = event.event_id.as_str();
        let fetched = self
            .feed
            .fetch(id, self.config.fetch_timeout())
            .and_then(|raw| self.parser.parse(id, &raw));
        let snapshot = match fetched {
            Ok(snapshot) => snapshot,
            Err(e) if e.is_recoverable() => {
                warn!(event_id = id, error = %e, "skipping event this tick");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let delta = match self.previous.get(id) {
            Some(previous) => Some(diff(previous, &snapshot)?),
            None => None,
        };

        let mut completed = false;
        if snapshot.is_over() {
            let mut done = self.completed.lock().unwrap_or_else(PoisonError::into_inner);
            if !done.insert(id.to_string()) {
                return Ok(None);
            }
            completed = true;
        }
        Ok(Some(Polled { snapshot, diff: delta, completed }))
    }

    fn refresh_window_if_due(&mut self, now: DateTime<Utc>) -> Result<()> {
        let due =
            self.window_refreshed_at.map_or(true, |at| now - at >= self.config.window_refresh());
        if !due {
            return Ok(());
        }
        match self.refresh_window(now) {
            Err(e) if e.is_recoverable() => {
                warn!(error = %e, "schedule refresh failed, keeping previous window");
                Ok(())
            }
            other => other,
        }
    }

    fn refresh_window(&mut self, now: DateTime<Utc>) -> Result<()> {
        let window = self.schedule.current_window()?;
        let events = self.schedule.events_in_window(&window)?;
        if self.window != Some(window) {
            info!(%window, events = events.len(), "schedule window changed");
        }
        self.window = Some(window);
        self.events = events;
        self.window_refreshed_at = Some(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;
    use crate::fixtures::{self, EVENT_ID};
    use crate::live::schedule::SeasonPhase;
    use chrono::TimeZone;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const OTHER_ID: &str = "2012090901";

    struct ManualClock(Mutex<DateTime<Utc>>);

    impl ManualClock {
        fn at(now: DateTime<Utc>) -> Arc<Self> {
            Arc::new(Self(Mutex::new(now)))
        }

        fn advance(&self, secs: i64) {
            *self.0.lock().unwrap() += chrono::Duration::seconds(secs);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }

        fn sleep(&self, duration: Duration) {
            *self.0.lock().unwrap() += chrono::Duration::from_std(duration).unwrap();
        }
    }

    #[derive(Default)]
    struct MemoryFeed {
        payloads: Mutex<HashMap<String, Vec<u8>>>,
        broken: Mutex<HashSet<String>>,
        fetches: AtomicUsize,
    }

    impl MemoryFeed {
        fn put(&self, event_id: &str, game: Value) {
            let payload = fixtures::payload(event_id, game);
            self.payloads.lock().unwrap().insert(event_id.to_string(), payload);
        }
    }

    impl SnapshotFeed for MemoryFeed {
        fn fetch(&self, event_id: &str, _timeout: Duration) -> Result<Vec<u8>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.broken.lock().unwrap().contains(event_id) {
                let (left, right) = (event_id.to_string(), "?".to_string());
                return Err(FeedError::IdentityMismatch { left, right });
            }
            self.payloads
                .lock()
                .unwrap()
                .get(event_id)
                .cloned()
                .ok_or_else(|| FeedError::FetchUnavailable(event_id.to_string()))
        }
    }

    struct FixedSchedule {
        events: Vec<ScheduledEvent>,
        refreshes: AtomicUsize,
    }

    impl FixedSchedule {
        fn new(events: Vec<ScheduledEvent>) -> Arc<Self> {
            Arc::new(Self { events, refreshes: AtomicUsize::new(0) })
        }
    }

    impl Schedule for FixedSchedule {
        fn current_window(&self) -> Result<ScheduleWindow> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            Ok(ScheduleWindow { year: 2012, phase: SeasonPhase::Reg, week: 1 })
        }

        fn events_in_window(&self, _window: &ScheduleWindow) -> Result<Vec<ScheduledEvent>> {
            Ok(self.events.clone())
        }
    }

    fn kickoff() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2012, 9, 9, 17, 0, 0).unwrap()
    }

    fn scheduled(event_id: &str, start: DateTime<Utc>) -> ScheduledEvent {
        ScheduledEvent { event_id: event_id.into(), start, home: "NE".into(), away: "MIA".into() }
    }

    type TestPoller = LivePoller<Arc<MemoryFeed>, Arc<FixedSchedule>, Arc<ManualClock>>;

    fn poller(
        events: Vec<ScheduledEvent>,
        now: DateTime<Utc>,
    ) -> (TestPoller, Arc<MemoryFeed>, Arc<FixedSchedule>, Arc<ManualClock>) {
        let feed = Arc::new(MemoryFeed::default());
        let schedule = FixedSchedule::new(events);
        let clock = ManualClock::at(now);
        let mut poller = LivePoller::new(
            PollerConfig::default(),
            feed.clone(),
            schedule.clone(),
            clock.clone(),
        )
        .unwrap();
        poller.start().unwrap();
        (poller, feed, schedule, clock)
    }

    fn final_game() -> Value {
        let mut game = fixtures::sample_game();
        game["qtr"] = json!("Final");
        game
    }

    #[test]
    fn test_no_scheduled_events_stays_inactive() {
        let (mut poller, feed, _, _) = poller(Vec::new(), kickoff());
        assert!(poller.tick().unwrap().is_none());
        assert_eq!(poller.state(), PollerState::Inactive);
        assert_eq!(poller.interval(), Duration::from_secs(900));
        assert_eq!(feed.fetches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_far_future_event_is_not_a_candidate() {
        let start = kickoff() + chrono::Duration::hours(2);
        let (mut poller, feed, _, _) = poller(vec![scheduled(EVENT_ID, start)], kickoff());
        assert!(poller.tick().unwrap().is_none());
        assert_eq!(poller.state(), PollerState::Inactive);
        assert_eq!(feed.fetches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_upcoming_event_within_lookahead_is_polled() {
        let start = kickoff() + chrono::Duration::minutes(10);
        let (mut poller, feed, _, _) = poller(vec![scheduled(EVENT_ID, start)], kickoff());
        assert!(poller.tick().unwrap().is_none());
        assert_eq!(poller.state(), PollerState::Active);
        assert_eq!(feed.fetches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_first_sighting_reports_without_diff() {
        let (mut poller, feed, _, _) = poller(vec![scheduled(EVENT_ID, kickoff())], kickoff());
        feed.put(EVENT_ID, fixtures::sample_game());

        let report = poller.tick().unwrap().unwrap();
        assert_eq!(poller.state(), PollerState::Active);
        assert_eq!(report.active.len(), 1);
        assert!(report.completed.is_empty());
        assert!(report.diffs.is_empty());
    }

    #[test]
    fn test_second_tick_reports_new_activity_once() {
        let (mut poller, feed, _, clock) = poller(vec![scheduled(EVENT_ID, kickoff())], kickoff());
        feed.put(EVENT_ID, fixtures::sample_game());
        poller.tick().unwrap();

        let mut game = fixtures::sample_game();
        game["home"]["stats"]["passing"][fixtures::BRADY]["yds"] = json!(20);
        feed.put(EVENT_ID, game);
        clock.advance(15);
        let report = poller.tick().unwrap().unwrap();
        assert_eq!(report.diffs.len(), 1);
        assert_eq!(report.diffs[0].entities[fixtures::BRADY].get("passing_yds"), 8.0);

        clock.advance(15);
        let report = poller.tick().unwrap().unwrap();
        assert!(report.diffs.is_empty());
    }

    #[test]
    fn test_completed_event_reported_exactly_once() {
        let (mut poller, feed, _, clock) = poller(vec![scheduled(EVENT_ID, kickoff())], kickoff());
        feed.put(EVENT_ID, fixtures::sample_game());
        poller.tick().unwrap();

        feed.put(EVENT_ID, final_game());
        clock.advance(15);
        let report = poller.tick().unwrap().unwrap();
        assert_eq!(report.completed.len(), 1);
        assert!(report.active.is_empty());
        assert!(poller.is_completed(EVENT_ID));

        clock.advance(15);
        assert!(poller.tick().unwrap().is_none());
        assert_eq!(poller.state(), PollerState::Inactive);
        assert_eq!(feed.fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unavailable_event_does_not_block_others() {
        let events = vec![scheduled(EVENT_ID, kickoff()), scheduled(OTHER_ID, kickoff())];
        let (mut poller, feed, _, _) = poller(events, kickoff());
        feed.put(OTHER_ID, fixtures::sample_game());

        let report = poller.tick().unwrap().unwrap();
        let ids: Vec<&str> = report.active.iter().map(|s| s.event_id.as_str()).collect();
        assert_eq!(ids, vec![OTHER_ID]);
    }

    #[test]
    fn test_malformed_payload_is_skipped() {
        let (mut poller, feed, _, _) = poller(vec![scheduled(EVENT_ID, kickoff())], kickoff());
        feed.payloads.lock().unwrap().insert(EVENT_ID.to_string(), b"{\"nextupdate\": 3}".to_vec());
        assert!(poller.tick().unwrap().is_none());
        assert_eq!(poller.state(), PollerState::Active);
    }

    #[test]
    fn test_contract_violation_is_surfaced() {
        let (mut poller, feed, _, _) = poller(vec![scheduled(EVENT_ID, kickoff())], kickoff());
        feed.broken.lock().unwrap().insert(EVENT_ID.to_string());
        let err = poller.tick().unwrap_err();
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_event_past_max_duration_is_dropped() {
        let start = kickoff() - chrono::Duration::hours(7);
        let (mut poller, feed, _, _) = poller(vec![scheduled(EVENT_ID, start)], kickoff());
        feed.put(EVENT_ID, fixtures::sample_game());
        assert!(poller.tick().unwrap().is_none());
        assert_eq!(poller.state(), PollerState::Inactive);
    }

    #[test]
    fn test_window_refresh_on_coarse_timer() {
        let (mut poller, _, schedule, clock) = poller(Vec::new(), kickoff());
        assert_eq!(schedule.refreshes.load(Ordering::SeqCst), 1);
        poller.tick().unwrap();
        clock.advance(900);
        poller.tick().unwrap();
        assert_eq!(schedule.refreshes.load(Ordering::SeqCst), 1);

        clock.advance(12 * 60 * 60);
        poller.tick().unwrap();
        assert_eq!(schedule.refreshes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_run_until_deadline() {
        let (mut poller, feed, _, clock) = poller(vec![scheduled(EVENT_ID, kickoff())], kickoff());
        feed.put(EVENT_ID, fixtures::sample_game());

        let mut ticks = 0;
        poller.run(Some(kickoff() + chrono::Duration::seconds(60)), |_| ticks += 1).unwrap();
        assert_eq!(ticks, 4);
        assert_eq!(clock.now(), kickoff() + chrono::Duration::seconds(60));
    }

    #[test]
    fn test_stop_handle_ends_run() {
        let (mut poller, feed, _, _) = poller(vec![scheduled(EVENT_ID, kickoff())], kickoff());
        feed.put(EVENT_ID, fixtures::sample_game());

        let handle = poller.stop_handle();
        let mut ticks = 0;
        poller
            .run(None, |_| {
                ticks += 1;
                handle.stop();
            })
            .unwrap();
        assert_eq!(ticks, 1);
    }

    #[test]
    fn test_restart_after_stop() {
        let (mut poller, feed, _, _) = poller(vec![scheduled(EVENT_ID, kickoff())], kickoff());
        feed.put(EVENT_ID, fixtures::sample_game());
        let handle = poller.stop_handle();

        poller.stop();
        let mut ticks = 0;
        poller.run(Some(kickoff() + chrono::Duration::seconds(60)), |_| ticks += 1).unwrap();
        assert_eq!(ticks, 0);

        poller.start().unwrap();
        assert!(!handle.is_stopped());
        poller.run(Some(kickoff() + chrono::Duration::seconds(60)), |_| ticks += 1).unwrap();
        assert_eq!(ticks, 4);
    }

    #[test]
    fn test_failed_tick_keeps_completion_unreported() {
        let events = vec![scheduled(EVENT_ID, kickoff()), scheduled(OTHER_ID, kickoff())];
        let (mut poller, feed, _, clock) = poller(events, kickoff());
        feed.put(EVENT_ID, final_game());
        feed.broken.lock().unwrap().insert(OTHER_ID.to_string());

        assert!(poller.tick().is_err());
        assert!(!poller.is_completed(EVENT_ID));

        feed.broken.lock().unwrap().clear();
        feed.put(OTHER_ID, fixtures::sample_game());
        clock.advance(15);
        let report = poller.tick().unwrap().unwrap();
        let done: Vec<&str> = report.completed.iter().map(|s| s.event_id.as_str()).collect();
        assert_eq!(done, vec![EVENT_ID]);
        assert_eq!(report.active.len(), 1);
        assert!(poller.is_completed(EVENT_ID));
    }

    struct NoStats;

    impl crate::data::StatExpander for NoStats {
        fn expand(&self, _code: u32, _raw_yards: &Value) -> Option<crate::data::StatValues> {
            None
        }
    }

    #[test]
    fn test_custom_parser_is_used() {
        let (poller, feed, _, _) = poller(vec![scheduled(EVENT_ID, kickoff())], kickoff());
        let mut poller = poller.with_parser(SnapshotParser::new(Arc::new(NoStats)));
        feed.put(EVENT_ID, fixtures::sample_game());

        let report = poller.tick().unwrap().unwrap();
        let snap = &report.active[0];
        assert_eq!(snap.plays().count(), 2);
        assert!(snap.plays().all(|p| p.players.is_empty()));
        assert!(snap.play_totals.is_empty());
        assert_eq!(snap.entities[fixtures::BRADY].get("passing_yds"), 12.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PollerConfig { active_interval_secs: 0, ..Default::default() };
        let result = LivePoller::new(
            config,
            Arc::new(MemoryFeed::default()),
            FixedSchedule::new(Vec::new()),
            ManualClock::at(kickoff()),
        );
        assert!(matches!(result, Err(FeedError::Config(_))));
    }
}
