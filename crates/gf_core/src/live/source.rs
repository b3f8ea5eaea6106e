//! Collaborators the poller runs against: raw payload retrieval and time.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;

/// Raw payload retrieval for one event.
///
/// Implementations report [`FeedError::FetchUnavailable`] or
/// [`FeedError::FetchTimeout`]; the poller skips the event for the tick.
///
/// [`FeedError::FetchUnavailable`]: crate::error::FeedError::FetchUnavailable
/// [`FeedError::FetchTimeout`]: crate::error::FeedError::FetchTimeout
pub trait SnapshotFeed: Send + Sync {
    fn fetch(&self, event_id: &str, timeout: Duration) -> Result<Vec<u8>>;
}

impl<T: SnapshotFeed + ?Sized> SnapshotFeed for Arc<T> {
    fn fetch(&self, event_id: &str, timeout: Duration) -> Result<Vec<u8>> {
        (**self).fetch(event_id, timeout)
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn sleep(&self, duration: Duration);
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Cloneable stop flag, honoured at the next tick boundary.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
