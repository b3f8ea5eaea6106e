//! `SnapshotFeed` implementations backed by the file system.

use gf_core::{FeedError, SnapshotFeed, SnapshotParser};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

use crate::cache::SnapshotCache;

/// Reads `<dir>/<event_id>.json`, typically kept current by an external
/// downloader. Reads are local, so the timeout is not applied.
#[derive(Debug, Clone)]
pub struct DirectoryFeed {
    dir: PathBuf,
}

impl DirectoryFeed {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn snapshot_path(&self, event_id: &str) -> PathBuf {
        self.dir.join(format!("{event_id}.json"))
    }
}

impl SnapshotFeed for DirectoryFeed {
    fn fetch(&self, event_id: &str, _timeout: Duration) -> gf_core::Result<Vec<u8>> {
        let path = self.snapshot_path(event_id);
        fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => FeedError::FetchUnavailable(event_id.to_string()),
            ErrorKind::TimedOut => FeedError::FetchTimeout(event_id.to_string()),
            _ => FeedError::FetchUnavailable(format!("{event_id} ({}): {e}", path.display())),
        })
    }
}

/// Serves completed games from a [`SnapshotCache`] and fills it as games go
/// final upstream.
pub struct CachingFeed<F> {
    inner: F,
    cache: SnapshotCache,
    parser: SnapshotParser,
}

impl<F: SnapshotFeed> CachingFeed<F> {
    pub fn new(inner: F, cache: SnapshotCache) -> Self {
        Self { inner, cache, parser: SnapshotParser::default() }
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }
}

impl<F: SnapshotFeed> SnapshotFeed for CachingFeed<F> {
    fn fetch(&self, event_id: &str, timeout: Duration) -> gf_core::Result<Vec<u8>> {
        if self.cache.contains(event_id) {
            match self.cache.load(event_id) {
                Ok(raw) => {
                    debug!(event_id, "served from cache");
                    return Ok(raw);
                }
                Err(e) => warn!(event_id, error = %e, "ignoring unreadable cache entry"),
            }
        }

        let raw = self.inner.fetch(event_id, timeout)?;
        let is_final = self.parser.parse(event_id, &raw).is_ok_and(|s| s.is_over());
        if is_final {
            if let Err(e) = self.cache.store(event_id, &raw) {
                warn!(event_id, error = %e, "failed to cache completed game");
            }
        }
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    const EVENT_ID: &str = "2012090900";
    const TIMEOUT: Duration = Duration::from_secs(5);

    fn game(qtr: &str) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            EVENT_ID: {
                "home": { "abbr": "NE", "score": { "T": 20 } },
                "away": { "abbr": "MIA", "score": { "T": 17 } },
                "qtr": qtr,
                "clock": "00:00",
            },
            "nextupdate": 12,
        }))
        .unwrap()
    }

    struct CountingFeed {
        payload: Vec<u8>,
        fetches: AtomicUsize,
    }

    impl SnapshotFeed for CountingFeed {
        fn fetch(&self, _event_id: &str, _timeout: Duration) -> gf_core::Result<Vec<u8>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.payload.clone())
        }
    }

    #[test]
    fn test_directory_feed() {
        let dir = TempDir::new().unwrap();
        let feed = DirectoryFeed::new(dir.path());
        assert!(matches!(feed.fetch(EVENT_ID, TIMEOUT), Err(FeedError::FetchUnavailable(_))));

        fs::write(feed.snapshot_path(EVENT_ID), game("2")).unwrap();
        assert_eq!(feed.fetch(EVENT_ID, TIMEOUT).unwrap(), game("2"));
    }

    #[test]
    fn test_empty_file_passes_through() {
        let dir = TempDir::new().unwrap();
        let feed = DirectoryFeed::new(dir.path());
        fs::write(feed.snapshot_path(EVENT_ID), b"").unwrap();
        assert!(feed.fetch(EVENT_ID, TIMEOUT).unwrap().is_empty());
    }

    #[test]
    fn test_final_game_is_cached_once() {
        let dir = TempDir::new().unwrap();
        let cache = SnapshotCache::open(dir.path()).unwrap();
        let inner = CountingFeed { payload: game("Final"), fetches: AtomicUsize::new(0) };
        let feed = CachingFeed::new(inner, cache);

        feed.fetch(EVENT_ID, TIMEOUT).unwrap();
        assert!(feed.cache().contains(EVENT_ID));
        let raw = feed.fetch(EVENT_ID, TIMEOUT).unwrap();
        assert_eq!(feed.inner.fetches.load(Ordering::SeqCst), 1);

        let snap = SnapshotParser::default().parse(EVENT_ID, &raw).unwrap();
        assert!(snap.is_over());
    }

    #[test]
    fn test_game_in_progress_is_not_cached() {
        let dir = TempDir::new().unwrap();
        let cache = SnapshotCache::open(dir.path()).unwrap();
        let inner = CountingFeed { payload: game("3"), fetches: AtomicUsize::new(0) };
        let feed = CachingFeed::new(inner, cache);

        feed.fetch(EVENT_ID, TIMEOUT).unwrap();
        feed.fetch(EVENT_ID, TIMEOUT).unwrap();
        assert!(!feed.cache().contains(EVENT_ID));
        assert_eq!(feed.inner.fetches.load(Ordering::SeqCst), 2);
    }
}
