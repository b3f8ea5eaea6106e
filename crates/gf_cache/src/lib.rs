//! Game Feed Cache Library
//!
//! File-backed collaborators for the `gf_core` poller: a directory feed, a
//! JSON schedule, and a cache of completed games
//! (JSON → MessagePack → LZ4 → SHA256 trailer).

pub mod cache;
pub mod error;
pub mod feed;
pub mod format;
pub mod schedule;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use cache::SnapshotCache;
pub use error::CacheError;
pub use feed::{CachingFeed, DirectoryFeed};
pub use schedule::JsonSchedule;

pub const CACHE_SCHEMA_VERSION: &str = "v1";

/// Metadata describing one cache entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub schema_version: String,
    pub event_id: String,
    /// SHA256 of the whole entry file (hex).
    pub checksum: String,
    /// RFC3339.
    pub created_at: String,
    pub original_size: u64,
    pub compressed_size: u64,
    /// Compressed size / original size.
    pub compression_ratio: f64,
}

/// Packs a saved feed payload into the cache.
///
/// The payload must parse as a snapshot of `event_id`; packing a game that
/// is not over is allowed but logged, since its entry would go stale.
pub fn pack_snapshot(snapshot: &Path, cache_dir: &Path, event_id: &str) -> Result<CacheMetadata> {
    let raw = fs::read(snapshot)
        .with_context(|| format!("Failed to read snapshot file: {}", snapshot.display()))?;
    let parsed = gf_core::SnapshotParser::default()
        .parse(event_id, &raw)
        .with_context(|| format!("Snapshot does not describe event {event_id}"))?;
    if !parsed.is_over() {
        tracing::warn!(event_id, clock = %parsed.clock, "packing a game that is not final");
    }

    let cache = SnapshotCache::open(cache_dir)
        .with_context(|| format!("Failed to open cache directory: {}", cache_dir.display()))?;
    let path = cache.store(event_id, &raw).context("Failed to write cache entry")?;
    let entry = fs::read(&path)
        .with_context(|| format!("Failed to read back cache entry: {}", path.display()))?;

    let original_size = raw.len() as u64;
    let compressed_size = entry.len() as u64;
    Ok(CacheMetadata {
        schema_version: CACHE_SCHEMA_VERSION.to_string(),
        event_id: event_id.to_string(),
        checksum: format::checksum_hex(&entry),
        created_at: chrono::Utc::now().to_rfc3339(),
        original_size,
        compressed_size,
        compression_ratio: compressed_size as f64 / original_size.max(1) as f64,
    })
}

/// Checks a cache entry's trailer and that it still decodes to a snapshot of
/// `event_id`. With `expected_checksum`, the file hash must match too.
pub fn verify_entry(
    cache_dir: &Path,
    event_id: &str,
    expected_checksum: Option<&str>,
) -> Result<bool> {
    let cache = SnapshotCache::open(cache_dir)
        .with_context(|| format!("Failed to open cache directory: {}", cache_dir.display()))?;
    let path = cache.entry_path(event_id);
    let entry =
        fs::read(&path).with_context(|| format!("Failed to read cache file: {}", path.display()))?;

    if let Some(expected) = expected_checksum {
        if format::checksum_hex(&entry) != expected {
            return Ok(false);
        }
    }
    let raw = match format::decode_entry(&entry) {
        Ok(raw) => raw,
        Err(CacheError::ChecksumMismatch | CacheError::Corrupted | CacheError::Decompression) => {
            return Ok(false)
        }
        Err(e) => return Err(e).context("Failed to decode cache entry"),
    };
    Ok(gf_core::SnapshotParser::default().parse(event_id, &raw).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const EVENT_ID: &str = "2012090900";

    fn write_final_game(dir: &Path) -> std::path::PathBuf {
        let path = dir.join(format!("{EVENT_ID}.json"));
        let plays: Vec<serde_json::Value> = (0..200)
            .map(|i| serde_json::json!({ "desc": "T.Brady pass short right", "n": i % 10 }))
            .collect();
        let payload = serde_json::json!({
            EVENT_ID: {
                "home": { "abbr": "NE", "score": { "T": 34 } },
                "away": { "abbr": "MIA", "score": { "T": 13 } },
                "qtr": "Final",
                "clock": "00:00",
                "padding": plays,
            },
            "nextupdate": 12,
        });
        fs::write(&path, serde_json::to_vec(&payload).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_pack_and_verify() -> Result<()> {
        let dir = TempDir::new()?;
        let snapshot = write_final_game(dir.path());
        let cache_dir = dir.path().join("cache");

        let meta = pack_snapshot(&snapshot, &cache_dir, EVENT_ID)?;
        assert_eq!(meta.schema_version, CACHE_SCHEMA_VERSION);
        assert!(meta.compressed_size < meta.original_size);
        assert!(meta.compression_ratio < 0.5);
        assert!(verify_entry(&cache_dir, EVENT_ID, Some(&meta.checksum))?);
        assert!(verify_entry(&cache_dir, EVENT_ID, None)?);
        assert!(!verify_entry(&cache_dir, EVENT_ID, Some("deadbeef"))?);
        Ok(())
    }

    #[test]
    fn test_pack_rejects_wrong_event() -> Result<()> {
        let dir = TempDir::new()?;
        let snapshot = write_final_game(dir.path());
        assert!(pack_snapshot(&snapshot, &dir.path().join("cache"), "2012090901").is_err());
        Ok(())
    }

    #[test]
    fn test_verify_detects_corruption() -> Result<()> {
        let dir = TempDir::new()?;
        let snapshot = write_final_game(dir.path());
        let cache_dir = dir.path().join("cache");
        pack_snapshot(&snapshot, &cache_dir, EVENT_ID)?;

        let path = SnapshotCache::open(&cache_dir)?.entry_path(EVENT_ID);
        let mut bytes = fs::read(&path)?;
        bytes[8] ^= 0x01;
        fs::write(&path, bytes)?;
        assert!(!verify_entry(&cache_dir, EVENT_ID, None)?);
        Ok(())
    }
}
