use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::CacheError;
use crate::format::{decode_entry, encode_entry};

pub const ENTRY_EXTENSION: &str = "json.lz4";

/// Completed-game payloads, one `<event_id>.json.lz4` entry per game.
///
/// Only final games belong here: their payload never changes again, so an
/// entry is written once and served for every later fetch.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    dir: PathBuf,
}

impl SnapshotCache {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entry_path(&self, event_id: &str) -> PathBuf {
        self.dir.join(format!("{event_id}.{ENTRY_EXTENSION}"))
    }

    pub fn contains(&self, event_id: &str) -> bool {
        self.entry_path(event_id).is_file()
    }

    /// Writes an entry through a temporary file so readers never see a
    /// partial one.
    pub fn store(&self, event_id: &str, raw_json: &[u8]) -> Result<PathBuf, CacheError> {
        let entry = encode_entry(raw_json)?;
        let path = self.entry_path(event_id);
        let tmp = path.with_extension("lz4.tmp");
        fs::write(&tmp, &entry)?;
        fs::rename(&tmp, &path)?;
        debug!(event_id, bytes = entry.len(), "cached completed game");
        Ok(path)
    }

    pub fn load(&self, event_id: &str) -> Result<Vec<u8>, CacheError> {
        let path = self.entry_path(event_id);
        if !path.is_file() {
            return Err(CacheError::NotFound { event_id: event_id.to_string() });
        }
        let entry = fs::read(&path)?;
        decode_entry(&entry)
    }

    pub fn remove(&self, event_id: &str) -> Result<(), CacheError> {
        let path = self.entry_path(event_id);
        if path.is_file() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}
