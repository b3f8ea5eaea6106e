use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] rmp_serde::encode::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] rmp_serde::decode::Error),

    #[error("Decompression error")]
    Decompression,

    #[error("Corrupted cache entry")]
    Corrupted,

    #[error("Checksum mismatch")]
    ChecksumMismatch,

    #[error("No cache entry for event {event_id}")]
    NotFound { event_id: String },
}

impl CacheError {
    /// Whether refetching from the upstream feed can fix the problem.
    pub fn is_recoverable(&self) -> bool {
        match self {
            CacheError::Io(_) => true,
            CacheError::NotFound { .. } => true,
            CacheError::Corrupted => true,
            CacheError::ChecksumMismatch => true,
            CacheError::Decompression => true,
            _ => false,
        }
    }
}
