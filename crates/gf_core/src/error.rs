use thiserror::Error;

/// Every failure the reconstruction, diff and polling layers can report.
///
/// Feed and fetch failures are local to one event and one tick. Contract
/// violations (`NegativeDuration`, `IdentityMismatch`, `EventIdentityMismatch`)
/// point at a logic defect and must not be swallowed.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Malformed field position: {0:?}")]
    MalformedPosition(String),

    #[error("Malformed game clock: {0:?}")]
    MalformedClock(String),

    #[error("Negative possession duration: {minuend}s - {subtrahend}s")]
    NegativeDuration { minuend: u32, subtrahend: u32 },

    #[error("Stat owner mismatch: {left} vs {right}")]
    IdentityMismatch { left: String, right: String },

    #[error("Empty feed payload")]
    EmptyFeed,

    #[error("Event {0} not present in feed payload")]
    UnknownEventId(String),

    #[error("Cannot diff snapshots of different events: {before} vs {after}")]
    EventIdentityMismatch { before: String, after: String },

    #[error("Fetch timed out for event {0}")]
    FetchTimeout(String),

    #[error("Feed unavailable for event {0}")]
    FetchUnavailable(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Schedule error: {0}")]
    Schedule(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl FeedError {
    /// Whether the poller may skip the affected event and retry next tick.
    pub fn is_recoverable(&self) -> bool {
        match self {
            FeedError::NegativeDuration { .. } => false,
            FeedError::IdentityMismatch { .. } => false,
            FeedError::EventIdentityMismatch { .. } => false,
            FeedError::Config(_) => false,
            _ => true,
        }
    }
}

pub type Result<T> = std::result::Result<T, FeedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_violations_are_not_recoverable() {
        assert!(!FeedError::NegativeDuration { minuend: 1, subtrahend: 2 }.is_recoverable());
        assert!(!FeedError::IdentityMismatch { left: "a".into(), right: "b".into() }
            .is_recoverable());
        assert!(!FeedError::EventIdentityMismatch { before: "1".into(), after: "2".into() }
            .is_recoverable());
    }

    #[test]
    fn test_feed_errors_are_recoverable() {
        assert!(FeedError::EmptyFeed.is_recoverable());
        assert!(FeedError::FetchTimeout("2012090500".into()).is_recoverable());
        assert!(FeedError::FetchUnavailable("2012090500".into()).is_recoverable());
        assert!(FeedError::MalformedPosition("NE".into()).is_recoverable());
        assert!(FeedError::UnknownEventId("x".into()).is_recoverable());
    }
}
