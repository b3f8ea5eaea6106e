//! Poller cadence configuration.
//!
//! ```yaml
//! active_interval_secs: 15
//! inactive_interval_secs: 900
//! tie_policy:
//!   type: both_teams
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{env, fs};

use crate::error::{FeedError, Result};
use crate::models::TiePolicy;

/// Environment variable naming a YAML or JSON config file.
pub const POLLER_CONFIG_ENV: &str = "GF_POLLER_CONFIG";

/// Largest interval `chrono` can represent as a millisecond duration.
pub const MAX_INTERVAL_SECS: u64 = (i64::MAX / 1000) as u64;

fn chrono_secs(secs: u64) -> chrono::Duration {
    chrono::Duration::seconds(secs.min(MAX_INTERVAL_SECS) as i64)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PollerConfig {
    /// Sleep between ticks while events are being tracked.
    pub active_interval_secs: u64,
    /// Sleep between ticks while nothing is in progress. Also how far ahead
    /// an upcoming start makes an event a candidate.
    pub inactive_interval_secs: u64,
    /// An event running longer than this is dropped even if the feed never
    /// reports it final.
    pub max_event_duration_secs: u64,
    /// How often the current schedule window is re-read.
    pub window_refresh_secs: u64,
    pub fetch_timeout_secs: u64,
    pub tie_policy: TiePolicy,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            active_interval_secs: 15,
            inactive_interval_secs: 900,
            max_event_duration_secs: 6 * 60 * 60,
            window_refresh_secs: 12 * 60 * 60,
            fetch_timeout_secs: 5,
            tie_policy: TiePolicy::default(),
        }
    }
}

impl PollerConfig {
    /// Parses YAML; JSON is accepted as well since it is a YAML subset.
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| FeedError::Config(e.to_string()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| FeedError::Config(e.to_string()))
    }

    /// Loads and validates a config file. `.json` files go through the JSON
    /// parser, everything else through YAML.
    pub fn from_file(path: &str) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| FeedError::Config(format!("failed to read {path}: {e}")))?;
        let config =
            if path.ends_with(".json") { Self::from_json(&text)? } else { Self::from_yaml(&text)? };
        config.validate()?;
        Ok(config)
    }

    /// Config from the file named by `GF_POLLER_CONFIG`, or defaults when the
    /// variable is unset or blank.
    pub fn from_env() -> Result<Self> {
        let Ok(path) = env::var(POLLER_CONFIG_ENV) else {
            return Ok(Self::default());
        };
        let path = path.trim();
        if path.is_empty() {
            return Ok(Self::default());
        }
        Self::from_file(path).map_err(|e| match e {
            FeedError::Config(msg) => {
                FeedError::Config(format!("{POLLER_CONFIG_ENV}='{path}': {msg}"))
            }
            other => other,
        })
    }

    pub fn validate(&self) -> Result<()> {
        let intervals = [
            ("active_interval_secs", self.active_interval_secs),
            ("inactive_interval_secs", self.inactive_interval_secs),
            ("max_event_duration_secs", self.max_event_duration_secs),
            ("window_refresh_secs", self.window_refresh_secs),
            ("fetch_timeout_secs", self.fetch_timeout_secs),
        ];
        for (name, value) in intervals {
            if value == 0 {
                return Err(FeedError::Config(format!("{name} must be greater than zero")));
            }
            if value > MAX_INTERVAL_SECS {
                return Err(FeedError::Config(format!(
                    "{name} must not exceed {MAX_INTERVAL_SECS} seconds"
                )));
            }
        }
        if let TiePolicy::Synthetic { label } = &self.tie_policy {
            if label.trim().is_empty() {
                return Err(FeedError::Config("tie_policy label must not be blank".into()));
            }
        }
        Ok(())
    }

    pub fn active_interval(&self) -> Duration {
        Duration::from_secs(self.active_interval_secs)
    }

    pub fn inactive_interval(&self) -> Duration {
        Duration::from_secs(self.inactive_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Chrono durations are clamped to [`MAX_INTERVAL_SECS`].
    pub fn max_event_duration(&self) -> chrono::Duration {
        chrono_secs(self.max_event_duration_secs)
    }

    pub fn window_refresh(&self) -> chrono::Duration {
        chrono_secs(self.window_refresh_secs)
    }

    pub fn lookahead(&self) -> chrono::Duration {
        chrono_secs(self.inactive_interval_secs)
    }
}
