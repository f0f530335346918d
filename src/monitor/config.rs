//! Monitor configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::matcher::candidate::DEFAULT_SLOW_LOG_LIMIT;

/// Configuration for a [`Monitor`](crate::monitor::Monitor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Verifications slower than this are recorded in the slow log.
    #[serde(default = "default_slow_log_limit")]
    pub slow_log_limit: Duration,
}

fn default_slow_log_limit() -> Duration {
    DEFAULT_SLOW_LOG_LIMIT
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            slow_log_limit: DEFAULT_SLOW_LOG_LIMIT,
        }
    }
}

impl MonitorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slow_log_limit(mut self, limit: Duration) -> Self {
        self.slow_log_limit = limit;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip() {
        let config = MonitorConfig::new().with_slow_log_limit(Duration::from_millis(250));
        let decoded = MonitorConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(decoded, config);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = MonitorConfig::from_json("{}").unwrap();
        assert_eq!(config.slow_log_limit, Duration::from_secs(2));
        assert!(MonitorConfig::from_json("not json").is_err());
    }
}
