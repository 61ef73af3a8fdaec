//! Retry configuration
//!
//! Failed flushes can be retried with capped exponential backoff.
//! Retries are off by default: a failed flush leaves its spool file on
//! disk and surfaces an exhausted event immediately.

use serde::Deserialize;
use std::time::Duration;

/// Backoff settings for re-flushing after a failed flush
///
/// The delay before attempt `n` is `min(max_delay, time_slot * 2^(n-1))`.
///
/// # Example
///
/// ```toml
/// [retry]
/// max_retries = 5
/// time_slot = "500ms"
/// max_delay = "30s"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries allowed per failed file before giving up
    /// Default: 0 (no retries)
    pub max_retries: u32,

    /// Base delay unit for backoff
    /// Default: 1s
    #[serde(with = "humantime_serde")]
    pub time_slot: Duration,

    /// Upper bound on any single delay
    /// Default: 60s
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            time_slot: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.time_slot, Duration::from_secs(1));
        assert_eq!(config.max_delay, Duration::from_secs(60));
    }

    #[test]
    fn test_deserialize_partial() {
        let toml = r#"
max_retries = 5
time_slot = "500ms"
"#;
        let config: RetryConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.time_slot, Duration::from_millis(500));
        // Defaults still apply
        assert_eq!(config.max_delay, Duration::from_secs(60));
    }
}
