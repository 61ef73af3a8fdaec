//! Loader configuration
//!
//! Controls buffering: which table rows belong to, where the spool
//! files live, and when a buffer is rotated out for shipping.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Buffering and rotation settings for a single table
///
/// # Example
///
/// ```toml
/// [loader]
/// table = "events"
/// fields = ["id", "payload"]
/// threshold = 2000
/// idle_flush = "5s"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Destination table name
    /// Required
    pub table: String,

    /// Column names, in insert order
    /// Required
    pub fields: Vec<String>,

    /// Directory for spool files
    /// Default: "spool"
    pub spool_dir: PathBuf,

    /// Row count that triggers a flush
    /// Default: 1000
    pub threshold: usize,

    /// Idle period after which a partial buffer is flushed
    /// Default: 10s
    #[serde(with = "humantime_serde")]
    pub idle_flush: Duration,

    /// Insert queue capacity
    /// Default: 1024
    pub queue_size: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            table: String::new(),
            fields: Vec::new(),
            spool_dir: PathBuf::from("spool"),
            threshold: 1000,
            idle_flush: Duration::from_secs(10),
            queue_size: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoaderConfig::default();
        assert_eq!(config.spool_dir, PathBuf::from("spool"));
        assert_eq!(config.threshold, 1000);
        assert_eq!(config.idle_flush, Duration::from_secs(10));
        assert_eq!(config.queue_size, 1024);
    }

    #[test]
    fn test_deserialize_partial() {
        let toml = r#"
table = "events"
fields = ["id", "payload"]
idle_flush = "250ms"
"#;
        let config: LoaderConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.table, "events");
        assert_eq!(config.fields, vec!["id", "payload"]);
        assert_eq!(config.idle_flush, Duration::from_millis(250));
        // Defaults still apply
        assert_eq!(config.threshold, 1000);
    }
}
