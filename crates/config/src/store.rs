//! Object store configuration
//!
//! Credentials and addressing for the bucket that rotated spool files
//! are uploaded to. The same credentials are embedded in the warehouse
//! COPY command, so the warehouse must be able to read this bucket.

use serde::Deserialize;

/// S3 bucket and credential settings
///
/// # Example
///
/// ```toml
/// [store]
/// bucket = "load-bucket"
/// region = "eu-west-1"
/// access_key_id = "AKIA..."
/// secret_access_key = "..."
/// ```
///
/// For S3-compatible stores (MinIO, localstack), set `endpoint`:
///
/// ```toml
/// [store]
/// bucket = "load-bucket"
/// endpoint = "http://localhost:9000"
/// access_key_id = "minioadmin"
/// secret_access_key = "minioadmin"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Destination bucket name
    /// Required
    pub bucket: String,

    /// AWS region
    /// Default: "us-east-1"
    pub region: String,

    /// Access key, also used in the COPY command credentials clause
    /// Required
    pub access_key_id: String,

    /// Secret key, also used in the COPY command credentials clause
    /// Required
    pub secret_access_key: String,

    /// Custom endpoint URL for S3-compatible stores
    /// Default: None (AWS)
    pub endpoint: Option<String>,

    /// Use path-style addressing instead of virtual-hosted
    /// Default: None (path-style when an endpoint is set)
    pub force_path_style: Option<bool>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: "us-east-1".into(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            endpoint: None,
            force_path_style: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.region, "us-east-1");
        assert!(config.endpoint.is_none());
        assert!(config.force_path_style.is_none());
    }

    #[test]
    fn test_deserialize_partial() {
        let toml = r#"
bucket = "load-bucket"
access_key_id = "AKIAEXAMPLE"
secret_access_key = "secret"
endpoint = "http://localhost:9000"
"#;
        let config: StoreConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.bucket, "load-bucket");
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:9000"));
        // Defaults still apply
        assert_eq!(config.region, "us-east-1");
    }
}
