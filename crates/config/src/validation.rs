//! Configuration validation
//!
//! Validates config consistency:
//! - Required identity fields are present (table, fields, bucket,
//!   credentials, warehouse URL)
//! - Tuning knobs are in range (thresholds and periods are nonzero)

use crate::Config;
use crate::error::{ConfigError, Result};

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_loader(config)?;
    validate_store(config)?;
    validate_warehouse(config)?;
    validate_retry(config)?;
    Ok(())
}

fn validate_loader(config: &Config) -> Result<()> {
    let loader = &config.loader;

    if loader.table.is_empty() {
        return Err(ConfigError::missing_field("loader", "table"));
    }
    if loader.fields.is_empty() {
        return Err(ConfigError::missing_field("loader", "fields"));
    }
    if loader.fields.iter().any(|f| f.is_empty()) {
        return Err(ConfigError::invalid_value(
            "loader",
            "fields",
            "field names must not be empty",
        ));
    }
    if loader.threshold == 0 {
        return Err(ConfigError::invalid_value(
            "loader",
            "threshold",
            "must be at least 1",
        ));
    }
    if loader.idle_flush.is_zero() {
        return Err(ConfigError::invalid_value(
            "loader",
            "idle_flush",
            "must be greater than zero",
        ));
    }
    if loader.queue_size == 0 {
        return Err(ConfigError::invalid_value(
            "loader",
            "queue_size",
            "must be at least 1",
        ));
    }

    Ok(())
}

fn validate_store(config: &Config) -> Result<()> {
    let store = &config.store;

    if store.bucket.is_empty() {
        return Err(ConfigError::missing_field("store", "bucket"));
    }
    if store.access_key_id.is_empty() {
        return Err(ConfigError::missing_field("store", "access_key_id"));
    }
    if store.secret_access_key.is_empty() {
        return Err(ConfigError::missing_field("store", "secret_access_key"));
    }

    Ok(())
}

fn validate_warehouse(config: &Config) -> Result<()> {
    let warehouse = &config.warehouse;

    if warehouse.url.is_empty() {
        return Err(ConfigError::missing_field("warehouse", "url"));
    }
    if warehouse.max_connections == 0 {
        return Err(ConfigError::invalid_value(
            "warehouse",
            "max_connections",
            "must be at least 1",
        ));
    }

    Ok(())
}

fn validate_retry(config: &Config) -> Result<()> {
    let retry = &config.retry;

    if retry.time_slot.is_zero() {
        return Err(ConfigError::invalid_value(
            "retry",
            "time_slot",
            "must be greater than zero",
        ));
    }
    if retry.max_delay.is_zero() {
        return Err(ConfigError::invalid_value(
            "retry",
            "max_delay",
            "must be greater than zero",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let toml = r#"
[loader]
table = "events"
fields = ["id", "payload"]

[store]
bucket = "load-bucket"
access_key_id = "AKIAEXAMPLE"
secret_access_key = "secret"

[warehouse]
url = "postgres://loader@localhost:5439/analytics"
"#;
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_table_rejected() {
        let mut config = valid_config();
        config.loader.table.clear();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingField {
                section: "loader",
                field: "table"
            }
        ));
    }

    #[test]
    fn test_empty_field_name_rejected() {
        let mut config = valid_config();
        config.loader.fields.push(String::new());
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                section: "loader",
                field: "fields",
                ..
            }
        ));
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let mut config = valid_config();
        config.loader.threshold = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_zero_idle_flush_rejected() {
        let mut config = valid_config();
        config.loader.idle_flush = std::time::Duration::ZERO;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let mut config = valid_config();
        config.store.secret_access_key.clear();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("secret_access_key"));
    }

    #[test]
    fn test_missing_warehouse_url_rejected() {
        let mut config = valid_config();
        config.warehouse.url.clear();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("[warehouse]"));
    }

    #[test]
    fn test_zero_time_slot_rejected() {
        let mut config = valid_config();
        config.retry.time_slot = std::time::Duration::ZERO;
        assert!(validate_config(&config).is_err());
    }
}
