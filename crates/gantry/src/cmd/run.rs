//! Run command - read rows from stdin and load them
//!
//! Each stdin line is a JSON array with one element per configured
//! field, e.g. `["2024-01-05T12:00:00Z", 42, null]`. Lines that fail to
//! parse are logged and skipped; the loader keeps going. On EOF or
//! SIGINT/SIGTERM the remaining buffer is flushed, in-flight flushes
//! are drained, and the loader shuts down.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;

use gantry_config::Config;
use gantry_loader::{
    BulkLoader, Datum, LoaderConfig, LoaderHandle, RetryConfig, RetryPolicy, Row,
};
use gantry_store::{Credentials, S3Config, S3Store};
use gantry_warehouse::RedshiftWarehouse;
use serde_json::Value;

/// How long to wait for in-flight flushes after stdin closes
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "gantry.toml")]
    pub config: PathBuf,
}

pub async fn run(args: RunArgs) -> Result<()> {
    let config = Config::from_file(&args.config)
        .with_context(|| format!("failed to load config from {}", args.config.display()))?;

    let credentials = Credentials::new(
        config.store.access_key_id.clone(),
        config.store.secret_access_key.clone(),
    );

    let mut s3_config = S3Config::new(credentials.clone()).with_region(config.store.region.clone());
    if let Some(ref endpoint) = config.store.endpoint {
        s3_config = s3_config.with_endpoint(endpoint.clone());
    }
    if let Some(force) = config.store.force_path_style {
        s3_config = s3_config.with_force_path_style(force);
    }
    let store = Arc::new(S3Store::new(s3_config).await);

    let warehouse = Arc::new(
        RedshiftWarehouse::connect(&config.warehouse.url, config.warehouse.max_connections)
            .await
            .context("failed to connect to warehouse")?,
    );

    let loader_config = LoaderConfig::new(&config.loader.table)
        .with_fields(&config.loader.fields)
        .with_spool_dir(&config.loader.spool_dir)
        .with_threshold(config.loader.threshold as u64)
        .with_idle_flush(config.loader.idle_flush)
        .with_bucket(&config.store.bucket)
        .with_credentials(credentials)
        .with_queue_size(config.loader.queue_size);

    let loader = BulkLoader::spawn(loader_config, store, warehouse)?;

    let retry_config = RetryConfig::new(config.retry.max_retries)
        .with_time_slot(config.retry.time_slot)
        .with_max_delay(config.retry.max_delay);
    let policy = RetryPolicy::attach(loader.clone(), retry_config);

    tracing::info!(
        table = %config.loader.table,
        bucket = %config.store.bucket,
        spool_dir = %config.loader.spool_dir.display(),
        threshold = config.loader.threshold,
        "loader started, reading rows from stdin"
    );

    let arity = config.loader.fields.len();
    let mut inserted: u64 = 0;
    let mut skipped: u64 = 0;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut shutdown = std::pin::pin!(wait_for_shutdown());
    loop {
        tokio::select! {
            line = lines.next_line() => match line.context("failed to read stdin")? {
                Some(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match parse_row(line, arity) {
                        Ok(row) => {
                            loader
                                .insert(row)
                                .await
                                .context("loader stopped accepting rows")?;
                            inserted += 1;
                        }
                        Err(reason) => {
                            skipped += 1;
                            tracing::warn!(%reason, "skipping row");
                        }
                    }
                }
                None => {
                    tracing::info!(rows = inserted, skipped, "stdin closed, draining");
                    break;
                }
            },
            _ = &mut shutdown => {
                tracing::info!(rows = inserted, skipped, "shutdown signal received, draining");
                break;
            }
        }
    }

    loader.flush().await?;
    drain(&loader).await;
    loader.close().await?;
    policy.shutdown();

    let metrics = loader.metrics();
    tracing::info!(
        rows = metrics.rows_inserted,
        flushes = metrics.flushes_succeeded,
        failed_flushes = metrics.flushes_failed,
        bytes_uploaded = metrics.bytes_uploaded,
        "loader stopped"
    );

    Ok(())
}

/// Wait for SIGINT or SIGTERM
async fn wait_for_shutdown() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Wait for in-flight flush operations to finish, up to [`DRAIN_TIMEOUT`].
///
/// A flush that outlives the timeout leaves its spool file uploaded or
/// on disk per the usual failure handling; nothing is lost, the load
/// just isn't confirmed before exit.
async fn drain(loader: &LoaderHandle) {
    let deadline = Instant::now() + DRAIN_TIMEOUT;
    while loader.active_flushes() > 0 {
        if Instant::now() >= deadline {
            tracing::warn!(
                in_flight = loader.active_flushes(),
                "exiting with flushes still in flight"
            );
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

/// Parse one stdin line into a row.
fn parse_row(line: &str, arity: usize) -> Result<Row, String> {
    let value: Value = serde_json::from_str(line).map_err(|e| format!("invalid JSON: {e}"))?;
    let Value::Array(items) = value else {
        return Err("expected a JSON array".into());
    };
    if items.len() != arity {
        return Err(format!("expected {arity} fields, got {}", items.len()));
    }
    items.into_iter().map(json_datum).collect()
}

fn json_datum(value: Value) -> Result<Datum, String> {
    match value {
        Value::Null => Ok(Datum::Null),
        Value::Bool(b) => Ok(Datum::from(b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Datum::from(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Datum::from(f))
            } else {
                Err(format!("number {n} is out of range"))
            }
        }
        Value::String(s) => Ok(Datum::from(s)),
        Value::Array(_) | Value::Object(_) => Err("nested values are not supported".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_row_maps_json_types() {
        let row = parse_row(r#"["a", null, 7, 2.5, true]"#, 5).unwrap();
        assert_eq!(
            row,
            vec![
                Datum::from("a"),
                Datum::Null,
                Datum::from(7i64),
                Datum::from(2.5),
                Datum::from(true),
            ]
        );
    }

    #[test]
    fn test_parse_row_rejects_wrong_arity() {
        let err = parse_row(r#"["a", "b"]"#, 3).unwrap_err();
        assert!(err.contains("expected 3 fields"));
    }

    #[test]
    fn test_parse_row_rejects_non_array() {
        let err = parse_row(r#"{"id": 1}"#, 1).unwrap_err();
        assert!(err.contains("expected a JSON array"));
    }

    #[test]
    fn test_parse_row_rejects_nested_values() {
        let err = parse_row(r#"[["nested"]]"#, 1).unwrap_err();
        assert!(err.contains("nested"));
    }

    #[test]
    fn test_parse_row_rejects_invalid_json() {
        let err = parse_row("not json", 1).unwrap_err();
        assert!(err.contains("invalid JSON"));
    }

    #[test]
    fn test_integer_stays_integral() {
        // 7.0 and 7 encode differently downstream, so the distinction matters
        let row = parse_row("[7]", 1).unwrap();
        assert_eq!(row, vec![Datum::from(7i64)]);
        let row = parse_row("[7.0]", 1).unwrap();
        assert_eq!(row, vec![Datum::from(7.0)]);
    }
}
