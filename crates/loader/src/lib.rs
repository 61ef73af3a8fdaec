//! Buffered bulk loading into a warehouse by way of object storage.
//!
//! Rows are encoded to delimited lines and appended to a local spool
//! file. When the buffered row count reaches a threshold, or the loader
//! sits idle long enough, the spool rotates and a flush operation ships
//! the sealed file: upload to the bucket, COPY into the warehouse,
//! delete the local copy. A decoupled [`RetryPolicy`] can watch the
//! event stream and re-trigger flushes with capped backoff.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use gantry_loader::{BulkLoader, Datum, LoaderConfig};
//! use gantry_store::{Credentials, MemoryStore};
//! use gantry_warehouse::MemoryWarehouse;
//!
//! # async fn demo() -> Result<(), gantry_loader::LoaderError> {
//! let config = LoaderConfig::new("events")
//!     .with_fields(["id", "name"])
//!     .with_bucket("load-bucket")
//!     .with_credentials(Credentials::new("key-id", "secret"));
//! let loader = BulkLoader::spawn(
//!     config,
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(MemoryWarehouse::new()),
//! )?;
//!
//! loader.insert(vec![Datum::from(1i64), Datum::from("alice")]).await?;
//! loader.flush().await?;
//! # Ok(())
//! # }
//! ```

mod encode;
mod error;
mod events;
mod flush;
mod loader;
mod metrics;
mod retry;
mod spool;

pub use encode::{Datum, FIELD_DELIMITER, NULL_TOKEN, Row, encode_row, encode_row_into};
pub use error::{FlushError, FlushStage, LoaderError};
pub use events::{EventRegistry, FlushEvent, FlushOutcome, FlushStarted, FlushStats};
pub use loader::{
    BulkLoader, DEFAULT_IDLE_FLUSH, DEFAULT_THRESHOLD, LoaderConfig, LoaderHandle,
};
pub use metrics::{LoaderMetricsSnapshot, RetryMetricsSnapshot};
pub use retry::{RetryCalculation, RetryConfig, RetryEvent, RetryPolicy, binary_backoff};
pub use spool::{FileNamer, Spool, SpoolFile};
