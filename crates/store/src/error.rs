//! Error types for the store crate.

use thiserror::Error;

/// Convenience alias used throughout the storage backends.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Boxed error carried as the source of a storage failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure while writing an object to a storage backend.
#[derive(Debug, Error)]
#[error("failed to upload '{key}' to bucket '{bucket}': {source}")]
pub struct StoreError {
    pub bucket: String,
    pub key: String,
    #[source]
    pub source: BoxError,
}

impl StoreError {
    pub fn upload(
        bucket: impl Into<String>,
        key: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            source: source.into(),
        }
    }
}
