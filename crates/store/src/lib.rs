//! Object storage backends for spooled load files.
//!
//! The loader talks to storage through the [`ObjectStore`] trait. [`S3Store`]
//! is the production backend and works against AWS S3 or any S3-compatible
//! endpoint; [`MemoryStore`] keeps objects in a map and exists for tests and
//! local development.

mod error;
mod memory;
mod s3;

pub use error::{BoxError, Result, StoreError};
pub use memory::MemoryStore;
pub use s3::{S3Config, S3Store};

use async_trait::async_trait;
use bytes::Bytes;

/// Access key pair for an S3-compatible service.
///
/// The same pair signs object uploads and is embedded in the warehouse
/// COPY credentials clause, so it lives here as a standalone type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }
}

/// Write access to a bucket of objects.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `body` under `key` in `bucket`, replacing any existing object.
    async fn put(&self, bucket: &str, key: &str, body: Bytes) -> Result<()>;
}
