//! Error types for the warehouse crate.

use thiserror::Error;

/// Convenience alias used throughout the warehouse backends.
pub type Result<T> = std::result::Result<T, WarehouseError>;

/// Boxed error carried as the source of a warehouse failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error("failed to connect to warehouse: {source}")]
    Connect {
        #[source]
        source: BoxError,
    },

    #[error("load command failed: {source}")]
    Execute {
        #[source]
        source: BoxError,
    },
}

impl WarehouseError {
    pub fn connect(source: impl Into<BoxError>) -> Self {
        Self::Connect {
            source: source.into(),
        }
    }

    pub fn execute(source: impl Into<BoxError>) -> Self {
        Self::Execute {
            source: source.into(),
        }
    }
}
