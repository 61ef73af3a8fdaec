//! Warehouse side of the load pipeline.
//!
//! A [`Warehouse`] executes SQL shipped by the loader, which in practice
//! means the COPY command built by [`CopyCommand`]. [`RedshiftWarehouse`]
//! rides on a sqlx Postgres pool (Redshift speaks the Postgres wire
//! protocol); [`MemoryWarehouse`] records commands for tests.

mod copy;
mod error;
mod memory;
mod redshift;

pub use copy::CopyCommand;
pub use error::{BoxError, Result, WarehouseError};
pub use memory::MemoryWarehouse;
pub use redshift::RedshiftWarehouse;

use async_trait::async_trait;

/// Executes load commands against a warehouse.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Runs `sql`, returning the affected row count where the server
    /// reports one.
    async fn execute(&self, sql: &str) -> Result<u64>;
}
