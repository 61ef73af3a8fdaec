//! Redshift executor.
//!
//! Redshift speaks the Postgres wire protocol, so the executor is a thin
//! wrapper over a sqlx Postgres pool. The same type therefore also works
//! against plain Postgres, which is handy for local runs.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::Warehouse;
use crate::error::{Result, WarehouseError};

/// Warehouse backed by a Redshift (or Postgres) connection pool.
pub struct RedshiftWarehouse {
    pool: PgPool,
}

impl RedshiftWarehouse {
    /// Connects with a fixed-size pool.
    ///
    /// Overlapping flushes issue COPY commands concurrently, so the
    /// pool size caps how many loads run at once.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(WarehouseError::connect)?;
        Ok(Self { pool })
    }

    /// Wraps an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Warehouse for RedshiftWarehouse {
    async fn execute(&self, sql: &str) -> Result<u64> {
        let result = sqlx::query(sql)
            .execute(&self.pool)
            .await
            .map_err(WarehouseError::execute)?;
        let rows = result.rows_affected();
        tracing::debug!(rows_affected = rows, "warehouse command executed");
        Ok(rows)
    }
}
