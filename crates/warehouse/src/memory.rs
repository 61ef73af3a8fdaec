//! In-memory warehouse for tests.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::Warehouse;
use crate::error::{Result, WarehouseError};

/// Warehouse that records every executed command.
///
/// [`MemoryWarehouse::fail_next_executes`] arms failure injection for the
/// next `n` commands, mirroring the failure hooks on the in-memory object
/// store.
#[derive(Debug, Default)]
pub struct MemoryWarehouse {
    commands: Mutex<Vec<String>>,
    fail_executes: AtomicU32,
    rows_affected: AtomicU64,
    execute_delay_ms: AtomicU64,
}

impl MemoryWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `n` calls to `execute` fail with an injected error.
    pub fn fail_next_executes(&self, n: u32) {
        self.fail_executes.store(n, Ordering::SeqCst);
    }

    /// Sets the affected row count reported by subsequent commands.
    pub fn set_rows_affected(&self, rows: u64) {
        self.rows_affected.store(rows, Ordering::SeqCst);
    }

    /// Delays every subsequent command by `delay`, so tests can observe
    /// commands while they are still in flight.
    pub fn set_execute_delay(&self, delay: std::time::Duration) {
        self.execute_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Every command executed so far, oldest first. Injected failures are
    /// not recorded.
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().clone()
    }

    pub fn last_command(&self) -> Option<String> {
        self.commands.lock().last().cloned()
    }
}

#[async_trait]
impl Warehouse for MemoryWarehouse {
    async fn execute(&self, sql: &str) -> Result<u64> {
        let delay_ms = self.execute_delay_ms.load(Ordering::SeqCst);
        if delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
        }

        // Consume one injected failure if any are armed.
        let armed = self
            .fail_executes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if armed.is_ok() {
            return Err(WarehouseError::execute("injected load failure"));
        }
        self.commands.lock().push(sql.to_string());
        Ok(self.rows_affected.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_test;
