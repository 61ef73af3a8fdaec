//! The bulk loader engine.
//!
//! A [`BulkLoader`] task owns the active spool file and row counter;
//! callers interact through a cloneable [`LoaderHandle`]. All buffer
//! mutation happens inside the task, so inserts, threshold checks, idle
//! flushes, and explicit flushes never race each other.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use gantry_store::{Credentials, ObjectStore};
use gantry_warehouse::Warehouse;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::encode::{Row, encode_row_into};
use crate::error::LoaderError;
use crate::events::{EventRegistry, FlushEvent, FlushStarted};
use crate::flush;
use crate::metrics::{LoaderMetrics, LoaderMetricsSnapshot};
use crate::spool::{FileNamer, Spool, SpoolFile};

/// Buffered row count that triggers a rotation unless overridden.
pub const DEFAULT_THRESHOLD: u64 = 1000;

/// Idle period after which a non-empty buffer is flushed, unless
/// overridden.
pub const DEFAULT_IDLE_FLUSH: Duration = Duration::from_millis(10_000);

const DEFAULT_QUEUE_SIZE: usize = 1024;
const DEFAULT_EVENT_QUEUE_SIZE: usize = 256;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for one [`BulkLoader`].
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Target warehouse table.
    pub table: String,
    /// Column names, in spool line field order.
    pub fields: Vec<String>,
    /// Directory holding spool files.
    pub spool_dir: PathBuf,
    /// Buffered row count that triggers a rotation.
    pub threshold: u64,
    /// Idle period after which a non-empty buffer is flushed.
    pub idle_flush: Duration,
    /// Destination bucket for sealed spool files.
    pub bucket: String,
    /// Key pair used for uploads and the COPY credentials clause.
    pub credentials: Credentials,
    /// Command channel capacity.
    pub queue_size: usize,
    /// Per-subscriber event channel capacity.
    pub event_queue_size: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            table: String::new(),
            fields: Vec::new(),
            spool_dir: PathBuf::from("spool"),
            threshold: DEFAULT_THRESHOLD,
            idle_flush: DEFAULT_IDLE_FLUSH,
            bucket: String::new(),
            credentials: Credentials::new("", ""),
            queue_size: DEFAULT_QUEUE_SIZE,
            event_queue_size: DEFAULT_EVENT_QUEUE_SIZE,
        }
    }
}

impl LoaderConfig {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    pub fn with_fields(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_spool_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.spool_dir = dir.into();
        self
    }

    pub fn with_threshold(mut self, threshold: u64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_idle_flush(mut self, period: Duration) -> Self {
        self.idle_flush = period;
        self
    }

    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_queue_size(mut self, size: usize) -> Self {
        self.queue_size = size;
        self
    }

    pub fn with_event_queue_size(mut self, size: usize) -> Self {
        self.event_queue_size = size;
        self
    }

    /// Checks field values; [`BulkLoader::spawn`] calls this before doing
    /// anything else.
    pub fn validate(&self) -> Result<(), LoaderError> {
        if self.table.is_empty() {
            return Err(LoaderError::config("table must not be empty"));
        }
        if self.fields.is_empty() {
            return Err(LoaderError::config("fields must not be empty"));
        }
        if self.threshold == 0 {
            return Err(LoaderError::config("threshold must be at least 1"));
        }
        if self.idle_flush.is_zero() {
            return Err(LoaderError::config("idle_flush must be positive"));
        }
        if self.bucket.is_empty() {
            return Err(LoaderError::config("bucket must not be empty"));
        }
        if self.queue_size == 0 {
            return Err(LoaderError::config("queue_size must be at least 1"));
        }
        Ok(())
    }
}

// =============================================================================
// Shared state
// =============================================================================

/// State shared between the loader task, its handles, and in-flight
/// flush operations.
pub(crate) struct LoaderShared {
    pub(crate) config: LoaderConfig,
    pub(crate) store: Arc<dyn ObjectStore>,
    pub(crate) warehouse: Arc<dyn Warehouse>,
    pub(crate) events: EventRegistry<FlushEvent>,
    pub(crate) metrics: LoaderMetrics,
    pub(crate) active_flushes: AtomicU64,
}

enum Command {
    Insert(Row),
    Flush {
        reply: oneshot::Sender<Result<Option<FlushStarted>, LoaderError>>,
    },
    Close {
        reply: oneshot::Sender<Result<(), LoaderError>>,
    },
}

// =============================================================================
// Loader task
// =============================================================================

/// Task owning the spool and row counter for one table.
pub struct BulkLoader {
    shared: Arc<LoaderShared>,
    receiver: mpsc::Receiver<Command>,
    spool: Spool,
    namer: FileNamer,
    rows: u64,
    idle_deadline: Instant,
    line: String,
}

impl BulkLoader {
    /// Validates `config`, opens the first spool file, and spawns the
    /// loader task. The returned handle is cheap to clone.
    pub fn spawn(
        config: LoaderConfig,
        store: Arc<dyn ObjectStore>,
        warehouse: Arc<dyn Warehouse>,
    ) -> Result<LoaderHandle, LoaderError> {
        config.validate()?;
        std::fs::create_dir_all(&config.spool_dir)
            .map_err(|e| LoaderError::spool(config.spool_dir.display().to_string(), e))?;

        let mut namer = FileNamer::new(&config.table);
        let file = SpoolFile::new(namer.next(), &config.spool_dir);
        let spool_path = file.path.display().to_string();
        let spool = Spool::open(file).map_err(|e| LoaderError::spool(spool_path, e))?;

        let (sender, receiver) = mpsc::channel(config.queue_size);
        let idle_flush = config.idle_flush;
        let shared = Arc::new(LoaderShared {
            events: EventRegistry::new(config.event_queue_size),
            config,
            store,
            warehouse,
            metrics: LoaderMetrics::new(),
            active_flushes: AtomicU64::new(0),
        });

        let loader = BulkLoader {
            shared: Arc::clone(&shared),
            receiver,
            spool,
            namer,
            rows: 0,
            idle_deadline: Instant::now() + idle_flush,
            line: String::new(),
        };
        tokio::spawn(loader.run());

        Ok(LoaderHandle { sender, shared })
    }

    async fn run(mut self) {
        tracing::info!(
            table = %self.shared.config.table,
            spool = %self.spool.file(),
            threshold = self.shared.config.threshold,
            "bulk loader started"
        );

        loop {
            tokio::select! {
                command = self.receiver.recv() => {
                    match command {
                        Some(Command::Insert(row)) => self.handle_insert(row),
                        Some(Command::Flush { reply }) => {
                            let _ = reply.send(self.flush_now());
                        }
                        Some(Command::Close { reply }) => {
                            let _ = reply.send(self.close_spool());
                            break;
                        }
                        None => {
                            // Every handle dropped; stop without rotating.
                            if let Err(error) = self.close_spool() {
                                tracing::error!(error = %error, "failed to close spool");
                            }
                            break;
                        }
                    }
                }
                _ = tokio::time::sleep_until(self.idle_deadline) => {
                    if let Err(error) = self.flush_now() {
                        tracing::error!(error = %error, "idle flush failed");
                    }
                }
            }
        }

        let snapshot = self.shared.metrics.snapshot();
        tracing::info!(
            table = %self.shared.config.table,
            rows = snapshot.rows_inserted,
            rotations = snapshot.rotations,
            flushes_failed = snapshot.flushes_failed,
            "bulk loader stopped"
        );
    }

    fn handle_insert(&mut self, row: Row) {
        encode_row_into(&mut self.line, &row);
        if let Err(error) = self.spool.write_line(&self.line) {
            self.shared.metrics.record_insert_error();
            tracing::error!(
                error = %error,
                file = %self.spool.file(),
                "failed to append row to spool"
            );
            return;
        }
        self.rows += 1;
        self.shared.metrics.record_row();

        if self.rows >= self.shared.config.threshold
            && let Err(error) = self.flush_now()
        {
            tracing::error!(error = %error, "threshold flush failed");
        }
    }

    /// Rotates and starts a flush operation if the buffer holds rows.
    /// Always re-arms the idle timer.
    fn flush_now(&mut self) -> Result<Option<FlushStarted>, LoaderError> {
        self.idle_deadline = Instant::now() + self.shared.config.idle_flush;

        if self.rows == 0 {
            return Ok(None);
        }

        let next = SpoolFile::new(self.namer.next(), &self.shared.config.spool_dir);
        let sealed = self.spool.rotate(next).map_err(|e| {
            LoaderError::spool(self.shared.config.spool_dir.display().to_string(), e)
        })?;

        let rows = std::mem::take(&mut self.rows);
        let started = FlushStarted {
            file: sealed,
            rows,
            started_at: Utc::now(),
        };

        self.shared.metrics.record_rotation();
        self.shared.active_flushes.fetch_add(1, Ordering::Relaxed);
        self.shared
            .events
            .publish(&FlushEvent::Started(started.clone()));
        tracing::debug!(file = %started.file, rows, "spool rotated, flush started");
        tokio::spawn(flush::run(Arc::clone(&self.shared), started.clone()));

        Ok(Some(started))
    }

    /// Flushes buffered bytes and stops without rotating; buffered rows
    /// stay in the spool file on disk.
    fn close_spool(&mut self) -> Result<(), LoaderError> {
        self.spool
            .sync()
            .map_err(|e| LoaderError::spool(self.spool.file().path.display().to_string(), e))
    }
}

// =============================================================================
// Handle
// =============================================================================

/// Cloneable handle to a running [`BulkLoader`].
#[derive(Clone)]
pub struct LoaderHandle {
    sender: mpsc::Sender<Command>,
    shared: Arc<LoaderShared>,
}

impl LoaderHandle {
    /// Queues one row for buffering. Waits only for queue space, never
    /// for disk or network I/O.
    pub async fn insert(&self, row: Row) -> Result<(), LoaderError> {
        self.sender
            .send(Command::Insert(row))
            .await
            .map_err(|_| LoaderError::Closed)
    }

    /// Blocking variant of [`LoaderHandle::insert`] for synchronous
    /// callers. Must not be called from within an async runtime.
    pub fn insert_blocking(&self, row: Row) -> Result<(), LoaderError> {
        self.sender
            .blocking_send(Command::Insert(row))
            .map_err(|_| LoaderError::Closed)
    }

    /// Rotates the buffer and starts a flush operation.
    ///
    /// Returns `Ok(None)` when the buffer was empty: no rotation, no
    /// operation, but the idle timer still re-arms. The returned
    /// [`FlushStarted`] describes the operation this call started; the
    /// operation itself proceeds in the background.
    pub async fn flush(&self) -> Result<Option<FlushStarted>, LoaderError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(Command::Flush { reply })
            .await
            .map_err(|_| LoaderError::Closed)?;
        response.await.map_err(|_| LoaderError::Closed)?
    }

    /// Stops the loader without a final rotation.
    ///
    /// The idle timer dies with the loader task and the spool writer is
    /// flushed and closed; rows still buffered remain in the spool file
    /// on disk. In-flight flush operations and pending retry timers are
    /// not awaited.
    pub async fn close(&self) -> Result<(), LoaderError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(Command::Close { reply })
            .await
            .map_err(|_| LoaderError::Closed)?;
        response.await.map_err(|_| LoaderError::Closed)?
    }

    /// Registers an observer for flush lifecycle events.
    pub fn subscribe(&self) -> (u64, mpsc::Receiver<FlushEvent>) {
        self.shared.events.subscribe()
    }

    /// Removes a subscriber registered with [`LoaderHandle::subscribe`].
    pub fn unsubscribe(&self, id: u64) -> bool {
        self.shared.events.unsubscribe(id)
    }

    /// Number of flush operations currently in flight.
    pub fn active_flushes(&self) -> u64 {
        self.shared.active_flushes.load(Ordering::Relaxed)
    }

    pub fn metrics(&self) -> LoaderMetricsSnapshot {
        self.shared.metrics.snapshot()
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    pub fn table(&self) -> &str {
        &self.shared.config.table
    }
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod loader_test;
