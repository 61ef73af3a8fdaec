//! Flush lifecycle events and subscriber fan-out.
//!
//! Observers (the retry policy, tests, operational tooling) subscribe to
//! a loader and receive events over bounded channels. Fan-out never
//! blocks: a subscriber that stops draining its channel loses events
//! rather than stalling the loader.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::error::FlushError;
use crate::spool::SpoolFile;

/// Events published over a loader's registry.
#[derive(Debug, Clone)]
pub enum FlushEvent {
    /// A rotation produced a new flush operation.
    Started(FlushStarted),
    /// An operation terminated, successfully or not.
    Completed(FlushOutcome),
}

/// Description of a flush operation at the moment of rotation.
#[derive(Debug, Clone)]
pub struct FlushStarted {
    /// The sealed spool file the operation will ship.
    pub file: SpoolFile,
    /// Rows buffered into the file.
    pub rows: u64,
    pub started_at: DateTime<Utc>,
}

/// Terminal report of one flush operation.
#[derive(Debug, Clone)]
pub struct FlushOutcome {
    pub file: SpoolFile,
    pub rows: u64,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub result: Result<FlushStats, FlushError>,
}

impl FlushOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Row and byte counts for a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushStats {
    pub rows: u64,
    pub bytes: u64,
}

// =============================================================================
// Registry
// =============================================================================

struct RegisteredSubscriber<T> {
    id: u64,
    sender: mpsc::Sender<T>,
}

/// Set of subscribers receiving cloned events.
///
/// Delivery is best-effort `try_send`; a full subscriber queue drops that
/// event for that subscriber only. Closed receivers are pruned on the
/// next publish.
pub struct EventRegistry<T> {
    subscribers: RwLock<Vec<RegisteredSubscriber<T>>>,
    next_id: AtomicU64,
    capacity: usize,
}

impl<T: Clone> EventRegistry<T> {
    /// Creates a registry whose subscriber channels hold `capacity`
    /// undelivered events each.
    pub fn new(capacity: usize) -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            capacity: capacity.max(1),
        }
    }

    /// Registers a subscriber, returning its id and event channel.
    pub fn subscribe(&self) -> (u64, mpsc::Receiver<T>) {
        let (sender, receiver) = mpsc::channel(self.capacity);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers
            .write()
            .push(RegisteredSubscriber { id, sender });
        (id, receiver)
    }

    /// Removes a subscriber. Returns false when the id is unknown.
    pub fn unsubscribe(&self, id: u64) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        subscribers.len() != before
    }

    /// Number of registered subscribers, including ones whose receiver
    /// has gone away but has not been pruned yet.
    pub fn count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Fans `event` out to every subscriber; returns how many received it.
    pub fn publish(&self, event: &T) -> usize {
        let mut sent = 0;
        let mut any_closed = false;
        {
            let subscribers = self.subscribers.read();
            for subscriber in subscribers.iter() {
                match subscriber.sender.try_send(event.clone()) {
                    Ok(()) => sent += 1,
                    Err(TrySendError::Full(_)) => {
                        tracing::debug!(
                            subscriber = subscriber.id,
                            "subscriber queue full, event dropped"
                        );
                    }
                    Err(TrySendError::Closed(_)) => any_closed = true,
                }
            }
        }
        if any_closed {
            self.cleanup_disconnected();
        }
        sent
    }

    /// Drops subscribers whose receiver has gone away; returns how many
    /// were removed.
    pub fn cleanup_disconnected(&self) -> usize {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|s| !s.sender.is_closed());
        before - subscribers.len()
    }
}

#[cfg(test)]
#[path = "events_test.rs"]
mod events_test;
