//! Decoupled retry of failed flush operations.
//!
//! A [`RetryPolicy`] subscribes to a loader's flush events and re-triggers
//! `flush()` after a computed delay whenever an operation fails. The
//! retry rides the normal flush path: it rotates whatever the buffer
//! holds at that moment into a new operation, and the policy carries the
//! attempt count forward to that operation. A lineage whose retry finds
//! an empty buffer simply ends; nothing new is in flight for it.
//!
//! Failures of distinct files are independent lineages, each with its own
//! attempt budget and at most one pending timer.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::error::FlushError;
use crate::events::{EventRegistry, FlushEvent, FlushOutcome};
use crate::loader::LoaderHandle;
use crate::metrics::{RetryMetrics, RetryMetricsSnapshot};
use crate::spool::SpoolFile;

const RETRY_EVENT_QUEUE_SIZE: usize = 64;

/// Computes the raw backoff delay for retry `attempt` (1-based) from the
/// configured time slot. The policy caps the result at its `max_delay`.
pub type RetryCalculation = Arc<dyn Fn(u32, Duration) -> Duration + Send + Sync>;

/// Deterministic exponential backoff: `time_slot * 2^(attempt - 1)`.
pub fn binary_backoff(attempt: u32, time_slot: Duration) -> Duration {
    // Shift capped so large attempt numbers cannot overflow.
    let exponent = attempt.saturating_sub(1).min(16);
    time_slot.saturating_mul(1u32 << exponent)
}

/// Configuration for [`RetryPolicy::attach`].
#[derive(Clone)]
pub struct RetryConfig {
    /// Retries allowed per operation lineage before giving up. Zero
    /// disables retrying entirely.
    pub max_retries: u32,
    /// Base delay unit fed to the calculation.
    pub time_slot: Duration,
    /// Upper bound applied to every computed delay.
    pub max_delay: Duration,
    /// Delay calculation, [`binary_backoff`] unless overridden.
    pub calculation: RetryCalculation,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            time_slot: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            calculation: Arc::new(binary_backoff),
        }
    }
}

impl fmt::Debug for RetryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryConfig")
            .field("max_retries", &self.max_retries)
            .field("time_slot", &self.time_slot)
            .field("max_delay", &self.max_delay)
            .finish_non_exhaustive()
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    pub fn with_time_slot(mut self, time_slot: Duration) -> Self {
        self.time_slot = time_slot;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_calculation(mut self, calculation: RetryCalculation) -> Self {
        self.calculation = calculation;
        self
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        self.max_delay.min((self.calculation)(attempt, self.time_slot))
    }
}

/// Events published by a [`RetryPolicy`].
#[derive(Debug, Clone)]
pub enum RetryEvent {
    /// A failed operation's lineage will be retried after `delay`.
    Scheduled {
        file: SpoolFile,
        attempt: u32,
        delay: Duration,
    },
    /// A lineage used up its retry budget; `error` is the final failure.
    Exhausted {
        file: SpoolFile,
        attempts: u32,
        error: FlushError,
    },
}

/// Watches one loader and schedules retry flushes for failed operations.
///
/// The policy stays decoupled from the loader: it observes outcomes
/// through the subscription any observer could hold and re-triggers
/// flushes through the same public handle any caller would use. Dropping
/// the policy or calling [`RetryPolicy::shutdown`] cancels pending retry
/// timers; in-flight flush operations are never cancelled.
pub struct RetryPolicy {
    loader: LoaderHandle,
    subscriber_id: u64,
    shared: Arc<PolicyShared>,
    task: JoinHandle<()>,
}

struct PolicyShared {
    events: EventRegistry<RetryEvent>,
    metrics: RetryMetrics,
}

impl RetryPolicy {
    /// Subscribes to `loader` and starts the policy task.
    pub fn attach(loader: LoaderHandle, config: RetryConfig) -> Self {
        let (subscriber_id, receiver) = loader.subscribe();
        let shared = Arc::new(PolicyShared {
            events: EventRegistry::new(RETRY_EVENT_QUEUE_SIZE),
            metrics: RetryMetrics::new(),
        });

        let worker = PolicyWorker {
            loader: loader.clone(),
            config,
            shared: Arc::clone(&shared),
            receiver,
            lineage: HashMap::new(),
            pending: Vec::new(),
        };
        let task = tokio::spawn(worker.run());

        Self {
            loader,
            subscriber_id,
            shared,
            task,
        }
    }

    /// Registers an observer for retry events.
    pub fn subscribe(&self) -> (u64, mpsc::Receiver<RetryEvent>) {
        self.shared.events.subscribe()
    }

    /// Removes a subscriber registered with [`RetryPolicy::subscribe`].
    pub fn unsubscribe(&self, id: u64) -> bool {
        self.shared.events.unsubscribe(id)
    }

    pub fn metrics(&self) -> RetryMetricsSnapshot {
        self.shared.metrics.snapshot()
    }

    /// Cancels pending retry timers and detaches from the loader.
    /// In-flight flush operations keep running.
    pub fn shutdown(&self) {
        self.task.abort();
        self.loader.unsubscribe(self.subscriber_id);
        tracing::debug!("retry policy shut down");
    }
}

impl Drop for RetryPolicy {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// =============================================================================
// Policy worker
// =============================================================================

struct PendingRetry {
    deadline: Instant,
    origin: SpoolFile,
    attempt: u32,
}

struct PolicyWorker {
    loader: LoaderHandle,
    config: RetryConfig,
    shared: Arc<PolicyShared>,
    receiver: mpsc::Receiver<FlushEvent>,
    /// Retries already consumed by the in-flight operation this policy
    /// started, keyed by spool file name.
    lineage: HashMap<String, u32>,
    pending: Vec<PendingRetry>,
}

impl PolicyWorker {
    async fn run(mut self) {
        tracing::debug!(max_retries = self.config.max_retries, "retry policy attached");

        loop {
            let next_deadline = self.pending.iter().map(|p| p.deadline).min();

            tokio::select! {
                event = self.receiver.recv() => {
                    match event {
                        Some(FlushEvent::Completed(outcome)) => self.handle_outcome(outcome),
                        Some(FlushEvent::Started(_)) => {}
                        None => break,
                    }
                }
                _ = sleep_until_or_idle(next_deadline), if next_deadline.is_some() => {
                    self.fire_due_retries().await;
                }
            }
        }

        tracing::debug!("retry policy detached");
    }

    fn handle_outcome(&mut self, outcome: FlushOutcome) {
        let attempts = self.lineage.remove(&outcome.file.key).unwrap_or(0);

        let error = match outcome.result {
            Ok(_) => return,
            Err(error) => error,
        };

        if attempts >= self.config.max_retries {
            self.shared.metrics.record_exhausted();
            tracing::warn!(
                file = %outcome.file,
                attempts,
                error = %error,
                "flush retries exhausted"
            );
            self.shared.events.publish(&RetryEvent::Exhausted {
                file: outcome.file,
                attempts,
                error,
            });
            return;
        }

        let attempt = attempts + 1;
        let delay = self.config.delay_for(attempt);
        self.shared.metrics.record_scheduled();
        tracing::info!(
            file = %outcome.file,
            attempt,
            delay_ms = delay.as_millis() as u64,
            "retry scheduled"
        );
        self.shared.events.publish(&RetryEvent::Scheduled {
            file: outcome.file.clone(),
            attempt,
            delay,
        });
        self.pending.push(PendingRetry {
            deadline: Instant::now() + delay,
            origin: outcome.file,
            attempt,
        });
    }

    async fn fire_due_retries(&mut self) {
        let now = Instant::now();
        let mut due = Vec::new();
        let mut index = 0;
        while index < self.pending.len() {
            if self.pending[index].deadline <= now {
                due.push(self.pending.swap_remove(index));
            } else {
                index += 1;
            }
        }

        for retry in due {
            self.fire(retry).await;
        }
    }

    /// Triggers the retry flush. The lineage entry is recorded before the
    /// worker processes any further events, so the completion of the
    /// operation started here always finds its inherited attempt count.
    async fn fire(&mut self, retry: PendingRetry) {
        self.shared.metrics.record_fired();
        match self.loader.flush().await {
            Ok(Some(started)) => {
                tracing::debug!(
                    origin = %retry.origin,
                    file = %started.file,
                    attempt = retry.attempt,
                    "retry flush started"
                );
                self.lineage.insert(started.file.key.clone(), retry.attempt);
            }
            Ok(None) => {
                tracing::debug!(origin = %retry.origin, "retry flush found an empty buffer");
            }
            Err(error) => {
                tracing::warn!(origin = %retry.origin, error = %error, "retry flush failed");
            }
        }
    }
}

fn sleep_until_or_idle(deadline: Option<Instant>) -> tokio::time::Sleep {
    // Evaluated even when the select branch is disabled; the fallback
    // deadline is never polled in that case.
    tokio::time::sleep_until(deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600)))
}

#[cfg(test)]
#[path = "retry_test.rs"]
mod retry_test;
