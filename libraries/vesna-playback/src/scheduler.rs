//! One-shot deferred actions
//!
//! At most one action is pending per scheduler. Scheduling a new one cancels
//! the previous one. The action runs on the runtime, off the dispatch path.

use crate::error::{PlaybackError, Result};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Longest accepted delay
pub const MAX_DELAY: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug)]
struct PendingAction {
    id: u64,
    fire_at: Instant,
    token: CancellationToken,
}

type Slot = Arc<Mutex<Option<PendingAction>>>;

fn lock_slot(slot: &Mutex<Option<PendingAction>>) -> MutexGuard<'_, Option<PendingAction>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Single-slot timer for deferred actions
#[derive(Debug, Clone)]
pub struct DeferredActionScheduler {
    runtime: Handle,
    pending: Slot,
    next_id: Arc<AtomicU64>,
}

impl DeferredActionScheduler {
    /// Create a scheduler spawning on `runtime`
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            pending: Arc::new(Mutex::new(None)),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Check a delay without scheduling anything
    pub fn validate(delay: Duration) -> Result<()> {
        if delay.is_zero() {
            return Err(PlaybackError::ScheduleRejected(
                "delay must be positive".to_string(),
            ));
        }
        if delay > MAX_DELAY {
            return Err(PlaybackError::ScheduleRejected(format!(
                "delay of {}s exceeds {}s",
                delay.as_secs(),
                MAX_DELAY.as_secs()
            )));
        }
        Ok(())
    }

    /// Run `action(payload)` once `delay` has elapsed
    ///
    /// Supersedes any pending action. Returns the id of the new action.
    pub fn schedule<P, F, Fut>(&self, delay: Duration, payload: P, action: F) -> Result<u64>
    where
        P: Send + 'static,
        F: FnOnce(P) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::validate(delay)?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        let fire_at = Instant::now() + delay;

        let previous = lock_slot(&self.pending).replace(PendingAction {
            id,
            fire_at,
            token: token.clone(),
        });
        if let Some(previous) = previous {
            previous.token.cancel();
            debug!(superseded = previous.id, id, "Pending action superseded");
        }

        info!(id, delay_secs = delay.as_secs(), "Deferred action scheduled");

        let pending = Arc::clone(&self.pending);
        self.runtime.spawn(async move {
            tokio::select! {
                () = token.cancelled() => {
                    debug!(id, "Deferred action cancelled");
                    return;
                }
                () = tokio::time::sleep_until(fire_at) => {}
            }

            // Claim the slot; a cancel that won the race leaves nothing to run
            {
                let mut slot = lock_slot(&pending);
                if !slot.as_ref().is_some_and(|p| p.id == id) {
                    return;
                }
                *slot = None;
            }

            debug!(id, "Deferred action firing");
            action(payload).await;
        });

        Ok(id)
    }

    /// Cancel the pending action
    ///
    /// Returns `true` if something was pending.
    pub fn cancel(&self) -> bool {
        match lock_slot(&self.pending).take() {
            Some(pending) => {
                pending.token.cancel();
                debug!(id = pending.id, "Pending action cancelled");
                true
            }
            None => false,
        }
    }

    /// Whether an action is waiting to fire
    pub fn is_pending(&self) -> bool {
        lock_slot(&self.pending).is_some()
    }

    /// Time left until the pending action fires
    pub fn remaining(&self) -> Option<Duration> {
        lock_slot(&self.pending)
            .as_ref()
            .map(|p| p.fire_at.saturating_duration_since(Instant::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_bounds() {
        assert!(DeferredActionScheduler::validate(Duration::from_secs(1)).is_ok());
        assert!(DeferredActionScheduler::validate(MAX_DELAY).is_ok());
        assert!(matches!(
            DeferredActionScheduler::validate(Duration::ZERO),
            Err(PlaybackError::ScheduleRejected(_))
        ));
        assert!(matches!(
            DeferredActionScheduler::validate(MAX_DELAY + Duration::from_secs(1)),
            Err(PlaybackError::ScheduleRejected(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_delay_schedules_nothing() {
        let scheduler = DeferredActionScheduler::new(Handle::current());
        let result = scheduler.schedule(Duration::ZERO, (), |()| async {});
        assert!(result.is_err());
        assert!(!scheduler.is_pending());
        assert_eq!(scheduler.remaining(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn remaining_counts_down() {
        let scheduler = DeferredActionScheduler::new(Handle::current());
        scheduler
            .schedule(Duration::from_secs(60), (), |()| async {})
            .unwrap();

        tokio::time::advance(Duration::from_secs(20)).await;
        assert_eq!(scheduler.remaining(), Some(Duration::from_secs(40)));
        assert!(scheduler.cancel());
        assert!(!scheduler.cancel());
    }
}
