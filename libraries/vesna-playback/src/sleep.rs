//! Sleep shutdown
//!
//! Arming a sleep timer lowers the volume right away. When the delay runs out
//! the volume fades to the audible floor and playback stops. An explicit
//! command that cancels the fade abandons the stop.

use crate::{
    error::{PlaybackError, Result},
    ramp::VolumeRamp,
    scheduler::DeferredActionScheduler,
    session::SessionHandle,
    types::MIN_AUDIBLE_VOLUME,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Parameters of one sleep request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepRequest {
    /// Time until shutdown
    pub delay: Duration,

    /// Immediate volume divisor (at least 1)
    pub reduction_factor: u32,
}

impl SleepRequest {
    pub fn new(delay: Duration, reduction_factor: u32) -> Self {
        Self {
            delay,
            reduction_factor,
        }
    }
}

/// How a sleep timer ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SleepOutcome {
    /// Faded out and stopped
    Stopped,

    /// Playback was already stopped when the timer ran out
    AlreadyStopped,

    /// An explicit command cancelled the fade-out
    Interrupted,

    /// The backend refused to stop
    Failed(PlaybackError),
}

/// Sleep timer bound to one session
#[derive(Debug, Clone)]
pub struct SleepTimer {
    session: SessionHandle,
    ramp: VolumeRamp,
    scheduler: DeferredActionScheduler,
    // Id of the armed (or expiring) sleep, 0 when none
    armed: Arc<AtomicU64>,
    next_id: Arc<AtomicU64>,
}

impl SleepTimer {
    pub fn new(session: SessionHandle, ramp: VolumeRamp, scheduler: DeferredActionScheduler) -> Self {
        Self {
            session,
            ramp,
            scheduler,
            armed: Arc::new(AtomicU64::new(0)),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Arm the timer
    ///
    /// Requires a loaded track. Divides the volume by the reduction factor
    /// (floored at 1) and returns the reduced volume. A pending sleep is
    /// superseded. `on_expired` runs once the timer has played out.
    pub fn arm<F>(&self, request: SleepRequest, on_expired: F) -> Result<u8>
    where
        F: FnOnce(SleepOutcome) + Send + 'static,
    {
        if request.reduction_factor == 0 {
            return Err(PlaybackError::ScheduleRejected(
                "reduction factor must be at least 1".to_string(),
            ));
        }
        DeferredActionScheduler::validate(request.delay)?;

        let reduced = {
            let mut session = self.session.lock();
            if !session.is_loaded() {
                return Err(PlaybackError::NoActiveTrack);
            }
            let level = (u32::from(session.volume()) / request.reduction_factor)
                .max(u32::from(MIN_AUDIBLE_VOLUME));
            session.set_volume(i32::try_from(level).unwrap_or(i32::from(MIN_AUDIBLE_VOLUME)))?
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let session = self.session.clone();
        let ramp = self.ramp.clone();
        let armed = Arc::clone(&self.armed);

        self.armed.store(id, Ordering::SeqCst);
        let scheduled = self
            .scheduler
            .schedule(request.delay, on_expired, move |on_expired| async move {
                let outcome = expire(&session, &ramp).await;
                // A newer sleep may have been armed during the fade
                let _ = armed.compare_exchange(id, 0, Ordering::SeqCst, Ordering::SeqCst);
                info!(?outcome, "Sleep timer expired");
                on_expired(outcome);
            });
        if let Err(e) = scheduled {
            let _ = self.armed.compare_exchange(id, 0, Ordering::SeqCst, Ordering::SeqCst);
            return Err(e);
        }

        info!(
            delay_secs = request.delay.as_secs(),
            volume = reduced,
            "Sleep timer armed"
        );
        Ok(reduced)
    }

    /// Disarm the timer
    ///
    /// Returns `true` if a sleep was armed or expiring. A fade-out already in
    /// progress is left to the caller's next explicit command to cancel.
    pub fn cancel(&self) -> bool {
        self.scheduler.cancel();
        self.armed.swap(0, Ordering::SeqCst) != 0
    }

    /// Whether a sleep is armed or expiring
    pub fn is_pending(&self) -> bool {
        self.armed.load(Ordering::SeqCst) != 0
    }

    /// Time until shutdown
    pub fn remaining(&self) -> Option<Duration> {
        self.scheduler.remaining()
    }
}

async fn expire(session: &SessionHandle, ramp: &VolumeRamp) -> SleepOutcome {
    match ramp.ramp_to(MIN_AUDIBLE_VOLUME).wait().await {
        Ok(_) => {}
        Err(PlaybackError::Cancelled) => return SleepOutcome::Interrupted,
        Err(e) => warn!(error = %e, "Sleep fade-out failed, stopping anyway"),
    }

    let result = session.lock().stop();
    match result {
        Ok(()) => SleepOutcome::Stopped,
        Err(PlaybackError::AlreadyStopped) => SleepOutcome::AlreadyStopped,
        Err(e) => {
            warn!(error = %e, "Sleep stop failed");
            SleepOutcome::Failed(e)
        }
    }
}
