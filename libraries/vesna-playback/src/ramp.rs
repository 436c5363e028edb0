//! Stepped volume transitions
//!
//! A ramp is a tokio task that moves the session volume one step per tick
//! until it reaches the target. The session owns the ramp's cancellation
//! token: explicit playback and volume commands cancel it, and the task
//! notices at its next step.

use crate::{
    error::{PlaybackError, Result},
    session::{PlaybackSession, RampStep, SessionHandle},
    types::{RampConfig, MAX_VOLUME},
};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// Spawns volume ramps against one session
#[derive(Debug, Clone)]
pub struct VolumeRamp {
    session: SessionHandle,
    config: RampConfig,
    runtime: Handle,
}

impl VolumeRamp {
    /// Create a ramp driver
    pub fn new(session: SessionHandle, config: RampConfig, runtime: Handle) -> Self {
        Self {
            session,
            config,
            runtime,
        }
    }

    /// Step configuration
    pub fn config(&self) -> RampConfig {
        self.config
    }

    /// Start something at silence, then ramp up to `target`
    ///
    /// The session is muted before `start` runs, so a `play` inside it
    /// sends volume 0 to the backend ahead of the new track. Typically
    /// `start` calls `play`. If `start` fails the previous volume is
    /// restored.
    pub fn fade_in<T, F>(&self, target: u8, start: F) -> Result<(T, RampHandle)>
    where
        F: FnOnce(&mut PlaybackSession) -> Result<T>,
    {
        let (value, token) = {
            let mut session = self.session.lock();
            let saved = session.mute_for_fade_in();
            let value = match start(&mut *session) {
                Ok(value) => value,
                Err(e) => {
                    session.restore_volume(saved);
                    return Err(e);
                }
            };
            (value, session.prime_fade_in()?)
        };
        Ok((value, self.spawn(token, target)))
    }

    /// Ramp from the current volume to `target`
    pub fn ramp_to(&self, target: u8) -> RampHandle {
        let token = self.session.lock().begin_ramp();
        self.spawn(token, target)
    }

    fn spawn(&self, token: CancellationToken, target: u8) -> RampHandle {
        let target = target.min(MAX_VOLUME);
        debug!(target, step_delay = ?self.config.step_delay, "Starting volume ramp");

        let join = self.runtime.spawn(run_ramp(
            self.session.clone(),
            self.config,
            token.clone(),
            target,
        ));
        RampHandle { token, join }
    }
}

async fn run_ramp(
    session: SessionHandle,
    config: RampConfig,
    token: CancellationToken,
    target: u8,
) -> Result<u8> {
    loop {
        let step = session.lock().ramp_step(&token, target, config.step_size)?;
        if let RampStep::Done(level) = step {
            debug!(level, "Volume ramp finished");
            return Ok(level);
        }

        tokio::select! {
            () = token.cancelled() => return Err(PlaybackError::Cancelled),
            () = tokio::time::sleep(config.step_delay) => {}
        }
    }
}

/// Handle to a running ramp
#[derive(Debug)]
pub struct RampHandle {
    token: CancellationToken,
    join: JoinHandle<Result<u8>>,
}

impl RampHandle {
    /// Cancel the ramp; the volume stays where the last step left it
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the ramp was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Whether the task has ended
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the ramp to end
    ///
    /// Returns the final volume, or [`PlaybackError::Cancelled`] if the ramp
    /// was interrupted.
    pub async fn wait(self) -> Result<u8> {
        match self.join.await {
            Ok(result) => result,
            Err(e) => {
                if !e.is_cancelled() {
                    error!(error = %e, "Volume ramp task failed");
                }
                Err(PlaybackError::Cancelled)
            }
        }
    }
}
