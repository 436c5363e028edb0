//! Player skill
//!
//! One implementation for every playback skill (radio, music). The profile
//! supplies phrases, messages and defaults; this module supplies behavior.
//!
//! The playback engine is created lazily on the first start command and
//! lives as long as the skill. Every error is turned into speech here.

use crate::command::PlayerCommand;
use crate::profile::{render, SkillProfile};
use crate::router::{ContextRouter, SkillId};
use crate::skill::{ContextEffect, Skill};
use crate::sources;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};
use vesna_core::{BackendFactory, OptionsStore, SkillOptions, SpeechOutput};
use vesna_playback::{
    DeferredActionScheduler, PlaybackError, PlaybackSession, PlaybackState, RampConfig,
    Result, SessionHandle, SleepOutcome, SleepRequest, SleepTimer, TrackList, VolumeRamp,
};

/// Collaborators shared by all skills of one assistant
#[derive(Clone)]
pub struct SkillServices {
    pub store: Arc<dyn OptionsStore>,
    pub factory: Arc<dyn BackendFactory>,
    pub speech: Arc<dyn SpeechOutput>,
    pub router: ContextRouter,
    pub runtime: Handle,
    pub ramp: RampConfig,
}

/// Session plus the background machinery bound to it
struct Engine {
    session: SessionHandle,
    ramp: VolumeRamp,
    sleep: SleepTimer,
}

/// Playback skill driven by a [`SkillProfile`]
pub struct PlayerSkill {
    id: SkillId,
    profile: SkillProfile,
    services: SkillServices,
    engine: Option<Engine>,
    unavailable_reported: bool,
    last_delta: Option<i32>,
}

impl PlayerSkill {
    /// Create a skill; nothing is opened until the first start command
    pub fn new(profile: SkillProfile, services: SkillServices) -> Self {
        Self {
            id: SkillId::new(profile.scope.clone()),
            profile,
            services,
            engine: None,
            unavailable_reported: false,
            last_delta: None,
        }
    }

    /// Profile in use
    pub fn profile(&self) -> &SkillProfile {
        &self.profile
    }

    /// Session handle, once the engine exists
    pub fn session(&self) -> Option<&SessionHandle> {
        self.engine.as_ref().map(|e| &e.session)
    }

    /// Whether a sleep timer is armed or expiring
    pub fn sleep_pending(&self) -> bool {
        self.engine.as_ref().is_some_and(|e| e.sleep.is_pending())
    }

    // ===== Options =====

    /// Options in effect: stored ones, or the profile defaults
    fn options(&self) -> SkillOptions {
        self.stored_options()
            .unwrap_or_else(|| self.profile.default_options.clone())
    }

    /// Stored options, seeded from the profile on first use
    ///
    /// `None` if the stored file could not be read or failed validation.
    /// Such a file is left alone so the user can repair it.
    fn stored_options(&self) -> Option<SkillOptions> {
        let scope = self.profile.scope.as_str();
        match self.services.store.load(scope) {
            Ok(Some(options)) => Some(options),
            Ok(None) => {
                let options = self.profile.default_options.clone();
                if let Err(e) = self.services.store.save(scope, &options) {
                    warn!(skill = %self.id, error = %e, "Failed to store default options");
                }
                Some(options)
            }
            Err(e) => {
                warn!(skill = %self.id, error = %e, "Failed to load options, using defaults");
                None
            }
        }
    }

    fn update_options(&self, update: impl FnOnce(&mut SkillOptions)) {
        let Some(mut options) = self.stored_options() else {
            debug!(skill = %self.id, "Stored options unreadable, not saving");
            return;
        };
        update(&mut options);
        if let Err(e) = self.services.store.save(&self.profile.scope, &options) {
            warn!(skill = %self.id, error = %e, "Failed to save options");
        }
    }

    fn remember_position(&self, session: &PlaybackSession) {
        let position = session
            .current_track()
            .and_then(|track| session.original_tracks().position_of(track));
        if position.is_some() {
            self.update_options(|options| options.last_position = position);
        }
    }

    fn remember_volume(&self, level: u8) {
        self.update_options(|options| options.default_volume = level);
    }

    // ===== Engine =====

    fn engine_for(&mut self, command: PlayerCommand) -> Result<&Engine> {
        if self.engine.is_none() {
            if !command.opens_session() && !self.unavailable_reported {
                // Nothing was ever started
                return Err(match command {
                    PlayerCommand::Stop => PlaybackError::AlreadyStopped,
                    _ => PlaybackError::NoActiveTrack,
                });
            }
            self.engine = Some(self.open_engine()?);
            self.unavailable_reported = false;
        }
        self.engine.as_ref().ok_or(PlaybackError::NoActiveTrack)
    }

    fn open_engine(&self) -> Result<Engine> {
        let options = self.options();

        let tracks = sources::load_tracks(&options.source).unwrap_or_else(|e| {
            warn!(skill = %self.id, error = %e, "Failed to load tracks");
            TrackList::new()
        });

        let backend = self
            .services
            .factory
            .create(&self.profile.scope)
            .map_err(|e| PlaybackError::BackendUnavailable(e.to_string()))?;

        let runtime = self.services.runtime.clone();
        let session = SessionHandle::new(PlaybackSession::new(
            backend,
            tracks,
            options.default_volume,
        ));
        session.watch_track_end(runtime.clone());

        let ramp = VolumeRamp::new(session.clone(), self.services.ramp, runtime.clone());
        let sleep = SleepTimer::new(
            session.clone(),
            ramp.clone(),
            DeferredActionScheduler::new(runtime),
        );

        info!(
            skill = %self.id,
            tracks = session.lock().tracks().len(),
            "Playback engine ready"
        );
        Ok(Engine {
            session,
            ramp,
            sleep,
        })
    }

    // ===== Commands =====

    fn execute(&mut self, command: PlayerCommand, remainder: &str) -> ContextEffect {
        debug!(skill = %self.id, ?command, remainder, "Executing command");
        match self.run(command, remainder) {
            Ok(effect) => effect,
            Err(e) => self.report(command, e),
        }
    }

    fn run(&mut self, command: PlayerCommand, remainder: &str) -> Result<ContextEffect> {
        match command {
            PlayerCommand::Start => self.start(remainder),
            PlayerCommand::Stop => self.stop(),
            PlayerCommand::Sleep => self.sleep(),
            PlayerCommand::SwitchStation => {
                let session = self.engine_for(command)?.session.clone();
                let mut session = session.lock();
                if !session.is_loaded() {
                    return Err(PlaybackError::NoActiveTrack);
                }
                let track = session.next()?;
                self.remember_position(&session);
                self.say_track(self.profile.messages.next.as_deref(), track.name(), session.volume());
                Ok(ContextEffect::Arm)
            }
            PlayerCommand::Next | PlayerCommand::Previous => {
                let session = self.engine_for(command)?.session.clone();
                let mut session = session.lock();
                let (track, message) = if command == PlayerCommand::Next {
                    (session.next()?, self.profile.messages.next.as_deref())
                } else {
                    (session.previous()?, self.profile.messages.previous.as_deref())
                };
                self.remember_position(&session);
                self.say_track(message, track.name(), session.volume());
                Ok(ContextEffect::Arm)
            }
            PlayerCommand::Pause => {
                let state = self.engine_for(command)?.session.lock().pause()?;
                let message = match state {
                    PlaybackState::Paused => self.profile.messages.paused.as_deref(),
                    _ => self.profile.messages.resumed.as_deref(),
                };
                self.say(message);
                Ok(ContextEffect::Arm)
            }
            PlayerCommand::Louder(size) => {
                let delta = i32::from(self.options().volume_steps.get(size));
                self.change_volume(command, delta)
            }
            PlayerCommand::Quieter(size) => {
                let delta = -i32::from(self.options().volume_steps.get(size));
                self.change_volume(command, delta)
            }
            PlayerCommand::RepeatVolume => {
                let delta = match self.last_delta {
                    Some(delta) => delta,
                    None => i32::from(self.options().volume_steps.normal),
                };
                self.change_volume(command, delta)
            }
            PlayerCommand::Shuffle | PlayerCommand::Unshuffle => {
                {
                    let mut session = self.engine_for(command)?.session.lock();
                    if command == PlayerCommand::Shuffle {
                        session.shuffle();
                    } else {
                        session.unshuffle();
                    }
                }
                let message = if command == PlayerCommand::Shuffle {
                    self.profile.messages.shuffled.as_deref()
                } else {
                    self.profile.messages.unshuffled.as_deref()
                };
                self.say(message);
                Ok(ContextEffect::Arm)
            }
            PlayerCommand::Status => {
                let session = self.engine_for(command)?.session.clone();
                let status = {
                    let session = session.lock();
                    match (session.state(), session.current_track()) {
                        (PlaybackState::Playing, Some(track)) => {
                            Some(render(&self.profile.messages.status, track.name(), session.volume()))
                        }
                        _ => None,
                    }
                };
                match status {
                    Some(text) => self.services.speech.speak(&text),
                    None => self.services.speech.speak(&self.profile.messages.not_playing),
                }
                Ok(ContextEffect::Arm)
            }
        }
    }

    fn start(&mut self, remainder: &str) -> Result<ContextEffect> {
        let options = self.options();
        let fade_in = self.profile.fade_in_on_start;
        let reopened = self.engine.is_some();
        let (session, ramp) = {
            let engine = self.engine_for(PlayerCommand::Start)?;
            (engine.session.clone(), engine.ramp.clone())
        };

        if reopened && session.lock().state() == PlaybackState::Stopped {
            self.rescan(&session, &options);
        }

        let index = {
            let session = session.lock();
            let requested = if remainder.is_empty() {
                None
            } else {
                session.tracks().find_request(remainder)
            };
            requested.or(session.current_index()).or_else(|| {
                // Stored position refers to the original order
                options
                    .last_position
                    .and_then(|p| session.original_tracks().get(p))
                    .and_then(|track| session.tracks().position_of(track))
            })
        };

        let track = if fade_in {
            let (track, _ramp) = ramp.fade_in(options.default_volume, |session| session.play(index))?;
            track
        } else {
            session.lock().play(index)?
        };

        info!(skill = %self.id, track = %track, "Started");
        self.remember_position(&session.lock());
        self.say_track(
            self.profile.messages.starting.as_deref(),
            track.name(),
            options.default_volume,
        );
        Ok(ContextEffect::Arm)
    }

    /// Reload the track source into a stopped session
    ///
    /// Picks up files added to or removed from the music folder since the
    /// engine was opened. The current track is kept if it is still there.
    fn rescan(&self, session: &SessionHandle, options: &SkillOptions) {
        match sources::load_tracks(&options.source) {
            Ok(tracks) => {
                let mut session = session.lock();
                if session.original_tracks().as_slice() != tracks.as_slice() {
                    let position = session.replace_tracks(tracks);
                    debug!(skill = %self.id, ?position, "Track list rescanned");
                }
            }
            Err(e) => warn!(skill = %self.id, error = %e, "Rescan failed, keeping tracks"),
        }
    }

    fn stop(&mut self) -> Result<ContextEffect> {
        let engine = self.engine_for(PlayerCommand::Stop)?;
        let sleep_pending = engine.sleep.cancel();
        let result = engine.session.lock().stop();

        match result {
            Ok(()) => {
                if !sleep_pending {
                    self.services.speech.clear_cues();
                }
                Ok(ContextEffect::Release)
            }
            Err(PlaybackError::AlreadyStopped) if sleep_pending => {
                debug!(skill = %self.id, "Stop during pending sleep, already off");
                Ok(ContextEffect::Release)
            }
            Err(e) => Err(e),
        }
    }

    fn sleep(&mut self) -> Result<ContextEffect> {
        let options = self.options();
        let request = SleepRequest::new(
            Duration::from_secs(options.sleep_delay_seconds),
            u32::from(options.reduction_factor),
        );

        let router = self.services.router.clone();
        let id = self.id.clone();
        let reduced = self
            .engine_for(PlayerCommand::Sleep)?
            .sleep
            .arm(request, move |outcome| match outcome {
                SleepOutcome::Stopped | SleepOutcome::AlreadyStopped => {
                    router.release(&id);
                }
                SleepOutcome::Interrupted => {
                    debug!(skill = %id, "Sleep abandoned by user command");
                }
                SleepOutcome::Failed(e) => {
                    warn!(skill = %id, error = %e, "Sleep shutdown failed");
                }
            })?;

        debug!(skill = %self.id, volume = reduced, "Sleep armed");
        self.services.speech.speak(&self.profile.messages.sleep_armed);
        Ok(ContextEffect::Keep)
    }

    fn change_volume(&mut self, command: PlayerCommand, delta: i32) -> Result<ContextEffect> {
        let level = self.engine_for(command)?.session.lock().volume_delta(delta)?;
        self.last_delta = Some(delta);
        self.remember_volume(level);

        let message = if delta >= 0 {
            self.profile.messages.louder.as_deref()
        } else {
            self.profile.messages.quieter.as_deref()
        };
        self.say_track(message, "", level);
        Ok(ContextEffect::Arm)
    }

    // ===== Speech =====

    fn say(&self, message: Option<&str>) {
        if let Some(text) = message {
            self.services.speech.speak(text);
        }
    }

    fn say_track(&self, template: Option<&str>, name: &str, volume: u8) {
        if let Some(template) = template {
            self.services.speech.speak(&render(template, name, volume));
        }
    }

    fn report(&mut self, command: PlayerCommand, error: PlaybackError) -> ContextEffect {
        let messages = &self.profile.messages;
        match &error {
            PlaybackError::BackendUnavailable(reason) => {
                if self.unavailable_reported {
                    debug!(skill = %self.id, reason = %reason, "Backend still unavailable");
                } else {
                    warn!(skill = %self.id, reason = %reason, "Backend unavailable");
                    self.services.speech.speak(&messages.unavailable);
                    self.unavailable_reported = true;
                }
                return ContextEffect::Keep;
            }
            PlaybackError::AlreadyStopped => {
                if let Some(text) = &messages.already_off {
                    self.services.speech.speak(text);
                }
                return ContextEffect::Release;
            }
            PlaybackError::EmptyPlaylist | PlaybackError::IndexOutOfRange { .. } => {
                self.services.speech.speak(&messages.start_failed);
            }
            PlaybackError::NoActiveTrack => {
                self.services.speech.speak(&messages.not_playing);
            }
            PlaybackError::Backend(_)
                if matches!(
                    command,
                    PlayerCommand::Next | PlayerCommand::Previous | PlayerCommand::SwitchStation
                ) =>
            {
                self.services.speech.speak(&messages.switch_failed);
            }
            PlaybackError::Cancelled => {}
            PlaybackError::Backend(_)
            | PlaybackError::ScheduleRejected(_)
            | PlaybackError::InvalidVolume(_) => {
                self.services.speech.speak(&messages.failed);
            }
        }

        warn!(skill = %self.id, ?command, error = %error, "Command failed");
        ContextEffect::Keep
    }
}

impl Skill for PlayerSkill {
    fn id(&self) -> &SkillId {
        &self.id
    }

    fn top_level_weight(&self, phrase: &str) -> Option<usize> {
        self.profile.top_level.longest_prefix(phrase).map(|m| m.weight())
    }

    fn handle_top_level(&mut self, phrase: &str) -> ContextEffect {
        let Some((command, remainder)) = self
            .profile
            .top_level
            .longest_prefix(phrase)
            .map(|m| (*m.command, m.remainder.to_string()))
        else {
            return ContextEffect::Keep;
        };
        self.execute(command, &remainder)
    }

    fn handle_in_context(&mut self, phrase: &str) -> Option<ContextEffect> {
        let command = self.profile.in_context.exact(phrase).copied()?;
        Some(self.execute(command, ""))
    }

    fn clarify(&mut self) {
        self.services.speech.speak(&self.profile.messages.clarification);
    }

    fn is_active(&self) -> bool {
        self.engine
            .as_ref()
            .is_some_and(|e| e.session.lock().state() != PlaybackState::Stopped)
    }
}
