/// Assistant wiring
use crate::config::AssistantConfig;
use crate::error::Result;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::info;
use vesna_core::{
    BackendFactory, JsonOptionsStore, MediaSource, OptionsStore, SpeechOutput,
};
use vesna_skills::{
    sources, Assistant, ContextRouter, PlayerSkill, SkillKind, SkillProfile, SkillServices,
};

/// Profile for `kind` with configuration overrides applied
pub fn profile_for(config: &AssistantConfig, kind: SkillKind) -> SkillProfile {
    let mut profile = kind.profile();
    if let (SkillKind::Music, Some(folder)) = (kind, &config.music_folder) {
        profile.default_options.source = MediaSource::MusicFolder(folder.clone());
    }
    profile
}

/// Build the dispatcher with every enabled skill registered
pub fn build_assistant(
    config: &AssistantConfig,
    store: Arc<dyn OptionsStore>,
    factory: Arc<dyn BackendFactory>,
    speech: Arc<dyn SpeechOutput>,
    runtime: Handle,
) -> Assistant {
    let router = ContextRouter::new();
    let services = SkillServices {
        store,
        factory,
        speech,
        router: router.clone(),
        runtime,
        ramp: config.ramp.to_ramp_config(),
    };

    let mut assistant = Assistant::new(router).with_wake_words(&config.wake_words);
    for kind in &config.skills {
        let profile = profile_for(config, *kind);
        assistant.register(Box::new(PlayerSkill::new(profile, services.clone())));
    }
    assistant
}

/// Result of checking one skill's setup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillReport {
    pub kind: SkillKind,
    /// Whether options were found on disk (defaults are used otherwise)
    pub stored: bool,
    pub tracks: usize,
}

/// Load and validate every enabled skill's options and count its tracks
pub fn check(config: &AssistantConfig) -> Result<Vec<SkillReport>> {
    let store = JsonOptionsStore::new(config.options_dir.clone());
    let mut reports = Vec::with_capacity(config.skills.len());

    for kind in &config.skills {
        let profile = profile_for(config, *kind);
        let stored = store.load(&profile.scope)?;
        let options = match &stored {
            Some(options) => options.clone(),
            None => profile.default_options.clone(),
        };
        options.validate(&profile.scope)?;
        let tracks = sources::load_tracks(&options.source)?.len();

        info!(skill = %profile.scope, stored = stored.is_some(), tracks, "Skill checked");
        reports.push(SkillReport {
            kind: *kind,
            stored: stored.is_some(),
            tracks,
        });
    }

    Ok(reports)
}
