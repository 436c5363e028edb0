/// Configuration loading and assistant wiring tests
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::runtime::Handle;
use vesna_assistant::{build_assistant, check, AssistantConfig, SkillReport};
use vesna_core::testing::{RecordingBackend, RecordingSpeech};
use vesna_core::MemoryOptionsStore;
use vesna_skills::{Dispatch, SkillId, SkillKind};

/// Helper to write a config file into a temp dir
fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("vesna.toml");
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn loads_explicit_config_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
options_dir = "/var/lib/vesna"
wake_words = ["Ирина"]
skills = ["music"]
music_folder = "/srv/music"

[ramp]
step_size = 5
"#,
    );

    let config = AssistantConfig::load(Some(&path)).unwrap();
    assert_eq!(config.options_dir, std::path::PathBuf::from("/var/lib/vesna"));
    assert_eq!(config.wake_words, vec!["Ирина".to_string()]);
    assert_eq!(config.skills, vec![SkillKind::Music]);
    assert_eq!(config.ramp.step_size, 5);
    assert_eq!(config.ramp.step_delay_ms, 100);
    assert!(config.validate().is_ok());
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result = AssistantConfig::load(Some(&dir.path().join("absent.toml")));
    assert!(result.is_err());
}

#[test]
fn unknown_skill_fails_to_load() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, r#"skills = ["podcast"]"#);
    assert!(AssistantConfig::load(Some(&path)).is_err());
}

#[test]
fn check_reports_tracks_per_skill() {
    let dir = TempDir::new().unwrap();
    let music = dir.path().join("music");
    fs::create_dir(&music).unwrap();
    fs::write(music.join("one.mp3"), b"").unwrap();
    fs::write(music.join("two.flac"), b"").unwrap();
    fs::write(music.join("cover.jpg"), b"").unwrap();

    let config = AssistantConfig {
        options_dir: dir.path().join("options"),
        music_folder: Some(music),
        ..AssistantConfig::default()
    };

    let reports = check(&config).unwrap();
    assert_eq!(
        reports,
        vec![
            SkillReport {
                kind: SkillKind::Radio,
                stored: false,
                tracks: 7,
            },
            SkillReport {
                kind: SkillKind::Music,
                stored: false,
                tracks: 2,
            },
        ]
    );
}

#[test]
fn check_rejects_invalid_stored_options() {
    let dir = TempDir::new().unwrap();
    let options = dir.path().join("options");
    fs::create_dir(&options).unwrap();
    fs::write(
        options.join("radio.json"),
        r#"{"source": {"stations": []}, "reduction_factor": 0}"#,
    )
    .unwrap();

    let config = AssistantConfig {
        options_dir: options,
        skills: vec![SkillKind::Radio],
        ..AssistantConfig::default()
    };
    assert!(check(&config).is_err());
}

#[tokio::test(start_paused = true)]
async fn assistant_uses_configured_music_folder_and_wake_word() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("song.mp3"), b"").unwrap();

    let config = AssistantConfig {
        wake_words: vec!["ирина".to_string()],
        skills: vec![SkillKind::Music],
        music_folder: Some(dir.path().to_path_buf()),
        ..AssistantConfig::default()
    };
    let backend = RecordingBackend::new();
    let speech = RecordingSpeech::new();
    let mut assistant = build_assistant(
        &config,
        Arc::new(MemoryOptionsStore::new()),
        backend.factory(),
        Arc::new(speech.clone()),
        Handle::current(),
    );

    assert_eq!(assistant.handle_phrase("включи музыку"), Dispatch::Ignored);
    assert_eq!(
        assistant.handle_phrase("Ирина, включи музыку"),
        Dispatch::Handled(SkillId::new("music"))
    );
    assert_eq!(backend.played().len(), 1);
    assert!(backend.played()[0].ends_with("song.mp3"));
    assert_eq!(speech.last().as_deref(), Some("Включаю song"));
}
