/// Assistant configuration
use crate::error::{AssistantError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use vesna_playback::RampConfig;
use vesna_skills::SkillKind;

/// Config file picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "vesna.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssistantConfig {
    /// Directory holding one `<skill>.json` options file per skill
    #[serde(default = "default_options_dir")]
    pub options_dir: PathBuf,

    /// Words that must open a phrase while no conversation is in progress
    #[serde(default)]
    pub wake_words: Vec<String>,

    /// Skills to register, in arbitration order
    #[serde(default = "default_skills")]
    pub skills: Vec<SkillKind>,

    /// Music folder used when the music skill has no stored options yet
    #[serde(default)]
    pub music_folder: Option<PathBuf>,

    #[serde(default)]
    pub ramp: RampSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RampSettings {
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,

    #[serde(default = "default_step_size")]
    pub step_size: u8,
}

impl RampSettings {
    pub fn to_ramp_config(&self) -> RampConfig {
        RampConfig::new(Duration::from_millis(self.step_delay_ms), self.step_size)
    }
}

impl Default for RampSettings {
    fn default() -> Self {
        Self {
            step_delay_ms: default_step_delay_ms(),
            step_size: default_step_size(),
        }
    }
}

impl AssistantConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `vesna.toml` is read if
    /// present. Environment variables prefixed with `VESNA_` override file
    /// values, `__` separating nested keys (`VESNA_RAMP__STEP_SIZE`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(AssistantError::Config(format!(
                        "Config file {} not found",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("VESNA")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("wake_words")
                .with_list_parse_key("skills")
                .try_parsing(true),
        );

        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.skills.is_empty() {
            return Err(AssistantError::Config(
                "At least one skill must be enabled".to_string(),
            ));
        }

        for (i, kind) in self.skills.iter().enumerate() {
            if self.skills[..i].contains(kind) {
                return Err(AssistantError::Config(format!(
                    "Skill {:?} is listed twice",
                    kind
                )));
            }
        }

        if self.ramp.step_size == 0 || self.ramp.step_size > 100 {
            return Err(AssistantError::Config(
                "ramp.step_size must be within 1-100".to_string(),
            ));
        }

        if self.wake_words.iter().any(|w| w.trim().is_empty()) {
            return Err(AssistantError::Config(
                "wake_words must not contain empty entries".to_string(),
            ));
        }

        Ok(())
    }
}

// Default values
fn default_options_dir() -> PathBuf {
    PathBuf::from("./data/options")
}

fn default_skills() -> Vec<SkillKind> {
    vec![SkillKind::Radio, SkillKind::Music]
}

fn default_step_delay_ms() -> u64 {
    100
}

fn default_step_size() -> u8 {
    1
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            options_dir: default_options_dir(),
            wake_words: Vec::new(),
            skills: default_skills(),
            music_folder: None,
            ramp: RampSettings::default(),
        }
    }
}
