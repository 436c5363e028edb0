/// Persisted skill options
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where a skill gets its tracks from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaSource {
    /// Fixed list of internet radio stations
    Stations(Vec<Station>),

    /// Local folder scanned for audio files
    MusicFolder(PathBuf),
}

/// Internet radio station
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    /// Stream URL
    pub url: String,

    /// Spoken name
    #[serde(default)]
    pub name: String,

    /// Words that select this station ("наш", "европ")
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Station {
    /// Create a station
    pub fn new<I, S>(url: impl Into<String>, name: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            url: url.into(),
            name: name.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }
}

/// Relative volume step magnitude ("чуть", normal, "сильно")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepSize {
    Small,
    Normal,
    Large,
}

/// Volume step sizes for relative volume commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeSteps {
    pub small: u8,
    pub normal: u8,
    pub large: u8,
}

impl VolumeSteps {
    /// Step magnitude for a size
    pub fn get(&self, size: StepSize) -> u8 {
        match size {
            StepSize::Small => self.small,
            StepSize::Normal => self.normal,
            StepSize::Large => self.large,
        }
    }
}

impl Default for VolumeSteps {
    fn default() -> Self {
        Self {
            small: 5,
            normal: 15,
            large: 35,
        }
    }
}

/// Options for one playback skill
///
/// Stored per skill scope. Missing fields fall back to defaults so that
/// hand-edited files only need the `source`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillOptions {
    /// Stations or music folder
    pub source: MediaSource,

    /// Volume to fade in to on start, updated by relative volume commands
    #[serde(default = "default_volume")]
    pub default_volume: u8,

    /// Delay before a "sleep" request stops playback
    #[serde(default = "default_sleep_delay_seconds")]
    pub sleep_delay_seconds: u64,

    /// Volume divisor applied when a sleep request is made (1 = unchanged)
    #[serde(default = "default_reduction_factor")]
    pub reduction_factor: u8,

    /// Relative volume step sizes
    #[serde(default)]
    pub volume_steps: VolumeSteps,

    /// Last selected position, restored on the next start
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_position: Option<usize>,
}

impl SkillOptions {
    /// Options with default settings for a source
    pub fn new(source: MediaSource) -> Self {
        Self {
            source,
            default_volume: default_volume(),
            sleep_delay_seconds: default_sleep_delay_seconds(),
            reduction_factor: default_reduction_factor(),
            volume_steps: VolumeSteps::default(),
            last_position: None,
        }
    }

    /// Validate options loaded for `scope`
    pub fn validate(&self, scope: &str) -> Result<()> {
        if self.default_volume > 100 {
            return Err(CoreError::invalid_options(
                scope,
                format!("default_volume {} is above 100", self.default_volume),
            ));
        }

        if self.reduction_factor == 0 {
            return Err(CoreError::invalid_options(
                scope,
                "reduction_factor must be at least 1",
            ));
        }

        if self.sleep_delay_seconds == 0 {
            return Err(CoreError::invalid_options(
                scope,
                "sleep_delay_seconds must be positive",
            ));
        }

        let steps = self.volume_steps;
        if [steps.small, steps.normal, steps.large]
            .iter()
            .any(|step| *step == 0 || *step > 100)
        {
            return Err(CoreError::invalid_options(
                scope,
                "volume steps must be within 1-100",
            ));
        }

        if let MediaSource::Stations(stations) = &self.source {
            if let Some(station) = stations.iter().find(|s| s.url.trim().is_empty()) {
                return Err(CoreError::invalid_options(
                    scope,
                    format!("station '{}' has no url", station.name),
                ));
            }
        }

        Ok(())
    }
}

// Default values
fn default_volume() -> u8 {
    50
}

fn default_sleep_delay_seconds() -> u64 {
    1800
}

fn default_reduction_factor() -> u8 {
    2
}
