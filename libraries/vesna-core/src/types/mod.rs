/// Domain types for Vesna
pub mod options;
pub mod track;

pub use options::{MediaSource, SkillOptions, Station, StepSize, VolumeSteps};
pub use track::TrackRef;
