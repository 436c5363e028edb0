//! Track sources
//!
//! Turns a skill's [`MediaSource`] into a track list: stations map one to
//! one, a music folder is scanned for audio files.

use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};
use vesna_core::{CoreError, MediaSource, TrackRef};
use vesna_playback::TrackList;
use walkdir::WalkDir;

/// Audio file extensions picked up from a music folder
const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac", "m4a", "wma"];

/// Build the track list for a source
pub fn load_tracks(source: &MediaSource) -> Result<TrackList, CoreError> {
    match source {
        MediaSource::Stations(stations) => Ok(stations.iter().map(TrackRef::from_station).collect()),
        MediaSource::MusicFolder(folder) => scan_music_folder(folder),
    }
}

/// Scan a folder (not its subfolders) for audio files, sorted by path
///
/// The folder is created if missing, so a fresh install ends up with an
/// empty list rather than an error.
pub fn scan_music_folder(folder: &Path) -> Result<TrackList, CoreError> {
    if !folder.exists() {
        info!(folder = %folder.display(), "Creating music folder");
        fs::create_dir_all(folder)?;
    }

    let mut files: Vec<_> = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_audio_file(entry.path()))
        .map(walkdir::DirEntry::into_path)
        .collect();
    files.sort();

    debug!(folder = %folder.display(), tracks = files.len(), "Music folder scanned");
    Ok(files.iter().map(TrackRef::from_path).collect())
}

/// Check if a file has a supported audio extension
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| supported.eq_ignore_ascii_case(ext))
        })
}
