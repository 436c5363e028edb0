/// Track reference with stable identity
use crate::text::normalize;
use crate::types::options::Station;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// A playable item: a local file or a stream URL
///
/// Identity is the `uri` alone. Display name and keywords are presentation
/// data and never take part in equality, so a track stays "the same track"
/// however a list is reordered or renamed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackRef {
    uri: String,
    name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    keywords: Vec<String>,
}

impl TrackRef {
    /// Create a track reference, deriving the display name from the URI
    pub fn new(uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let name = derive_name(&uri);
        Self {
            uri,
            name,
            keywords: Vec::new(),
        }
    }

    /// Create a reference to a local file
    ///
    /// Relative paths are made absolute against the current directory so the
    /// identity survives working-directory changes.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|dir| dir.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        };
        Self::new(absolute.to_string_lossy().into_owned())
    }

    /// Create a reference to a radio station
    pub fn from_station(station: &Station) -> Self {
        let mut track = Self::new(station.url.clone());
        if !station.name.trim().is_empty() {
            track.name = station.name.clone();
        }
        track.keywords = station.keywords.iter().map(|k| normalize(k)).collect();
        track
    }

    /// Override the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Attach spoken keywords
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.keywords = keywords.into_iter().map(|k| normalize(k.as_ref())).collect();
        self
    }

    /// Stable identifier (absolute path or URL)
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Human-readable name used in spoken replies
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Spoken keywords (normalized)
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Check whether a normalized spoken request refers to this track
    ///
    /// A request matches when it contains one of the keywords ("радио наше"
    /// contains "наш"), or when the display name contains the request.
    pub fn matches_request(&self, request: &str) -> bool {
        if request.is_empty() {
            return false;
        }
        if self
            .keywords
            .iter()
            .any(|k| !k.is_empty() && request.contains(k.as_str()))
        {
            return true;
        }
        normalize(&self.name).contains(request)
    }
}

impl PartialEq for TrackRef {
    fn eq(&self, other: &Self) -> bool {
        self.uri == other.uri
    }
}

impl Eq for TrackRef {}

impl Hash for TrackRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uri.hash(state);
    }
}

impl fmt::Display for TrackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// File stem for paths, host for URLs
fn derive_name(uri: &str) -> String {
    if let Some((_, rest)) = uri.split_once("://") {
        let host = rest.split(['/', ':', '?']).next().unwrap_or(rest);
        return host.to_string();
    }

    Path::new(uri)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| uri.to_string())
}
