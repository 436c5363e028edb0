//! Ordered track list
//!
//! Insertion order is the discovery/sort order of the source (station list
//! order, or path order for a scanned folder). Positions are plain indices;
//! identity lookups go through [`TrackRef`] equality.

use vesna_core::TrackRef;

/// Ordered collection of track references
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackList {
    tracks: Vec<TrackRef>,
}

impl TrackList {
    /// Create empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Track at position
    pub fn get(&self, index: usize) -> Option<&TrackRef> {
        self.tracks.get(index)
    }

    /// Position of a track by identity
    ///
    /// Linear scan; lists are user-scale.
    pub fn position_of(&self, track: &TrackRef) -> Option<usize> {
        self.tracks.iter().position(|t| t == track)
    }

    /// First track matching a normalized spoken request
    pub fn find_request(&self, request: &str) -> Option<usize> {
        self.tracks.iter().position(|t| t.matches_request(request))
    }

    /// Append a track
    pub fn push(&mut self, track: TrackRef) {
        self.tracks.push(track);
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if list is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Iterate in order
    pub fn iter(&self) -> std::slice::Iter<'_, TrackRef> {
        self.tracks.iter()
    }

    /// Borrow as a slice
    pub fn as_slice(&self) -> &[TrackRef] {
        &self.tracks
    }
}

impl From<Vec<TrackRef>> for TrackList {
    fn from(tracks: Vec<TrackRef>) -> Self {
        Self { tracks }
    }
}

impl FromIterator<TrackRef> for TrackList {
    fn from_iter<I: IntoIterator<Item = TrackRef>>(iter: I) -> Self {
        Self {
            tracks: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TrackList {
    type Item = &'a TrackRef;
    type IntoIter = std::slice::Iter<'a, TrackRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(ids: &[&str]) -> TrackList {
        ids.iter()
            .map(|id| TrackRef::new(format!("/music/{}.mp3", id)))
            .collect()
    }

    #[test]
    fn create_empty_list() {
        let tracks = TrackList::new();
        assert_eq!(tracks.len(), 0);
        assert!(tracks.is_empty());
        assert!(tracks.get(0).is_none());
    }

    #[test]
    fn keeps_insertion_order() {
        let mut tracks = list(&["b", "a"]);
        tracks.push(TrackRef::new("/music/c.mp3"));

        let names: Vec<&str> = tracks.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn position_by_identity() {
        let tracks = list(&["1", "2", "3"]);
        let renamed = TrackRef::new("/music/2.mp3").with_name("Second");

        assert_eq!(tracks.position_of(&renamed), Some(1));
        assert_eq!(tracks.position_of(&TrackRef::new("/music/4.mp3")), None);
    }

    #[test]
    fn find_by_request() {
        let tracks: TrackList = vec![
            TrackRef::new("https://a/kommersant64.mp3")
                .with_name("Коммерсант FM")
                .with_keywords(["коммерсант"]),
            TrackRef::new("http://b/nashesongs.mp3")
                .with_name("Наше радио")
                .with_keywords(["наш"]),
        ]
        .into();

        assert_eq!(tracks.find_request("наше"), Some(1));
        assert_eq!(tracks.find_request("коммерсант"), Some(0));
        assert_eq!(tracks.find_request("джаз"), None);
    }
}
