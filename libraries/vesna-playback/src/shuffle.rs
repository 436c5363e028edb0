//! Shuffle index mapping
//!
//! The original list is never reordered. Shuffling produces a permutation of
//! original positions (Fisher-Yates over `0..len`) and a view built from it;
//! unshuffling drops back to the identity permutation. Each shuffle starts
//! from the original order, so repeated shuffles do not compound.

use crate::track_list::TrackList;
use rand::seq::SliceRandom;
use rand::Rng;
use vesna_core::TrackRef;

/// Permutation of original positions
///
/// `mapping[view_position] == original_position`. Always a bijection over
/// `0..len`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShuffleMapping {
    order: Vec<usize>,
}

impl ShuffleMapping {
    /// Identity mapping of `len` positions
    pub fn identity(len: usize) -> Self {
        Self {
            order: (0..len).collect(),
        }
    }

    /// Uniformly random mapping of `len` positions
    pub fn random<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Self {
        let mut order: Vec<usize> = (0..len).collect();
        order.shuffle(rng);
        Self { order }
    }

    /// Original position shown at `view_position`
    pub fn original_index(&self, view_position: usize) -> Option<usize> {
        self.order.get(view_position).copied()
    }

    /// Number of positions
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if mapping is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Check if this is the identity mapping
    pub fn is_identity(&self) -> bool {
        self.order.iter().enumerate().all(|(i, &o)| i == o)
    }

    /// Build the view of `original` under this mapping
    fn apply(&self, original: &TrackList) -> TrackList {
        self.order
            .iter()
            .filter_map(|&i| original.get(i).cloned())
            .collect()
    }
}

/// Original list plus its current (possibly shuffled) view
#[derive(Debug, Clone, Default)]
pub struct ShuffleIndexer {
    original: TrackList,
    mapping: ShuffleMapping,
    view: TrackList,
    shuffled: bool,
}

impl Default for ShuffleMapping {
    fn default() -> Self {
        Self::identity(0)
    }
}

impl ShuffleIndexer {
    /// Wrap a list in original order
    pub fn new(original: TrackList) -> Self {
        let mapping = ShuffleMapping::identity(original.len());
        let view = original.clone();
        Self {
            original,
            mapping,
            view,
            shuffled: false,
        }
    }

    /// Active view (what positions refer to)
    pub fn view(&self) -> &TrackList {
        &self.view
    }

    /// Original order
    pub fn original(&self) -> &TrackList {
        &self.original
    }

    /// Current mapping
    pub fn mapping(&self) -> &ShuffleMapping {
        &self.mapping
    }

    /// Whether the view is shuffled
    pub fn is_shuffled(&self) -> bool {
        self.shuffled
    }

    /// Shuffle the original order into a new view
    ///
    /// Returns the new position of `current` in the view, `None` if it was
    /// not found (or no track was given).
    pub fn shuffle_with<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        current: Option<&TrackRef>,
    ) -> Option<usize> {
        self.mapping = ShuffleMapping::random(self.original.len(), rng);
        self.view = self.mapping.apply(&self.original);
        self.shuffled = true;
        current.and_then(|track| self.view.position_of(track))
    }

    /// Shuffle using the thread-local RNG
    pub fn shuffle(&mut self, current: Option<&TrackRef>) -> Option<usize> {
        self.shuffle_with(&mut rand::thread_rng(), current)
    }

    /// Restore the original order
    ///
    /// Returns the new position of `current` in the view.
    pub fn unshuffle(&mut self, current: Option<&TrackRef>) -> Option<usize> {
        self.mapping = ShuffleMapping::identity(self.original.len());
        self.view = self.original.clone();
        self.shuffled = false;
        current.and_then(|track| self.view.position_of(track))
    }

    /// Replace the original list, keeping the shuffle mode
    ///
    /// Returns the new position of `current` in the rebuilt view.
    pub fn replace(&mut self, original: TrackList, current: Option<&TrackRef>) -> Option<usize> {
        let shuffled = self.shuffled;
        self.original = original;
        if shuffled {
            self.shuffle(current)
        } else {
            self.unshuffle(current)
        }
    }
}
