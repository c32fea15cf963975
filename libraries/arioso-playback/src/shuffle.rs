//! Shuffle helpers for the playback queue
//!
//! Shuffling never rewrites history: only the unplayed suffix of the
//! context (everything after the current index) is permuted, so the
//! already-played prefix keeps its order.

use arioso_core::Track;
use rand::seq::SliceRandom;
use rand::thread_rng;

/// Shuffle an entire context, used when a new context is installed with
/// shuffle already enabled.
pub(crate) fn shuffle_tracks(tracks: &mut [Track]) {
    tracks.shuffle(&mut thread_rng());
}

/// Shuffle only the tracks after `current_index`, leaving the played prefix
/// and the current track in place.
pub(crate) fn shuffle_unplayed_suffix(tracks: &mut [Track], current_index: usize) {
    if let Some(suffix) = tracks.get_mut(current_index + 1..) {
        suffix.shuffle(&mut thread_rng());
    }
}
