//! Two-tier playback queue
//!
//! The queue separates an immutable playing context (album, playlist, search
//! results) from a consumable user queue. The context is index-navigated and
//! survives user-queue playback untouched; the user queue is a strict FIFO
//! whose head is consumed when the engine advances past it. When the user
//! queue empties mid-playback, navigation falls back to the context position
//! that was current before the detour.

use crate::shuffle;
use crate::types::RepeatMode;
use arioso_core::Track;
use std::collections::VecDeque;

/// Queue state machine for a playback session.
///
/// Pure state: no I/O, no timing. All index-taking operations are
/// bounds-checked and degrade to no-ops out of range; navigation methods
/// return whether the position changed.
#[derive(Debug, Clone)]
pub struct QueueManager {
    /// The playing context, replaced wholesale on [`play_track`](Self::play_track)
    context: Vec<Track>,
    /// Current position in the context
    context_index: usize,
    /// Explicit user queue, consumed front-first
    user_queue: VecDeque<Track>,
    /// Whether the current track is the user queue head rather than
    /// `context[context_index]`
    playing_from_user_queue: bool,
    shuffle_enabled: bool,
    repeat: RepeatMode,
}

impl QueueManager {
    /// Create a queue with the given initial shuffle and repeat settings
    #[must_use]
    pub fn new(shuffle_enabled: bool, repeat: RepeatMode) -> Self {
        Self {
            context: Vec::new(),
            context_index: 0,
            user_queue: VecDeque::new(),
            playing_from_user_queue: false,
            shuffle_enabled,
            repeat,
        }
    }

    /// The track the engine should be playing right now
    #[must_use]
    pub fn current(&self) -> Option<&Track> {
        if self.playing_from_user_queue {
            self.user_queue.front()
        } else {
            self.context.get(self.context_index)
        }
    }

    /// Install `context_tracks` as the new context and position on `track`.
    ///
    /// The previous context is replaced wholesale. If shuffle is enabled the
    /// new context is shuffled before the index is located. An empty context
    /// list degrades to a single-track context containing `track`. If the
    /// track is not in the list, playback starts at index 0.
    pub fn play_track(&mut self, track: &Track, mut context_tracks: Vec<Track>) {
        if context_tracks.is_empty() {
            context_tracks.push(track.clone());
        }
        if self.shuffle_enabled {
            shuffle::shuffle_tracks(&mut context_tracks);
        }
        let index = context_tracks
            .iter()
            .position(|t| t.id == track.id)
            .unwrap_or(0);

        self.context = context_tracks;
        self.context_index = index;
        self.playing_from_user_queue = false;
    }

    /// Play a single track as its own context, discarding the user queue.
    ///
    /// A hard reset: afterwards the queue holds exactly `track`.
    pub fn play_now(&mut self, track: Track) {
        self.context = vec![track];
        self.context_index = 0;
        self.user_queue.clear();
        self.playing_from_user_queue = false;
    }

    /// Append tracks to the end of the user queue
    pub fn add_to_queue(&mut self, tracks: impl IntoIterator<Item = Track>) {
        self.user_queue.extend(tracks);
    }

    /// Advance to the next track. Returns `false` if there is nothing to
    /// advance to (context exhausted with repeat off, or everything empty);
    /// a refused advance leaves the queue untouched.
    ///
    /// The user queue always wins over the context. A user-queue head is
    /// consumed when playback moves past it, not when it starts; emptying
    /// the queue this way also advances the context position the detour
    /// departed from.
    pub fn next(&mut self) -> bool {
        if self.playing_from_user_queue {
            if self.user_queue.len() > 1 {
                // Moving past the head consumes it.
                self.user_queue.pop_front();
                return true;
            }
            // Last queued track: consuming it only makes sense if the
            // context has somewhere to fall back to.
            if !self.can_advance_context() {
                return false;
            }
            self.user_queue.pop_front();
            self.playing_from_user_queue = false;
            // The context entry under the detour was already played.
            return self.advance_context();
        }

        if !self.user_queue.is_empty() {
            // Head stays queued until playback moves past it.
            self.playing_from_user_queue = true;
            return true;
        }

        self.advance_context()
    }

    /// Step back to the previous track. Returns `false` at the context start
    /// unless repeat-all wraps to the end.
    ///
    /// From a user-queue detour this returns to the current context position
    /// without decrementing it; the queue head stays queued.
    pub fn prev(&mut self) -> bool {
        if self.playing_from_user_queue {
            if self.context.is_empty() {
                return false;
            }
            self.playing_from_user_queue = false;
            return true;
        }

        if self.context.is_empty() {
            return false;
        }
        if self.context_index > 0 {
            self.context_index -= 1;
            true
        } else if self.repeat == RepeatMode::All {
            self.context_index = self.context.len() - 1;
            true
        } else {
            false
        }
    }

    /// Jump directly to a context index, ending any user-queue detour.
    /// Out-of-range indices are a no-op returning `false`.
    pub fn skip_to_index(&mut self, index: usize) -> bool {
        if index >= self.context.len() {
            return false;
        }
        self.context_index = index;
        self.playing_from_user_queue = false;
        true
    }

    /// Remove the track at `index` from the user queue.
    ///
    /// Removing the currently playing head falls back to the context
    /// position when nothing else is queued.
    pub fn remove_from_user_queue(&mut self, index: usize) -> Option<Track> {
        let removed = self.user_queue.remove(index)?;
        if self.playing_from_user_queue && self.user_queue.is_empty() {
            self.playing_from_user_queue = false;
        }
        Some(removed)
    }

    /// Move the user-queue entry at `from` to position `to`. Out-of-range
    /// indices are a no-op returning `false`.
    pub fn reorder_user_queue(&mut self, from: usize, to: usize) -> bool {
        if from >= self.user_queue.len() || to >= self.user_queue.len() {
            return false;
        }
        if let Some(track) = self.user_queue.remove(from) {
            self.user_queue.insert(to, track);
            return true;
        }
        false
    }

    /// Empty the user queue, returning playback to the context position
    pub fn clear_user_queue(&mut self) {
        self.user_queue.clear();
        self.playing_from_user_queue = false;
    }

    /// Reset everything: context, user queue, and position
    pub fn clear_all(&mut self) {
        self.context.clear();
        self.context_index = 0;
        self.user_queue.clear();
        self.playing_from_user_queue = false;
    }

    /// Toggle shuffle, returning the new state.
    ///
    /// Enabling shuffle permutes only the unplayed suffix of the context;
    /// played tracks and the current track keep their positions. Disabling
    /// leaves the current (shuffled) order in place.
    pub fn toggle_shuffle(&mut self) -> bool {
        self.shuffle_enabled = !self.shuffle_enabled;
        if self.shuffle_enabled && !self.context.is_empty() {
            shuffle::shuffle_unplayed_suffix(&mut self.context, self.context_index);
        }
        self.shuffle_enabled
    }

    /// Cycle repeat Off -> All -> One -> Off, returning the new mode
    pub fn cycle_repeat_mode(&mut self) -> RepeatMode {
        self.repeat = self.repeat.cycled();
        self.repeat
    }

    /// Whether [`next`](Self::next) would change position
    #[must_use]
    pub fn has_next(&self) -> bool {
        if self.playing_from_user_queue {
            return self.user_queue.len() > 1 || self.can_advance_context();
        }
        !self.user_queue.is_empty() || self.can_advance_context()
    }

    /// Whether [`prev`](Self::prev) would change position
    #[must_use]
    pub fn has_prev(&self) -> bool {
        if self.playing_from_user_queue {
            return !self.context.is_empty();
        }
        !self.context.is_empty() && (self.context_index > 0 || self.repeat == RepeatMode::All)
    }

    /// The playing context in its current order
    #[must_use]
    pub fn context(&self) -> &[Track] {
        &self.context
    }

    /// Current position in the context (meaningful only if the context is
    /// non-empty)
    #[must_use]
    pub fn context_index(&self) -> usize {
        self.context_index
    }

    /// The pending user queue, front first
    #[must_use]
    pub fn user_queue(&self) -> &VecDeque<Track> {
        &self.user_queue
    }

    /// Whether the current track came from the user queue
    #[must_use]
    pub fn playing_from_user_queue(&self) -> bool {
        self.playing_from_user_queue
    }

    /// Whether shuffle is enabled
    #[must_use]
    pub fn shuffle_enabled(&self) -> bool {
        self.shuffle_enabled
    }

    /// Current repeat mode
    #[must_use]
    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat
    }

    fn advance_context(&mut self) -> bool {
        if self.context.is_empty() {
            return false;
        }
        if self.context_index + 1 < self.context.len() {
            self.context_index += 1;
            true
        } else if self.repeat == RepeatMode::All {
            self.context_index = 0;
            true
        } else {
            false
        }
    }

    fn can_advance_context(&self) -> bool {
        !self.context.is_empty()
            && (self.context_index + 1 < self.context.len() || self.repeat == RepeatMode::All)
    }
}

impl Default for QueueManager {
    fn default() -> Self {
        Self::new(false, RepeatMode::Off)
    }
}
