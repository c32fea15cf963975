//! Playback session orchestration
//!
//! [`PlaybackSession`] ties the queue, the loader, and the output slot
//! together behind a command/query surface. It is single-threaded and
//! pull-driven: commands mutate state synchronously, background work
//! (loads, unit completions) arrives as messages on an internal channel,
//! and the host drains them with [`poll`](PlaybackSession::poll) or
//! [`drive`](PlaybackSession::drive). UI-facing events accumulate until
//! [`take_events`](PlaybackSession::take_events) collects them.

use crate::error::{PlaybackError, Result};
use crate::events::SessionEvent;
use crate::loader::{LoadToken, Loader};
use crate::output::{AudioOutput, PlaybackSlot};
use crate::queue::QueueManager;
use crate::types::{PlaybackConfig, PlaybackState, RepeatMode};
use arioso_core::{
    resolve_track_path, AudioDecoder, DecodedAudio, LoadError, PlayedObserver, Track,
    TrackByteSource, TrackId,
};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, warn};

/// Pressing previous within this much of a track's start navigates back;
/// beyond it, the current track restarts.
const PREVIOUS_RESTART_THRESHOLD: Duration = Duration::from_secs(3);

/// Messages from background work (loads, output units) to the session
pub(crate) enum SessionMessage {
    /// A load attempt completed
    Loaded {
        token: LoadToken,
        result: std::result::Result<DecodedAudio, LoadError>,
    },
    /// An output unit played to its natural end
    UnitFinished { generation: u64 },
}

struct PendingLoad {
    token: LoadToken,
    track_id: TrackId,
}

/// The playback engine's front door.
///
/// Not `Send`: output backends may hold thread-bound device handles, so the
/// session is pinned to the thread that created it. Spawn it on a dedicated
/// thread (or a `LocalSet`) and feed it commands from there.
pub struct PlaybackSession {
    queue: QueueManager,
    loader: Loader,
    output: Box<dyn AudioOutput>,
    slot: PlaybackSlot,
    state: PlaybackState,
    volume: f32,
    library_base_path: PathBuf,

    /// Decoded buffer of the current track, kept for pause/resume, seek,
    /// and repeat-one restarts
    current_audio: Option<DecodedAudio>,
    /// Resume position captured when the unit was torn down for a pause
    paused_offset: Duration,
    pending_load: Option<PendingLoad>,
    last_error: Option<String>,
    last_started_track: Option<TrackId>,
    /// Identity of the last recents notification: at most one per
    /// (track, load attempt)
    last_notified: Option<(TrackId, LoadToken)>,
    played_observer: Option<Arc<dyn PlayedObserver>>,

    rx: UnboundedReceiver<SessionMessage>,
    events: Vec<SessionEvent>,
    position_tick: Duration,
    last_position_emit: Option<Instant>,
}

impl PlaybackSession {
    /// Create a session from a config and its collaborators
    #[must_use]
    pub fn new(
        config: PlaybackConfig,
        output: Box<dyn AudioOutput>,
        bytes: Arc<dyn TrackByteSource>,
        decoder: Arc<dyn AudioDecoder>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            queue: QueueManager::new(config.shuffle, config.repeat),
            loader: Loader::new(bytes, decoder, tx.clone()),
            output,
            slot: PlaybackSlot::new(tx),
            state: PlaybackState::Idle,
            volume: config.volume.clamp(0.0, 1.0),
            library_base_path: config.library_base_path,
            current_audio: None,
            paused_offset: Duration::ZERO,
            pending_load: None,
            last_error: None,
            last_started_track: None,
            last_notified: None,
            played_observer: None,
            rx,
            events: Vec::new(),
            position_tick: config.position_tick,
            last_position_emit: None,
        }
    }

    /// Attach an observer notified once per started (track, load attempt)
    #[must_use]
    pub fn with_played_observer(mut self, observer: Arc<dyn PlayedObserver>) -> Self {
        self.played_observer = Some(observer);
        self
    }

    // --- commands ---

    /// Install a new playing context and start `track`
    pub fn play_track(&mut self, track: &Track, context: Vec<Track>) {
        debug!(track_id = %track.id, context_len = context.len(), "play track");
        self.queue.play_track(track, context);
        if let Some(current) = self.queue.current().cloned() {
            self.start_load(&current);
        }
    }

    /// Play a single track as its own context, discarding the user queue
    pub fn play_now(&mut self, track: Track) {
        debug!(track_id = %track.id, "play now");
        let had_queued = !self.queue.user_queue().is_empty();
        self.queue.play_now(track.clone());
        if had_queued {
            self.emit_queue_changed();
        }
        self.start_load(&track);
    }

    /// Append tracks to the user queue (does not start playback)
    pub fn add_to_queue(&mut self, tracks: Vec<Track>) {
        if tracks.is_empty() {
            return;
        }
        self.queue.add_to_queue(tracks);
        self.emit_queue_changed();
    }

    /// Skip to the next track. Returns `false` if there is nothing to
    /// advance to.
    pub fn next(&mut self) -> bool {
        let queued_before = self.queue.user_queue().len();
        if !self.queue.next() {
            return false;
        }
        if self.queue.user_queue().len() != queued_before {
            self.emit_queue_changed();
        }
        match self.queue.current().cloned() {
            Some(track) => self.start_load(&track),
            None => self.enter_idle(),
        }
        true
    }

    /// Go back. More than three seconds into a track this restarts it;
    /// otherwise it navigates to the previous track. Returns `false` only
    /// when there is nothing to do.
    pub fn prev(&mut self) -> bool {
        if self.current_audio.is_some() && self.position() > PREVIOUS_RESTART_THRESHOLD {
            return self.restart_current();
        }
        if !self.queue.prev() {
            return false;
        }
        match self.queue.current().cloned() {
            Some(track) => self.start_load(&track),
            None => self.enter_idle(),
        }
        true
    }

    /// Jump to a context index. Out-of-range indices are a no-op.
    pub fn skip_to_index(&mut self, index: usize) -> bool {
        if !self.queue.skip_to_index(index) {
            return false;
        }
        if let Some(track) = self.queue.current().cloned() {
            self.start_load(&track);
        }
        true
    }

    /// Toggle between playing and paused. From idle this starts the
    /// current queue position, if any; during a load it does nothing.
    pub fn toggle_play_pause(&mut self) {
        match self.state {
            PlaybackState::Playing => self.pause(),
            PlaybackState::Paused => self.resume(),
            PlaybackState::Idle | PlaybackState::Error => {
                if let Some(track) = self.queue.current().cloned() {
                    self.start_load(&track);
                }
            }
            PlaybackState::Loading => {}
        }
    }

    /// Pause playback, retaining the position for resume. Idempotent.
    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        if let Some(position) = self.slot.teardown() {
            self.paused_offset = position;
        }
        self.set_state(PlaybackState::Paused);
    }

    /// Resume from the paused position with a fresh output unit
    pub fn resume(&mut self) {
        if self.state != PlaybackState::Paused {
            return;
        }
        let Some(audio) = self.current_audio.clone() else {
            self.enter_idle();
            return;
        };
        let offset = self.paused_offset;
        self.begin_unit(&audio, offset);
    }

    /// Stop playback and unload the current track. Queue state survives.
    pub fn stop(&mut self) {
        self.loader.cancel();
        self.pending_load = None;
        self.enter_idle();
    }

    /// Seek to an absolute position in seconds, clamped to the track
    /// bounds.
    ///
    /// # Errors
    /// Returns [`PlaybackError::NoTrackLoaded`] if nothing is loaded, or
    /// [`PlaybackError::InvalidSeekPosition`] for non-finite input.
    pub fn seek(&mut self, seconds: f64) -> Result<()> {
        if !seconds.is_finite() {
            return Err(PlaybackError::InvalidSeekPosition(seconds));
        }
        let Some(audio) = self.current_audio.clone() else {
            return Err(PlaybackError::NoTrackLoaded);
        };
        let position = Duration::from_secs_f64(seconds.max(0.0)).min(audio.duration);
        match self.state {
            PlaybackState::Playing => {
                self.begin_unit(&audio, position);
                Ok(())
            }
            PlaybackState::Paused => {
                self.paused_offset = position;
                Ok(())
            }
            _ => Err(PlaybackError::NoTrackLoaded),
        }
    }

    /// Set the volume for the current and all future units.
    ///
    /// # Errors
    /// Returns [`PlaybackError::InvalidVolume`] outside `[0.0, 1.0]`.
    pub fn set_volume(&mut self, volume: f32) -> Result<()> {
        if !volume.is_finite() || !(0.0..=1.0).contains(&volume) {
            return Err(PlaybackError::InvalidVolume(volume));
        }
        self.volume = volume;
        self.slot.set_volume(volume);
        self.events.push(SessionEvent::VolumeChanged { volume });
        Ok(())
    }

    /// Toggle shuffle, returning the new state
    pub fn toggle_shuffle(&mut self) -> bool {
        let enabled = self.queue.toggle_shuffle();
        self.events.push(SessionEvent::ShuffleChanged { enabled });
        enabled
    }

    /// Cycle repeat Off -> All -> One, returning the new mode
    pub fn cycle_repeat_mode(&mut self) -> RepeatMode {
        let mode = self.queue.cycle_repeat_mode();
        self.events.push(SessionEvent::RepeatChanged { mode });
        mode
    }

    /// Remove a user-queue entry by index
    pub fn remove_from_user_queue(&mut self, index: usize) -> Option<Track> {
        let was_playing_head = self.queue.playing_from_user_queue() && index == 0;
        let removed = self.queue.remove_from_user_queue(index)?;
        self.emit_queue_changed();
        if was_playing_head {
            // The playing track was pulled out from under us.
            match self.queue.current().cloned() {
                Some(track) => self.start_load(&track),
                None => self.enter_idle(),
            }
        }
        Some(removed)
    }

    /// Move a user-queue entry from one position to another
    pub fn reorder_user_queue(&mut self, from: usize, to: usize) -> bool {
        if !self.queue.reorder_user_queue(from, to) {
            return false;
        }
        self.emit_queue_changed();
        true
    }

    /// Empty the user queue
    pub fn clear_user_queue(&mut self) {
        let was_playing_queue = self.queue.playing_from_user_queue();
        self.queue.clear_user_queue();
        self.emit_queue_changed();
        if was_playing_queue {
            match self.queue.current().cloned() {
                Some(track) => self.start_load(&track),
                None => self.enter_idle(),
            }
        }
    }

    /// Clear the context and user queue and stop playback
    pub fn clear_all(&mut self) {
        self.queue.clear_all();
        self.emit_queue_changed();
        self.stop();
    }

    /// Point the session at a different library base path. Affects future
    /// loads only.
    pub fn set_library_base_path(&mut self, path: PathBuf) {
        self.library_base_path = path;
    }

    // --- queries ---

    /// Current playback state
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Whether audio is actively playing
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Whether a load is in flight
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state == PlaybackState::Loading
    }

    /// The track the session is positioned on
    #[must_use]
    pub fn current_track(&self) -> Option<&Track> {
        self.queue.current()
    }

    /// Current playback position, derived from wall-clock time
    #[must_use]
    pub fn position(&self) -> Duration {
        match self.state {
            PlaybackState::Playing => self.slot.position().unwrap_or(Duration::ZERO),
            PlaybackState::Paused => self.paused_offset,
            _ => Duration::ZERO,
        }
    }

    /// Duration of the current track: decoded length once loaded, library
    /// metadata before that
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.current_audio
            .as_ref()
            .map(|audio| audio.duration)
            .or_else(|| self.queue.current().map(|track| track.duration))
            .unwrap_or(Duration::ZERO)
    }

    /// Whether a next track exists
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.queue.has_next()
    }

    /// Whether a previous track (or restart) is available
    #[must_use]
    pub fn has_prev(&self) -> bool {
        self.queue.has_prev()
            || (self.current_audio.is_some() && self.position() > PREVIOUS_RESTART_THRESHOLD)
    }

    /// The playing context in its current order
    #[must_use]
    pub fn context(&self) -> &[Track] {
        self.queue.context()
    }

    /// Current index in the context
    #[must_use]
    pub fn context_index(&self) -> usize {
        self.queue.context_index()
    }

    /// The pending user queue, front first
    #[must_use]
    pub fn user_queue(&self) -> &VecDeque<Track> {
        self.queue.user_queue()
    }

    /// Whether the current track is a user-queue detour
    #[must_use]
    pub fn playing_from_user_queue(&self) -> bool {
        self.queue.playing_from_user_queue()
    }

    /// Whether shuffle is enabled
    #[must_use]
    pub fn shuffle_enabled(&self) -> bool {
        self.queue.shuffle_enabled()
    }

    /// Current repeat mode
    #[must_use]
    pub fn repeat_mode(&self) -> RepeatMode {
        self.queue.repeat_mode()
    }

    /// Current volume
    #[must_use]
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Message from the most recent load or output failure, if any
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // --- driving ---

    /// Process all pending background messages without blocking, then emit
    /// a position tick if one is due
    pub fn poll(&mut self) {
        while let Ok(message) = self.rx.try_recv() {
            self.handle_message(message);
        }
        self.emit_position_tick();
    }

    /// Await and process the next background message.
    ///
    /// Cancel-safe; intended for a host `select!` loop alongside command
    /// input.
    pub async fn drive(&mut self) {
        if let Some(message) = self.rx.recv().await {
            self.handle_message(message);
        }
        self.emit_position_tick();
    }

    /// Drain accumulated UI events
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    // --- internals ---

    fn handle_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::Loaded { token, result } => self.handle_loaded(token, result),
            SessionMessage::UnitFinished { generation } => self.handle_unit_finished(generation),
        }
    }

    fn handle_loaded(
        &mut self,
        token: LoadToken,
        result: std::result::Result<DecodedAudio, LoadError>,
    ) {
        if !self.loader.is_current(token) {
            debug!("discarding result of a superseded load");
            return;
        }
        let Some(pending) = self.pending_load.take() else {
            return;
        };
        debug_assert_eq!(pending.token, token);

        match result {
            Ok(audio) => {
                self.current_audio = Some(audio.clone());
                if self.begin_unit(&audio, Duration::ZERO) {
                    let previous = self.last_started_track.replace(pending.track_id.clone());
                    self.events.push(SessionEvent::TrackStarted {
                        track_id: pending.track_id.clone(),
                        previous_track_id: previous,
                    });
                    self.notify_played(&pending.track_id, token);
                }
            }
            Err(err) => {
                warn!(track_id = %pending.track_id, error = %err, "track load failed");
                let message = err.to_string();
                self.last_error = Some(message.clone());
                self.current_audio = None;
                self.set_state(PlaybackState::Idle);
                self.events.push(SessionEvent::Error { message });
            }
        }
    }

    fn handle_unit_finished(&mut self, generation: u64) {
        if !self.slot.finish(generation) {
            return;
        }
        if let Some(track) = self.queue.current() {
            self.events.push(SessionEvent::TrackFinished {
                track_id: track.id.clone(),
            });
        }

        // Repeat-one restarts the decoded buffer without consulting the
        // queue and without a fresh recents notification.
        if self.queue.repeat_mode() == RepeatMode::One {
            if let Some(audio) = self.current_audio.clone() {
                self.begin_unit(&audio, Duration::ZERO);
                return;
            }
        }

        let queued_before = self.queue.user_queue().len();
        if self.queue.next() {
            if self.queue.user_queue().len() != queued_before {
                self.emit_queue_changed();
            }
            match self.queue.current().cloned() {
                Some(track) => self.start_load(&track),
                None => self.enter_idle(),
            }
        } else {
            // A refused advance leaves the queue untouched.
            self.enter_idle();
        }
    }

    /// Tear down the active unit and kick off a load for `track`
    fn start_load(&mut self, track: &Track) {
        self.slot.teardown();
        self.current_audio = None;
        self.paused_offset = Duration::ZERO;

        let resolved = resolve_track_path(&self.library_base_path, &track.relative_path);
        let token = self.loader.begin(resolved);
        self.pending_load = Some(PendingLoad {
            token,
            track_id: track.id.clone(),
        });
        self.set_state(PlaybackState::Loading);
    }

    /// Start a fresh output unit for `audio` at `offset`. On backend
    /// refusal, records the error and enters the error state.
    fn begin_unit(&mut self, audio: &DecodedAudio, offset: Duration) -> bool {
        match self.slot.start(self.output.as_mut(), audio, offset, self.volume) {
            Ok(()) => {
                self.set_state(PlaybackState::Playing);
                true
            }
            Err(err) => {
                warn!(error = %err, "output backend refused to start a unit");
                let message = err.to_string();
                self.last_error = Some(message.clone());
                self.set_state(PlaybackState::Error);
                self.events.push(SessionEvent::Error { message });
                false
            }
        }
    }

    /// Restart the current track from the beginning without a reload
    fn restart_current(&mut self) -> bool {
        match self.state {
            PlaybackState::Playing => {
                if let Some(audio) = self.current_audio.clone() {
                    self.begin_unit(&audio, Duration::ZERO);
                    return true;
                }
                false
            }
            PlaybackState::Paused => {
                self.paused_offset = Duration::ZERO;
                true
            }
            _ => false,
        }
    }

    fn enter_idle(&mut self) {
        self.slot.teardown();
        self.current_audio = None;
        self.paused_offset = Duration::ZERO;
        self.set_state(PlaybackState::Idle);
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state != state {
            self.state = state;
            self.events.push(SessionEvent::StateChanged { state });
        }
    }

    fn emit_queue_changed(&mut self) {
        self.events.push(SessionEvent::QueueChanged {
            user_queue_length: self.queue.user_queue().len(),
        });
    }

    fn notify_played(&mut self, track_id: &TrackId, token: LoadToken) {
        let identity = (track_id.clone(), token);
        if self.last_notified.as_ref() == Some(&identity) {
            return;
        }
        if let Some(observer) = &self.played_observer {
            observer.track_played(track_id);
        }
        self.last_notified = Some(identity);
    }

    fn emit_position_tick(&mut self) {
        if self.state != PlaybackState::Playing || !self.slot.is_active() {
            return;
        }
        let now = Instant::now();
        let due = self
            .last_position_emit
            .map_or(true, |last| now.duration_since(last) >= self.position_tick);
        if !due {
            return;
        }
        self.last_position_emit = Some(now);
        self.events.push(SessionEvent::PositionUpdate {
            position_ms: self.position().as_millis() as u64,
            duration_ms: self.duration().as_millis() as u64,
        });
    }
}
