//! Output backend traits and the single playback slot
//!
//! A backend turns a decoded buffer into an opaque playback unit. The
//! engine owns at most one live unit at a time through [`PlaybackSlot`]:
//! starting a unit tears down the previous one first, and every unit is
//! tagged with a generation number so completion callbacks from torn-down
//! units are ignored by construction rather than by flag juggling.

use crate::clock::PositionClock;
use crate::error::Result;
use crate::session::SessionMessage;
use arioso_core::DecodedAudio;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::trace;

/// Creates playback units from decoded audio.
///
/// Implementations are not required to be `Send`; the session that drives
/// them lives on a single thread.
pub trait AudioOutput {
    /// Start playing `audio` from `offset` at the given volume.
    ///
    /// The backend must call [`UnitCompletion::finished`] exactly once if
    /// and when the unit plays to its natural end. Units stopped through
    /// [`OutputUnit::stop`] must not report completion.
    ///
    /// # Errors
    /// Returns [`PlaybackError::Output`](crate::PlaybackError::Output) if
    /// the backend cannot start a unit (device unavailable, stream refused).
    fn begin(
        &mut self,
        audio: DecodedAudio,
        offset: Duration,
        volume: f32,
        completion: UnitCompletion,
    ) -> Result<Box<dyn OutputUnit>>;
}

/// A live playback unit. Dropping or stopping it releases the underlying
/// device resources.
pub trait OutputUnit {
    /// Adjust the unit's volume (0.0-1.0)
    fn set_volume(&mut self, volume: f32);

    /// Stop and release the unit
    fn stop(self: Box<Self>);
}

/// One-shot handle a backend fires when its unit reaches the natural end
/// of the audio. Carries the unit's generation so a stale completion
/// (fired after the unit was superseded) identifies itself.
pub struct UnitCompletion {
    generation: u64,
    tx: UnboundedSender<SessionMessage>,
}

impl UnitCompletion {
    /// Report that the unit played to the end of its buffer
    pub fn finished(self) {
        let _ = self.tx.send(SessionMessage::UnitFinished {
            generation: self.generation,
        });
    }
}

/// The engine's single slot for a live output unit
pub(crate) struct PlaybackSlot {
    active: Option<ActiveUnit>,
    generation: u64,
    tx: UnboundedSender<SessionMessage>,
}

struct ActiveUnit {
    unit: Box<dyn OutputUnit>,
    generation: u64,
    clock: PositionClock,
}

impl PlaybackSlot {
    pub(crate) fn new(tx: UnboundedSender<SessionMessage>) -> Self {
        Self {
            active: None,
            generation: 0,
            tx,
        }
    }

    /// Start a new unit, tearing down any live one first.
    ///
    /// On backend failure the slot is left empty; the generation was already
    /// advanced, so a completion from the torn-down unit stays suppressed.
    pub(crate) fn start(
        &mut self,
        output: &mut dyn AudioOutput,
        audio: &DecodedAudio,
        offset: Duration,
        volume: f32,
    ) -> Result<()> {
        self.teardown();
        self.generation += 1;
        let completion = UnitCompletion {
            generation: self.generation,
            tx: self.tx.clone(),
        };
        let unit = output.begin(audio.clone(), offset, volume, completion)?;
        self.active = Some(ActiveUnit {
            unit,
            generation: self.generation,
            clock: PositionClock::start(offset, audio.duration),
        });
        Ok(())
    }

    /// Stop and release the live unit, returning the position it reached
    pub(crate) fn teardown(&mut self) -> Option<Duration> {
        self.active.take().map(|active| {
            let position = active.clock.position();
            trace!(
                generation = active.generation,
                position_ms = position.as_millis() as u64,
                "tearing down playback unit"
            );
            active.unit.stop();
            position
        })
    }

    /// Handle a natural-end report. Releases the unit and returns `true`
    /// only if `generation` identifies the live unit; reports from
    /// torn-down units are ignored.
    pub(crate) fn finish(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) {
            trace!(generation, "ignoring completion from a superseded unit");
            return false;
        }
        if let Some(active) = self.active.take() {
            active.unit.stop();
        }
        true
    }

    fn is_current(&self, generation: u64) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.generation == generation)
    }

    /// Derived position of the live unit
    pub(crate) fn position(&self) -> Option<Duration> {
        self.active.as_ref().map(|active| active.clock.position())
    }

    pub(crate) fn set_volume(&mut self, volume: f32) {
        if let Some(active) = self.active.as_mut() {
            active.unit.set_volume(volume);
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active.is_some()
    }
}
