//! Derived playback position
//!
//! Position is never accumulated by callbacks or timers. A clock records the
//! wall-clock instant a unit started and the offset it started at; the
//! current position is derived on demand and clamped to the track duration.

use std::time::{Duration, Instant};

/// Position clock for a single playback unit
#[derive(Debug, Clone, Copy)]
pub(crate) struct PositionClock {
    origin: Instant,
    offset: Duration,
    duration: Duration,
}

impl PositionClock {
    /// Start a clock for a unit that begins at `offset` into a track of
    /// `duration` total length.
    pub(crate) fn start(offset: Duration, duration: Duration) -> Self {
        Self {
            origin: Instant::now(),
            offset,
            duration,
        }
    }

    /// Current derived position, clamped to `[0, duration]`.
    pub(crate) fn position(&self) -> Duration {
        self.position_at(Instant::now())
    }

    /// Derived position at an arbitrary instant. Instants before the origin
    /// saturate to the start offset.
    pub(crate) fn position_at(&self, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.origin);
        (self.offset + elapsed).min(self.duration)
    }
}
