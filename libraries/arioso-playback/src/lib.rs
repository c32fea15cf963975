//! Playback engine and queue/session management for Arioso
//!
//! The engine is split into three cooperating parts:
//!
//! - [`QueueManager`]: pure queue state. An immutable playing context plus
//!   a consumable user-queue FIFO, with shuffle and repeat folded into the
//!   navigation rules.
//! - A load pipeline (fetch then decode) with supersede-based cancellation:
//!   starting a new load invalidates any load in flight, and stale results
//!   are dropped at well-defined checkpoints.
//! - [`PlaybackSession`]: the orchestrator. Owns the single live output
//!   unit, derives the playback position from wall-clock time, auto-advances
//!   on natural track end, and surfaces everything to the host through
//!   [`SessionEvent`]s.
//!
//! Audio I/O is abstracted behind [`AudioOutput`] (and the loading traits in
//! `arioso-core`), so the whole engine runs against in-memory fakes in
//! tests. Desktop implementations live in `arioso-audio-desktop`.
//!
//! # Example
//!
//! Queue navigation is usable on its own:
//!
//! ```
//! use arioso_playback::{QueueManager, RepeatMode};
//! use arioso_core::Track;
//! use std::path::PathBuf;
//!
//! let album: Vec<Track> = (1..=3)
//!     .map(|n| Track::new(format!("Track {n}"), PathBuf::from(format!("{n}.flac"))))
//!     .collect();
//!
//! let mut queue = QueueManager::new(false, RepeatMode::Off);
//! queue.play_track(&album[0], album.clone());
//! assert!(queue.next());
//! assert_eq!(queue.current().map(|t| t.title.as_str()), Some("Track 2"));
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod events;
pub mod output;
pub mod queue;
pub mod types;

mod clock;
mod loader;
mod session;
mod shuffle;

pub use error::{PlaybackError, Result};
pub use events::SessionEvent;
pub use output::{AudioOutput, OutputUnit, UnitCompletion};
pub use queue::QueueManager;
pub use session::PlaybackSession;
pub use types::{PlaybackConfig, PlaybackState, RepeatMode};
