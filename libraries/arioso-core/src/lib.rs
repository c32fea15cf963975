//! Arioso Core
//!
//! Platform-agnostic core types, traits, and error handling for Arioso.
//!
//! This crate provides the foundational building blocks shared by the
//! playback engine and the platform collaborator crates:
//!
//! - **Domain Types**: [`Track`], [`DecodedAudio`], ID newtypes
//! - **Collaborator Traits**: [`TrackByteSource`], [`AudioDecoder`],
//!   [`PlayedObserver`]
//! - **Error Handling**: the [`LoadError`] taxonomy for fetch/decode failures
//! - **Library Paths**: [`resolve_track_path`] for mapping a track's
//!   storage-relative path to its on-disk location
//!
//! # Example
//!
//! ```rust
//! use arioso_core::types::Track;
//! use std::path::{Path, PathBuf};
//! use std::time::Duration;
//!
//! let track = Track::new("My Favorite Song", PathBuf::from("artist/album/01.flac"))
//!     .with_duration(Duration::from_secs(241));
//!
//! let resolved = arioso_core::resolve_track_path(Path::new("/music"), &track.relative_path);
//! assert_eq!(resolved, PathBuf::from("/music/artist/album/01.flac"));
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod library;
pub mod traits;
pub mod types;

pub use error::LoadError;
pub use library::resolve_track_path;
pub use traits::{AudioDecoder, PlayedObserver, TrackByteSource};
pub use types::{AlbumId, ArtistId, DecodedAudio, Track, TrackId};
