//! Track domain type

use super::ids::{AlbumId, ArtistId, TrackId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// A library track as seen by the playback engine.
///
/// Tracks are owned by the library data source; queue structures hold
/// clones and never mutate them. The path is relative to the configured
/// library base path (see [`crate::resolve_track_path`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier from the library
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist reference (optional)
    pub artist_id: Option<ArtistId>,

    /// Album reference (optional)
    pub album_id: Option<AlbumId>,

    /// Track duration as recorded in the library
    pub duration: Duration,

    /// Storage location, relative to the library base path
    pub relative_path: PathBuf,
}

impl Track {
    /// Create a new track with a generated ID
    pub fn new(title: impl Into<String>, relative_path: PathBuf) -> Self {
        Self {
            id: TrackId::generate(),
            title: title.into(),
            artist_id: None,
            album_id: None,
            duration: Duration::ZERO,
            relative_path,
        }
    }

    /// Set the duration
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Set the artist reference
    #[must_use]
    pub fn with_artist(mut self, artist_id: ArtistId) -> Self {
        self.artist_id = Some(artist_id);
        self
    }

    /// Set the album reference
    #[must_use]
    pub fn with_album(mut self, album_id: AlbumId) -> Self {
        self.album_id = Some(album_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let artist = ArtistId::new("artist-1");
        let track = Track::new("Song", PathBuf::from("a/b.flac"))
            .with_duration(Duration::from_secs(200))
            .with_artist(artist.clone());

        assert_eq!(track.title, "Song");
        assert_eq!(track.duration, Duration::from_secs(200));
        assert_eq!(track.artist_id, Some(artist));
        assert_eq!(track.album_id, None);
    }
}
