//! Domain types shared across the workspace

mod audio;
mod ids;
mod track;

pub use audio::DecodedAudio;
pub use ids::{AlbumId, ArtistId, TrackId};
pub use track::Track;
