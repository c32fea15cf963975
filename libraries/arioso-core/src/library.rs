//! Library path resolution

use std::path::{Path, PathBuf};

/// Resolve a track's storage-relative path against the library base path.
///
/// Pure path join; absolute relative paths are returned as-is (standard
/// [`Path::join`] semantics), which lets a library entry opt out of the
/// base-path scheme.
pub fn resolve_track_path(base: &Path, relative: &Path) -> PathBuf {
    base.join(relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_base_and_relative() {
        let resolved = resolve_track_path(Path::new("/music"), Path::new("artist/track.flac"));
        assert_eq!(resolved, PathBuf::from("/music/artist/track.flac"));
    }

    #[test]
    fn absolute_relative_path_wins() {
        let resolved = resolve_track_path(Path::new("/music"), Path::new("/other/track.flac"));
        assert_eq!(resolved, PathBuf::from("/other/track.flac"));
    }

    #[test]
    fn empty_base_yields_relative() {
        let resolved = resolve_track_path(Path::new(""), Path::new("track.flac"));
        assert_eq!(resolved, PathBuf::from("track.flac"));
    }
}
