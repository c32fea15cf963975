//! Filesystem byte source

use arioso_core::{LoadError, TrackByteSource};
use async_trait::async_trait;
use std::path::Path;

/// Reads whole audio files from the local filesystem.
///
/// Stateless; the playback engine resolves track paths before calling
/// [`fetch`](TrackByteSource::fetch).
#[derive(Debug, Clone, Copy, Default)]
pub struct FsByteSource;

impl FsByteSource {
    /// Create a filesystem byte source
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TrackByteSource for FsByteSource {
    async fn fetch(&self, path: &Path) -> Result<Vec<u8>, LoadError> {
        tokio::fs::read(path)
            .await
            .map_err(|err| LoadError::io(path, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[tokio::test]
    async fn reads_file_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("track.flac");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"not really flac").unwrap();

        let bytes = FsByteSource::new().fetch(&path).await.unwrap();
        assert_eq!(bytes, b"not really flac");
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let err = FsByteSource::new()
            .fetch(Path::new("/nonexistent/track.flac"))
            .await
            .expect_err("missing file");
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/track.flac"));
    }
}
