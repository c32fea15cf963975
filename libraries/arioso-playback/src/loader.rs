//! Asynchronous track loading with supersede-based cancellation
//!
//! Every load request bumps a shared epoch counter and captures the new
//! value as its token. A request whose token no longer matches the epoch is
//! stale; stale work checks itself at three points (before fetching, after
//! fetching, after decoding) and silently drops its results. Callers never
//! await loads directly: results arrive as messages on the session channel,
//! tagged with the token so the session can discard late arrivals.

use crate::session::SessionMessage;
use arioso_core::{AudioDecoder, LoadError, TrackByteSource};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, trace, warn};

/// Identity of a single load attempt. Comparing tokens distinguishes the
/// newest request from superseded ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LoadToken(u64);

/// Spawns load pipelines and owns the epoch counter
pub(crate) struct Loader {
    epoch: Arc<AtomicU64>,
    bytes: Arc<dyn TrackByteSource>,
    decoder: Arc<dyn AudioDecoder>,
    tx: UnboundedSender<SessionMessage>,
}

impl Loader {
    pub(crate) fn new(
        bytes: Arc<dyn TrackByteSource>,
        decoder: Arc<dyn AudioDecoder>,
        tx: UnboundedSender<SessionMessage>,
    ) -> Self {
        Self {
            epoch: Arc::new(AtomicU64::new(0)),
            bytes,
            decoder,
            tx,
        }
    }

    /// Begin loading the track at `path`, superseding any load in flight.
    ///
    /// Fetch runs on the async runtime; decode is offloaded with
    /// `spawn_blocking` since it is CPU-bound. Exactly one message per
    /// non-superseded attempt reaches the session.
    pub(crate) fn begin(&self, path: PathBuf) -> LoadToken {
        let token = LoadToken(self.epoch.fetch_add(1, Ordering::SeqCst) + 1);
        let epoch = Arc::clone(&self.epoch);
        let bytes = Arc::clone(&self.bytes);
        let decoder = Arc::clone(&self.decoder);
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let stale = || epoch.load(Ordering::SeqCst) != token.0;
            if stale() {
                trace!(token = token.0, "load superseded before start");
                return;
            }

            let started = Instant::now();
            let data = match bytes.fetch(&path).await {
                Ok(data) => data,
                Err(err) => {
                    if !stale() {
                        warn!(path = %path.display(), error = %err, "track fetch failed");
                        let _ = tx.send(SessionMessage::Loaded {
                            token,
                            result: Err(err),
                        });
                    }
                    return;
                }
            };
            if stale() {
                debug!(token = token.0, path = %path.display(), "discarding superseded fetch");
                return;
            }

            let decode_path = path.clone();
            let result = match tokio::task::spawn_blocking(move || {
                decoder.decode(&data, &decode_path)
            })
            .await
            {
                Ok(result) => result,
                Err(join_err) => Err(LoadError::decode(
                    path.clone(),
                    format!("decode task failed: {join_err}"),
                )),
            };
            if stale() {
                debug!(token = token.0, path = %path.display(), "discarding superseded decode");
                return;
            }

            debug!(
                token = token.0,
                path = %path.display(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                ok = result.is_ok(),
                "track load finished"
            );
            let _ = tx.send(SessionMessage::Loaded { token, result });
        });

        token
    }

    /// Whether `token` identifies the newest load request
    pub(crate) fn is_current(&self, token: LoadToken) -> bool {
        self.epoch.load(Ordering::SeqCst) == token.0
    }

    /// Invalidate any load in flight without starting a new one
    pub(crate) fn cancel(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arioso_core::DecodedAudio;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    struct StaticBytes;

    #[async_trait]
    impl TrackByteSource for StaticBytes {
        async fn fetch(&self, path: &Path) -> Result<Vec<u8>, LoadError> {
            if path.ends_with("missing.flac") {
                return Err(LoadError::io(
                    path,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
                ));
            }
            Ok(vec![0u8; 16])
        }
    }

    struct CountingDecoder {
        decoded: Mutex<Vec<PathBuf>>,
    }

    impl AudioDecoder for CountingDecoder {
        fn decode(&self, data: &[u8], path: &Path) -> Result<DecodedAudio, LoadError> {
            self.decoded.lock().unwrap().push(path.to_path_buf());
            Ok(DecodedAudio::new(vec![0.0; data.len() * 2], 1, 2))
        }

        fn supports_format(&self, _path: &Path) -> bool {
            true
        }
    }

    fn loader() -> (Loader, mpsc::UnboundedReceiver<SessionMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let loader = Loader::new(
            Arc::new(StaticBytes),
            Arc::new(CountingDecoder {
                decoded: Mutex::new(Vec::new()),
            }),
            tx,
        );
        (loader, rx)
    }

    #[tokio::test]
    async fn load_delivers_exactly_one_message() {
        let (loader, mut rx) = loader();
        let token = loader.begin(PathBuf::from("track.flac"));

        let message = rx.recv().await.expect("channel open");
        match message {
            SessionMessage::Loaded { token: got, result } => {
                assert_eq!(got, token);
                assert!(result.is_ok());
            }
            SessionMessage::UnitFinished { .. } => panic!("unexpected message"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn superseded_load_is_silent() {
        // Current-thread runtime: neither spawned task runs until we await,
        // so the second begin supersedes the first before it starts.
        let (loader, mut rx) = loader();
        let first = loader.begin(PathBuf::from("one.flac"));
        let second = loader.begin(PathBuf::from("two.flac"));

        assert!(!loader.is_current(first));
        assert!(loader.is_current(second));

        let message = rx.recv().await.expect("channel open");
        match message {
            SessionMessage::Loaded { token, .. } => assert_eq!(token, second),
            SessionMessage::UnitFinished { .. } => panic!("unexpected message"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn cancel_silences_a_pending_load() {
        let (loader, mut rx) = loader();
        let token = loader.begin(PathBuf::from("track.flac"));
        loader.cancel();
        assert!(!loader.is_current(token));

        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn fetch_failure_reports_the_error() {
        let (loader, mut rx) = loader();
        let token = loader.begin(PathBuf::from("missing.flac"));

        let message = rx.recv().await.expect("channel open");
        match message {
            SessionMessage::Loaded { token: got, result } => {
                assert_eq!(got, token);
                let err = result.expect_err("fetch should fail");
                assert!(err.to_string().contains("missing.flac"));
            }
            SessionMessage::UnitFinished { .. } => panic!("unexpected message"),
        }
    }
}
