//! Recording and cancelling progress providers

use simplehasher_core::progress::{NullProvider, ProgressProvider, ProgressUpdate};
use simplehasher_core::{BatchReport, HashAlgorithm};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// Captures every update in arrival order. Clones share the same log.
#[derive(Clone, Default)]
pub struct RecordingProvider {
    updates: Arc<Mutex<Vec<ProgressUpdate>>>,
    completed: Arc<AtomicBool>,
}

impl RecordingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn updates(&self) -> Vec<ProgressUpdate> {
        self.updates.lock().unwrap().clone()
    }

    /// `(path, algorithm, digest)` of every `DigestComputed` update
    pub fn digests(&self) -> Vec<(PathBuf, HashAlgorithm, String)> {
        self.updates()
            .into_iter()
            .filter_map(|update| match update {
                ProgressUpdate::DigestComputed {
                    path,
                    algorithm,
                    digest,
                } => Some((path, algorithm, digest)),
                _ => None,
            })
            .collect()
    }

    /// Aggregate percentages in the order they were reported
    pub fn batch_percents(&self) -> Vec<f64> {
        self.updates()
            .into_iter()
            .filter_map(|update| match update {
                ProgressUpdate::BatchProgress { percent, .. } => Some(percent),
                _ => None,
            })
            .collect()
    }

    /// Reports carried by `BatchFinished` updates
    pub fn finished_reports(&self) -> Vec<BatchReport> {
        self.updates()
            .into_iter()
            .filter_map(|update| match update {
                ProgressUpdate::BatchFinished { report } => Some(report),
                _ => None,
            })
            .collect()
    }

    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }
}

impl ProgressProvider for RecordingProvider {
    fn report(&self, update: ProgressUpdate) {
        self.updates.lock().unwrap().push(update);
    }

    fn complete(&self) {
        self.completed.store(true, Ordering::SeqCst);
    }
}

type Trigger = dyn Fn(&ProgressUpdate) -> bool + Send + Sync;

/// Forwards to an inner provider and cancels a token the first time an
/// update satisfies the trigger
pub struct CancellingProvider {
    inner: Arc<dyn ProgressProvider>,
    token: CancellationToken,
    trigger: Arc<Trigger>,
}

impl CancellingProvider {
    pub fn new(
        token: CancellationToken,
        trigger: impl Fn(&ProgressUpdate) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner: Arc::new(NullProvider),
            token,
            trigger: Arc::new(trigger),
        }
    }

    /// Cancel once `count` digests have been computed
    pub fn after_digests(token: CancellationToken, count: usize) -> Self {
        let seen = AtomicUsize::new(0);
        Self::new(token, move |update| {
            matches!(update, ProgressUpdate::DigestComputed { .. })
                && seen.fetch_add(1, Ordering::SeqCst) + 1 >= count
        })
    }

    /// Cancel when any task reaches `percent`
    pub fn at_task_percent(token: CancellationToken, percent: u8) -> Self {
        Self::new(token, move |update| {
            matches!(update, ProgressUpdate::TaskProgress { percent: p, .. } if *p >= percent)
        })
    }

    /// Also forward every update to `inner`
    pub fn forwarding_to(mut self, inner: Arc<dyn ProgressProvider>) -> Self {
        self.inner = inner;
        self
    }
}

impl ProgressProvider for CancellingProvider {
    fn report(&self, update: ProgressUpdate) {
        let fire = (self.trigger)(&update);
        self.inner.report(update);
        if fire {
            self.token.cancel();
        }
    }

    fn complete(&self) {
        self.inner.complete();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest_update() -> ProgressUpdate {
        ProgressUpdate::DigestComputed {
            path: PathBuf::from("a"),
            algorithm: HashAlgorithm::MD5,
            digest: "x".to_string(),
        }
    }

    #[test]
    fn test_recording_provider_clones_share_log() {
        let recorder = RecordingProvider::new();
        recorder.clone().report(digest_update());
        recorder.report(ProgressUpdate::Status {
            message: "hi".to_string(),
        });
        recorder.complete();

        assert_eq!(recorder.updates().len(), 2);
        assert_eq!(recorder.digests().len(), 1);
        assert!(recorder.is_completed());
    }

    #[test]
    fn test_cancel_after_digests() {
        let token = CancellationToken::new();
        let recorder = RecordingProvider::new();
        let provider = CancellingProvider::after_digests(token.clone(), 2)
            .forwarding_to(Arc::new(recorder.clone()));

        provider.report(digest_update());
        assert!(!token.is_cancelled());
        provider.report(digest_update());
        assert!(token.is_cancelled());
        assert_eq!(recorder.digests().len(), 2);
    }
}
