//! Progress reporting abstractions
//!
//! The scheduler reports through the [`ProgressProvider`] trait so the core
//! never depends on a particular UI or channel implementation.

use crate::hashing::HashAlgorithm;
use crate::scheduler::BatchReport;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// Core trait for progress reporting
///
/// Implementations are called from worker threads, possibly while the
/// scheduler holds its batch lock, so `report` must not block for long.
pub trait ProgressProvider: Send + Sync {
    /// Report a progress update
    fn report(&self, update: ProgressUpdate);

    /// Signal that the operation is complete
    fn complete(&self);
}

/// Unified progress update type
#[derive(Debug, Clone)]
pub enum ProgressUpdate {
    /// Progress of one (file, algorithm) task, in whole percent
    TaskProgress {
        path: PathBuf,
        algorithm: HashAlgorithm,
        percent: u8,
    },

    /// Aggregate progress over every task of the batch
    BatchProgress {
        percent: f64,
        finished: usize,
        total: usize,
    },

    /// A task finished and produced its rendered digest
    DigestComputed {
        path: PathBuf,
        algorithm: HashAlgorithm,
        digest: String,
    },

    /// The batch is over; carries the full results map and error log
    BatchFinished { report: BatchReport },

    /// Generic status message
    Status { message: String },
}

/// Null implementation for when no progress is needed
pub struct NullProvider;

impl ProgressProvider for NullProvider {
    fn report(&self, _update: ProgressUpdate) {}

    fn complete(&self) {}
}

/// Forwards updates over an unbounded tokio channel.
///
/// Sending never blocks, so updates are delivered in order and the final
/// `BatchFinished` is never dropped while the receiver is alive. `complete`
/// drops the sender so the receiving loop terminates.
pub struct ChannelProvider {
    tx: Mutex<Option<UnboundedSender<ProgressUpdate>>>,
}

impl ChannelProvider {
    /// Create a provider and the receiver that observes it
    pub fn new() -> (Self, UnboundedReceiver<ProgressUpdate>) {
        let (tx, rx) = unbounded_channel();
        (Self::from_sender(tx), rx)
    }

    /// Wrap an existing sender
    pub fn from_sender(tx: UnboundedSender<ProgressUpdate>) -> Self {
        Self {
            tx: Mutex::new(Some(tx)),
        }
    }

    fn sender(&self) -> Option<UnboundedSender<ProgressUpdate>> {
        self.tx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl ProgressProvider for ChannelProvider {
    fn report(&self, update: ProgressUpdate) {
        if let Some(tx) = self.sender() {
            // A dropped receiver just means nobody is listening anymore
            let _ = tx.send(update);
        }
    }

    fn complete(&self) {
        let mut guard = self
            .tx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = None;
    }
}
