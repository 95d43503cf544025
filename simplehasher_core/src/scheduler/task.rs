//! A single (file, algorithm) computation

use crate::error::IoError;
use crate::hashing::{Digest, HashAlgorithm};
use crate::progress::{ProgressProvider, ProgressUpdate};
use crate::{Error, Result};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Lifecycle of a task. Transitions only move forward:
/// `Pending -> Running -> {Done, Cancelled, Failed}` or `Pending -> Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Running,
    Done,
    Cancelled,
    Failed,
}

impl TaskStatus {
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (Pending, Running) | (Pending, Cancelled) | (Running, Done | Cancelled | Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Done | TaskStatus::Cancelled | TaskStatus::Failed
        )
    }
}

/// How a task ended
#[derive(Debug)]
pub(crate) enum TaskOutcome {
    Done { digest: String, bytes: u64 },
    Cancelled,
    Failed(Error),
}

/// Receives per-task progress. Called on the task's worker thread.
pub(crate) trait TaskObserver {
    fn task_progress(&self, task: &ComputationTask, percent: u8);
}

/// Adapts a [`ProgressProvider`] for tasks run outside a batch
pub(crate) struct ProviderObserver {
    provider: Arc<dyn ProgressProvider>,
}

impl ProviderObserver {
    pub(crate) fn new(provider: Arc<dyn ProgressProvider>) -> Self {
        Self { provider }
    }
}

impl TaskObserver for ProviderObserver {
    fn task_progress(&self, task: &ComputationTask, percent: u8) {
        self.provider.report(ProgressUpdate::TaskProgress {
            path: task.path.clone(),
            algorithm: task.algorithm,
            percent,
        });
    }
}

/// Binds one file to one digest instance and tracks its progress
pub struct ComputationTask {
    id: usize,
    path: PathBuf,
    algorithm: HashAlgorithm,
    digest: Box<dyn Digest>,
    progress: u8,
    status: TaskStatus,
}

impl std::fmt::Debug for ComputationTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComputationTask")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("algorithm", &self.algorithm)
            .field("progress", &self.progress)
            .field("status", &self.status)
            .finish()
    }
}

impl ComputationTask {
    pub fn new(path: PathBuf, algorithm: HashAlgorithm) -> Self {
        Self {
            id: 0,
            path,
            algorithm,
            digest: algorithm.create_digest(),
            progress: 0,
            status: TaskStatus::Pending,
        }
    }

    /// Position of the task inside its batch
    pub(crate) fn with_id(mut self, id: usize) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    fn transition(&mut self, next: TaskStatus) {
        debug_assert!(
            self.status.can_transition_to(next),
            "invalid task transition {:?} -> {next:?}",
            self.status
        );
        self.status = next;
    }

    /// Stream the file through the digest.
    ///
    /// Reads are whole multiples of the block size so every block but the
    /// last is absorbed directly. Cancellation is checked after each block.
    pub(crate) fn run(
        &mut self,
        read_buffer_size: usize,
        cancel: &CancellationToken,
        observer: &dyn TaskObserver,
    ) -> TaskOutcome {
        if cancel.is_cancelled() {
            self.transition(TaskStatus::Cancelled);
            return TaskOutcome::Cancelled;
        }
        self.transition(TaskStatus::Running);

        match self.stream_file(read_buffer_size, cancel, observer) {
            Ok(Some(bytes)) => {
                self.transition(TaskStatus::Done);
                TaskOutcome::Done {
                    digest: self.digest.value(),
                    bytes,
                }
            }
            Ok(None) => {
                self.transition(TaskStatus::Cancelled);
                TaskOutcome::Cancelled
            }
            Err(error) => {
                self.transition(TaskStatus::Failed);
                TaskOutcome::Failed(error)
            }
        }
    }

    /// Returns the number of bytes hashed, or `None` if cancelled
    fn stream_file(
        &mut self,
        read_buffer_size: usize,
        cancel: &CancellationToken,
        observer: &dyn TaskObserver,
    ) -> Result<Option<u64>> {
        let path = self.path.clone();
        let io_error = |e: std::io::Error| IoError::from_std(e).with_path(&path);

        let mut file = File::open(&path).map_err(io_error)?;
        let metadata = file.metadata().map_err(io_error)?;
        if metadata.is_dir() {
            return Err(io_error(ErrorKind::IsADirectory.into()).into());
        }
        let total_size = metadata.len();

        let block_size = self.digest.block_size();
        let mut buffer = vec![0u8; (read_buffer_size / block_size).max(1) * block_size];
        let mut processed = 0u64;

        loop {
            let filled = read_full(&mut file, &mut buffer).map_err(io_error)?;
            let mut blocks = buffer[..filled].chunks_exact(block_size);

            for block in &mut blocks {
                processed += block_size as u64;
                self.digest.absorb(block, processed);
                self.advance(processed, total_size, observer);
                if cancel.is_cancelled() {
                    return Ok(None);
                }
            }

            if filled < buffer.len() {
                // End of file: the remainder, possibly empty, carries the padding
                let tail = blocks.remainder();
                processed += tail.len() as u64;
                self.digest.absorb(tail, processed);
                break;
            }
        }

        self.set_progress(100, observer);
        Ok(Some(processed))
    }

    fn advance(&mut self, processed: u64, total: u64, observer: &dyn TaskObserver) {
        let percent = if total == 0 {
            100
        } else {
            (u128::from(processed) * 100 / u128::from(total)).min(100) as u8
        };
        self.set_progress(percent, observer);
    }

    fn set_progress(&mut self, percent: u8, observer: &dyn TaskObserver) {
        if percent != self.progress {
            self.progress = percent;
            observer.task_progress(self, percent);
        }
    }
}

/// Fill `buffer` as far as the reader allows; a short count means EOF
fn read_full(reader: &mut impl Read, buffer: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
