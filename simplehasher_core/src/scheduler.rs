//! Bounded concurrent digest computation
//!
//! A [`ComputationRequest`] maps files to the algorithms wanted for them. The
//! [`Scheduler`] turns it into a [`ComputationBatch`] with one
//! [`ComputationTask`] per (file, algorithm) pair and runs the tasks on
//! tokio's blocking pool:
//! - At most `workers` tasks run at once (semaphore admission)
//! - A file that cannot be read is logged and the batch continues
//! - Progress, completions and the final report flow through a
//!   [`ProgressProvider`]
//! - Cancellation is cooperative via a [`CancellationToken`]

use crate::progress::{ProgressProvider, ProgressUpdate};
use crate::{Error, HasherConfig, Result, error::InternalError};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

mod request;
mod results;
mod state;
pub mod task;

pub use request::ComputationRequest;
pub use results::{BatchReport, DigestResults};
pub use task::{ComputationTask, TaskStatus};

use state::BatchState;

/// Upper bound on concurrently running tasks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "usize", into = "usize")]
pub enum WorkerLimit {
    /// One worker per logical core
    #[default]
    SystemDefault,
    Fixed(NonZeroUsize),
}

impl WorkerLimit {
    /// `0` selects the system default
    pub fn from_count(count: usize) -> Self {
        NonZeroUsize::new(count).map_or(WorkerLimit::SystemDefault, WorkerLimit::Fixed)
    }

    /// Concrete worker count for this host
    pub fn resolve(self) -> usize {
        match self {
            WorkerLimit::SystemDefault => std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            WorkerLimit::Fixed(count) => count.get(),
        }
    }
}

impl From<usize> for WorkerLimit {
    fn from(count: usize) -> Self {
        Self::from_count(count)
    }
}

impl From<WorkerLimit> for usize {
    fn from(limit: WorkerLimit) -> Self {
        match limit {
            WorkerLimit::SystemDefault => 0,
            WorkerLimit::Fixed(count) => count.get(),
        }
    }
}

/// Creates batches with a fixed worker count and read size
#[derive(Debug, Clone)]
pub struct Scheduler {
    workers: usize,
    read_buffer_size: usize,
}

impl Scheduler {
    /// The worker limit is resolved here, once, and capped at what a
    /// semaphore can hold
    pub fn new(config: &HasherConfig) -> Self {
        Self {
            workers: config.workers.resolve().min(Semaphore::MAX_PERMITS),
            read_buffer_size: config.read_buffer_size,
        }
    }

    pub fn with_workers(workers: WorkerLimit) -> Self {
        Self::new(&HasherConfig {
            workers,
            ..HasherConfig::default()
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Create the tasks for `request`. Nothing runs until
    /// [`ComputationBatch::run`].
    pub fn batch(&self, request: ComputationRequest) -> ComputationBatch {
        let tasks = request
            .into_pairs()
            .enumerate()
            .map(|(id, (path, algorithm))| ComputationTask::new(path, algorithm).with_id(id))
            .collect();

        ComputationBatch {
            tasks,
            workers: self.workers,
            read_buffer_size: self.read_buffer_size,
            cancel: CancellationToken::new(),
        }
    }

    /// Build and run a batch in one step
    pub async fn run(
        &self,
        request: ComputationRequest,
        provider: Arc<dyn ProgressProvider>,
    ) -> Result<BatchReport> {
        self.batch(request).run(provider).await
    }
}

/// A set of pending tasks sharing one cancellation token
#[derive(Debug)]
pub struct ComputationBatch {
    tasks: Vec<ComputationTask>,
    workers: usize,
    read_buffer_size: usize,
    cancel: CancellationToken,
}

impl ComputationBatch {
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Handle for cancelling the batch from anywhere, at any time
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Share an existing token, e.g. one wired to Ctrl-C
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run every task and wait for all of them to exit.
    ///
    /// Per-file failures end up in [`BatchReport::errors`]; an `Err` is only
    /// returned for internal failures such as a panicked worker. On success a
    /// `BatchFinished` update is reported and the provider is completed.
    pub async fn run(self, provider: Arc<dyn ProgressProvider>) -> Result<BatchReport> {
        let ComputationBatch {
            tasks,
            workers,
            read_buffer_size,
            cancel,
        } = self;

        let started = Instant::now();
        log::debug!(
            "Starting batch of {} task(s) with {workers} worker(s)",
            tasks.len()
        );

        let state = Arc::new(BatchState::new(tasks.len(), Arc::clone(&provider)));
        let semaphore = Arc::new(Semaphore::new(workers));
        let mut handles = FuturesUnordered::new();
        let mut failure: Option<Error> = None;

        for mut task in tasks {
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => {
                        failure = Some(Error::Internal(InternalError::assertion(
                            "Worker pool closed while admitting tasks",
                        )));
                        break;
                    }
                },
            };
            // The token may fire while the permit was being granted
            if cancel.is_cancelled() {
                break;
            }

            let state = Arc::clone(&state);
            let cancel = cancel.clone();
            handles.push(tokio::task::spawn_blocking(move || {
                state.task_started(&task);
                let outcome = task.run(read_buffer_size, &cancel, state.as_ref());
                state.task_finished(&task, outcome);
                // Freeing the slot only now keeps the running count within the limit
                drop(permit);
            }));
        }

        while let Some(joined) = handles.next().await {
            if let Err(e) = joined {
                log::error!("Hashing worker terminated abnormally: {e}");
                failure.get_or_insert_with(|| {
                    Error::Internal(InternalError::worker_failed("hashing worker", e.to_string()))
                });
            }
        }

        if let Some(error) = failure {
            return Err(error);
        }

        let report = state.take_report(cancel.is_cancelled(), started.elapsed());
        log::info!(
            "Batch finished: {}/{} digests, {} failed file(s){} in {:.2?}",
            report.completed_tasks,
            report.total_tasks,
            report.errors.len(),
            if report.cancelled { ", cancelled" } else { "" },
            report.elapsed
        );

        provider.report(ProgressUpdate::BatchFinished {
            report: report.clone(),
        });
        provider.complete();

        Ok(report)
    }
}
