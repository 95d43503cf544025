//! Shared batch bookkeeping
//!
//! Every mutation (task progress, results, error log, running count) goes
//! through one mutex, and events are published while it is held so observers
//! see them in the order the state changed.

use super::results::{BatchReport, DigestResults};
use super::task::{ComputationTask, TaskObserver, TaskOutcome};
use crate::progress::{ProgressProvider, ProgressUpdate};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Default)]
struct Progress {
    /// Last reported percentage of each task, indexed by task id
    task_progress: Vec<u8>,
    progress_sum: u64,
    completed: usize,
    failed: usize,
    running: usize,
    peak_running: usize,
    results: DigestResults,
    errors: BTreeMap<PathBuf, String>,
}

impl Progress {
    fn set_task_progress(&mut self, id: usize, percent: u8) {
        let previous = std::mem::replace(&mut self.task_progress[id], percent);
        self.progress_sum = self.progress_sum - u64::from(previous) + u64::from(percent);
    }

    fn finished(&self) -> usize {
        self.completed + self.failed
    }

    /// Equal weight per task
    fn overall_percent(&self) -> f64 {
        if self.task_progress.is_empty() {
            return 100.0;
        }
        self.progress_sum as f64 / self.task_progress.len() as f64
    }
}

pub(crate) struct BatchState {
    provider: Arc<dyn ProgressProvider>,
    inner: Mutex<Progress>,
}

impl BatchState {
    pub(crate) fn new(total_tasks: usize, provider: Arc<dyn ProgressProvider>) -> Self {
        Self {
            provider,
            inner: Mutex::new(Progress {
                task_progress: vec![0; total_tasks],
                ..Default::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Progress> {
        // A panicking observer must not wedge the rest of the batch
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish_batch_progress(&self, progress: &Progress) {
        self.provider.report(ProgressUpdate::BatchProgress {
            percent: progress.overall_percent(),
            finished: progress.finished(),
            total: progress.task_progress.len(),
        });
    }

    pub(crate) fn task_started(&self, task: &ComputationTask) {
        let mut progress = self.lock();
        progress.running += 1;
        progress.peak_running = progress.peak_running.max(progress.running);
        log::debug!(
            "Started {} of {} ({} running)",
            task.algorithm(),
            task.path().display(),
            progress.running
        );
    }

    /// Fold a finished task into the batch
    pub(crate) fn task_finished(&self, task: &ComputationTask, outcome: TaskOutcome) {
        let mut progress = self.lock();
        progress.running -= 1;

        match outcome {
            TaskOutcome::Done { digest, bytes } => {
                log::debug!(
                    "{} of {} done ({bytes} bytes)",
                    task.algorithm(),
                    task.path().display()
                );
                if !progress
                    .results
                    .insert(task.path(), task.algorithm(), digest.clone())
                {
                    log::warn!(
                        "Ignoring duplicate {} result for {}",
                        task.algorithm(),
                        task.path().display()
                    );
                }
                progress.completed += 1;
                progress.set_task_progress(task.id(), 100);

                self.provider.report(ProgressUpdate::DigestComputed {
                    path: task.path().to_path_buf(),
                    algorithm: task.algorithm(),
                    digest,
                });
                self.publish_batch_progress(&progress);
            }
            TaskOutcome::Failed(error) => {
                log::warn!(
                    "{} of {} failed: {error}",
                    task.algorithm(),
                    task.path().display()
                );
                progress
                    .errors
                    .entry(task.path().to_path_buf())
                    .or_insert_with(|| error.to_string());
                progress.failed += 1;
                progress.set_task_progress(task.id(), 100);
                self.publish_batch_progress(&progress);
            }
            TaskOutcome::Cancelled => {
                log::debug!(
                    "{} of {} cancelled at {}%",
                    task.algorithm(),
                    task.path().display(),
                    task.progress()
                );
            }
        }
    }

    /// Build the final report, moving results and errors out of the state
    pub(crate) fn take_report(&self, cancelled: bool, elapsed: Duration) -> BatchReport {
        let mut progress = self.lock();
        BatchReport {
            results: std::mem::take(&mut progress.results),
            errors: std::mem::take(&mut progress.errors),
            total_tasks: progress.task_progress.len(),
            completed_tasks: progress.completed,
            failed_tasks: progress.failed,
            cancelled,
            peak_concurrency: progress.peak_running,
            elapsed,
        }
    }

    #[cfg(test)]
    pub(crate) fn running(&self) -> usize {
        self.lock().running
    }
}

impl TaskObserver for BatchState {
    fn task_progress(&self, task: &ComputationTask, percent: u8) {
        let mut progress = self.lock();
        progress.set_task_progress(task.id(), percent);

        self.provider.report(ProgressUpdate::TaskProgress {
            path: task.path().to_path_buf(),
            algorithm: task.algorithm(),
            percent,
        });
        self.publish_batch_progress(&progress);
    }
}
