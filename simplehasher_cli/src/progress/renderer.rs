//! Progress rendering for the CLI
//!
//! One aggregate bar for the batch plus one short-lived bar per running
//! (file, algorithm) task, all drawn through a shared `MultiProgress`.

use super::utils::{format_bytes, format_duration, format_throughput, throughput_mbps};
use colored::*;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use simplehasher_core::progress::ProgressUpdate;
use simplehasher_core::{BatchReport, HashAlgorithm};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::mpsc::UnboundedReceiver;

/// Resolution of the aggregate bar
const BATCH_BAR_LEN: u64 = 1000;

/// Render progress updates until the provider completes.
///
/// `total_bytes` is the number of bytes the batch will read in total, or `0`
/// when unknown, and is only used for the closing summary line.
pub async fn render_progress(mut rx: UnboundedReceiver<ProgressUpdate>, total_bytes: u64) {
    let mut renderer = ProgressRenderer::new(total_bytes);

    while let Some(update) = rx.recv().await {
        renderer.handle_update(update);
    }

    renderer.finish();
}

/// Progress renderer that manages visual progress display
pub struct ProgressRenderer {
    multi: MultiProgress,
    batch_bar: Option<ProgressBar>,
    task_bars: HashMap<(PathBuf, HashAlgorithm), ProgressBar>,
    total_bytes: u64,
    summary: Option<String>,
}

impl ProgressRenderer {
    /// Create a renderer drawing to stderr
    pub fn new(total_bytes: u64) -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr(), total_bytes)
    }

    pub fn with_draw_target(target: ProgressDrawTarget, total_bytes: u64) -> Self {
        Self {
            multi: MultiProgress::with_draw_target(target),
            batch_bar: None,
            task_bars: HashMap::new(),
            total_bytes,
            summary: None,
        }
    }

    /// Handle a progress update
    pub fn handle_update(&mut self, update: ProgressUpdate) {
        match update {
            ProgressUpdate::TaskProgress {
                path,
                algorithm,
                percent,
            } => self.update_task(path, algorithm, percent),

            ProgressUpdate::BatchProgress {
                percent,
                finished,
                total,
            } => self.update_batch(percent, finished, total),

            ProgressUpdate::DigestComputed {
                path, algorithm, ..
            } => {
                if let Some(bar) = self.task_bars.remove(&(path, algorithm)) {
                    bar.finish_and_clear();
                    self.multi.remove(&bar);
                }
            }

            ProgressUpdate::BatchFinished { report } => {
                self.clear_task_bars();
                self.summary = Some(self.summary_line(&report));
            }

            ProgressUpdate::Status { message } => self.show_status(&message),
        }
    }

    /// Number of task bars currently on screen
    #[cfg(test)]
    fn active_task_bars(&self) -> usize {
        self.task_bars.len()
    }

    fn update_task(&mut self, path: PathBuf, algorithm: HashAlgorithm, percent: u8) {
        let multi = &self.multi;
        let bar = self
            .task_bars
            .entry((path.clone(), algorithm))
            .or_insert_with(|| {
                let bar = multi.add(ProgressBar::new(100));
                bar.set_style(
                    ProgressStyle::with_template(
                        "  {prefix:>8.yellow} [{bar:30.cyan/blue}] {percent:>3}% {msg}",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
                );
                let file_name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("unknown")
                    .to_string();
                bar.set_prefix(algorithm.name());
                bar.set_message(file_name);
                bar
            });
        bar.set_position(u64::from(percent));
    }

    fn update_batch(&mut self, percent: f64, finished: usize, total: usize) {
        let multi = &self.multi;
        let bar = self.batch_bar.get_or_insert_with(|| {
            let bar = multi.insert(0, ProgressBar::new(BATCH_BAR_LEN));
            bar.set_style(
                ProgressStyle::with_template(
                    "{msg}\n[{elapsed_precise}] [{bar:40.cyan/blue}] {prefix} | ETA: {eta}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-"),
            );
            bar.set_message("Hashing".bold().to_string());
            bar
        });

        let position = (percent.clamp(0.0, 100.0) * BATCH_BAR_LEN as f64 / 100.0).round();
        bar.set_position(position as u64);
        bar.set_prefix(format!("{percent:.1}% | {finished}/{total} tasks"));
    }

    fn clear_task_bars(&mut self) {
        for (_, bar) in self.task_bars.drain() {
            bar.finish_and_clear();
            self.multi.remove(&bar);
        }
    }

    fn summary_line(&self, report: &BatchReport) -> String {
        if report.cancelled {
            return format!("{} cancelled after {} digest(s)", "✗".red(), report.completed_tasks);
        }
        if self.total_bytes == 0 {
            return format!(
                "{} {} digest(s) in {}",
                "✓".green(),
                report.completed_tasks,
                format_duration(report.elapsed)
            );
        }
        let mbps = throughput_mbps(self.total_bytes, report.elapsed);
        format!(
            "{} {} digest(s), {} read in {} ({})",
            "✓".green(),
            report.completed_tasks,
            format_bytes(self.total_bytes),
            format_duration(report.elapsed),
            format_throughput(mbps)
        )
    }

    /// Show a status message above the bars
    fn show_status(&self, message: &str) {
        if let Err(e) = self.multi.println(format!("{} {}", "→".green(), message)) {
            log::debug!("Failed to print status: {e}");
        }
    }

    /// Finish all progress bars
    pub fn finish(mut self) {
        self.clear_task_bars();
        if let Some(bar) = self.batch_bar.take() {
            match self.summary.take() {
                Some(summary) => bar.finish_with_message(summary),
                None => bar.finish_and_clear(),
            }
        }
    }
}
