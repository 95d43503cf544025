//! `simplehasher hash`: digest files and optionally save checksum files

use super::{ProgressSink, cancel_on_ctrl_c};
use crate::config::AppConfig;
use crate::file_discovery::{FileDiscoveryOptions, discover};
use crate::output::{OutputFormat, create_formatter};
use anyhow::{Context, Result};
use colored::*;
use simplehasher_core::sums::write_sums_files;
use simplehasher_core::{ComputationRequest, HashAlgorithm, Scheduler};
use std::path::PathBuf;

/// Everything the hash command needs beyond the loaded configuration
#[derive(Debug, Clone)]
pub struct HashOptions {
    pub paths: Vec<PathBuf>,
    pub algorithms: Vec<HashAlgorithm>,
    pub recursive: bool,
    pub format: OutputFormat,
    /// Directory to write `<ALGO>SUMS.txt` files into
    pub save_dir: Option<PathBuf>,
    pub show_progress: bool,
    pub use_color: bool,
}

/// Hash every discovered file with every requested algorithm.
///
/// Returns `Ok(false)` when a file failed or the run was cancelled.
pub async fn run_hash(config: &AppConfig, options: HashOptions) -> Result<bool> {
    let discovery = FileDiscoveryOptions::new().with_recursive(options.recursive);
    let files = discover(&options.paths, &discovery).context("File discovery failed")?;

    if files.is_empty() {
        eprintln!("{}", "No files to hash.".yellow());
        return Ok(true);
    }

    let total_bytes: u64 = files
        .iter()
        .map(|f| f.size.saturating_mul(options.algorithms.len() as u64))
        .sum();
    let request: ComputationRequest = files
        .into_iter()
        .map(|f| (f.path, options.algorithms.clone()))
        .collect();

    let scheduler = Scheduler::new(&config.hasher);
    log::debug!(
        "Hashing {} file(s) with {:?} on {} worker(s)",
        request.file_count(),
        options.algorithms,
        scheduler.workers()
    );

    let batch = scheduler.batch(request);
    let interrupt = cancel_on_ctrl_c(batch.cancellation_token());
    let progress = ProgressSink::new(options.show_progress, total_bytes);

    let result = batch.run(progress.provider.clone()).await;
    interrupt.abort();
    progress.finish().await;
    let report = result.context("Hashing failed")?;

    let formatter = create_formatter(options.format, options.use_color);
    print!("{}", formatter.format_report(&report)?);

    if let Some(summary) = report.error_summary() {
        eprint!("{}", summary.yellow());
    }

    if report.cancelled {
        eprintln!(
            "{}",
            format!(
                "Cancelled: {} of {} digest(s) computed",
                report.completed_tasks, report.total_tasks
            )
            .red()
        );
    }

    if let Some(dir) = &options.save_dir {
        if report.results.is_empty() {
            eprintln!("{}", "Nothing to save.".yellow());
        } else {
            let written = write_sums_files(dir, &report.results)
                .with_context(|| format!("Failed to save checksums to {}", dir.display()))?;
            for path in written {
                eprintln!("Saved {}", path.display());
            }
        }
    }

    Ok(report.errors.is_empty() && !report.cancelled)
}
