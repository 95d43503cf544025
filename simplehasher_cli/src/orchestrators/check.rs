//! `simplehasher check`: verify files against saved checksum files

use super::{ProgressSink, cancel_on_ctrl_c};
use crate::config::AppConfig;
use anyhow::{Context, Result};
use colored::*;
use simplehasher_core::{VerificationEntry, VerificationReport, VerificationStatus, Verifier};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub sums_files: Vec<PathBuf>,
    /// Only print entries that did not verify
    pub quiet: bool,
    pub show_progress: bool,
}

/// Verify every entry of every checksum file.
///
/// Returns `Ok(true)` only when all entries matched and every checksum file
/// could be read.
pub async fn run_check(config: &AppConfig, options: CheckOptions) -> Result<bool> {
    let token = CancellationToken::new();
    let verifier = Verifier::new(&config.hasher).with_cancellation(token.clone());
    let interrupt = cancel_on_ctrl_c(token);
    let progress = ProgressSink::new(options.show_progress, 0);

    let result = verifier
        .verify(&options.sums_files, progress.provider.clone())
        .await;
    interrupt.abort();
    progress.finish().await;
    let report = result.context("Verification failed")?;

    let tag_algorithm = report
        .entries
        .iter()
        .map(|e| e.algorithm)
        .collect::<BTreeSet<_>>()
        .len()
        > 1;

    for entry in &report.entries {
        if options.quiet && entry.status.is_ok() {
            continue;
        }
        println!("{}", entry_line(entry, tag_algorithm));
    }

    print_notices(&report);
    Ok(report.is_success() && !report.cancelled)
}

/// `path: OK` style line; the algorithm is added when several are checked
fn entry_line(entry: &VerificationEntry, tag_algorithm: bool) -> String {
    let status = match &entry.status {
        VerificationStatus::Matched => "OK".green(),
        VerificationStatus::Mismatched { .. } => "FAILED".red(),
        VerificationStatus::Unreadable { .. } => "FAILED open or read".red(),
        VerificationStatus::NotChecked => "NOT CHECKED".yellow(),
    };
    if tag_algorithm {
        format!("{} [{}]: {status}", entry.path.display(), entry.algorithm)
    } else {
        format!("{}: {status}", entry.path.display())
    }
}

fn print_notices(report: &VerificationReport) {
    if !report.rejected.is_empty() {
        eprintln!(
            "{}",
            format!("{} checksum file(s) could not be used:", report.rejected.len()).yellow()
        );
        for (path, reason) in &report.rejected {
            eprintln!("  {}: {reason}", path.display());
        }
    }

    let mut mismatched = 0;
    let mut unreadable = Vec::new();
    for entry in report.failures() {
        match &entry.status {
            VerificationStatus::Mismatched { .. } => mismatched += 1,
            VerificationStatus::Unreadable { message } => unreadable.push((entry, message)),
            _ => {}
        }
    }

    if !unreadable.is_empty() {
        eprintln!(
            "{}",
            format!("WARNING: {} listed file(s) could not be read:", unreadable.len()).yellow()
        );
        for (entry, message) in unreadable {
            eprintln!("  {} error: {message}", entry.path.display());
        }
    }
    if mismatched > 0 {
        eprintln!(
            "{}",
            format!("WARNING: {mismatched} computed checksum(s) did NOT match").yellow()
        );
    }
    if report.cancelled {
        let skipped = report
            .entries
            .iter()
            .filter(|e| e.status == VerificationStatus::NotChecked)
            .count();
        eprintln!(
            "{}",
            format!("Cancelled: {skipped} entries not checked").red()
        );
    }
}
