//! Checking files against `<ALGO>SUMS.txt` checksum files
//!
//! All checksum files are loaded first; every referenced (file, algorithm)
//! pair then goes through a single scheduler batch, so verification gets the
//! same worker limit, progress events and cancellation as hashing.

use crate::progress::{ProgressProvider, ProgressUpdate};
use crate::scheduler::{BatchReport, ComputationRequest, Scheduler};
use crate::sums::{self, SumsFile, compact_digest};
use crate::{HasherConfig, HashAlgorithm, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Outcome for one checksum entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerificationStatus {
    Matched,
    Mismatched { expected: String, actual: String },
    /// The file could not be read; carries the error message
    Unreadable { message: String },
    /// The batch was cancelled before this entry was hashed
    NotChecked,
}

impl VerificationStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, VerificationStatus::Matched)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationEntry {
    /// Checksum file the entry came from
    pub sums_file: PathBuf,
    pub algorithm: HashAlgorithm,
    /// Resolved location of the checked file
    pub path: PathBuf,
    pub status: VerificationStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VerificationReport {
    /// Entries in checksum file order
    pub entries: Vec<VerificationEntry>,
    /// Checksum files that could not be loaded, with the reason
    pub rejected: BTreeMap<PathBuf, String>,
    pub cancelled: bool,
}

impl VerificationReport {
    pub fn matched(&self) -> usize {
        self.entries.iter().filter(|e| e.status.is_ok()).count()
    }

    /// Entries that did not match, including unreadable and unchecked ones
    pub fn failures(&self) -> impl Iterator<Item = &VerificationEntry> {
        self.entries.iter().filter(|e| !e.status.is_ok())
    }

    /// True when every entry matched and every checksum file was usable
    pub fn is_success(&self) -> bool {
        self.rejected.is_empty() && self.failures().next().is_none()
    }
}

/// Verifies checksum files using a [`Scheduler`]
#[derive(Debug, Clone)]
pub struct Verifier {
    scheduler: Scheduler,
    cancel: CancellationToken,
}

impl Verifier {
    pub fn new(config: &HasherConfig) -> Self {
        Self {
            scheduler: Scheduler::new(config),
            cancel: CancellationToken::new(),
        }
    }

    /// Cancel verification through an externally owned token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Load `sums_files`, hash everything they reference and classify each
    /// entry. Files that fail to load are reported in
    /// [`VerificationReport::rejected`] and skipped.
    pub async fn verify(
        &self,
        sums_files: &[PathBuf],
        provider: Arc<dyn ProgressProvider>,
    ) -> Result<VerificationReport> {
        let mut rejected = BTreeMap::new();
        let mut loaded = Vec::new();
        for path in sums_files {
            match sums::read_sums_file(path) {
                Ok(file) => loaded.push(file),
                Err(e) if e.is_per_file() => {
                    log::warn!("Skipping checksum file {}: {e}", path.display());
                    provider.report(ProgressUpdate::Status {
                        message: format!("Skipping {}: {e}", path.display()),
                    });
                    rejected.insert(path.clone(), e.to_string());
                }
                Err(e) => return Err(e),
            }
        }

        let mut request = ComputationRequest::new();
        for file in &loaded {
            for entry in &file.entries {
                request.add_file(&entry.path, &[file.algorithm]);
            }
        }

        let report = self
            .scheduler
            .batch(request)
            .with_cancellation(self.cancel.clone())
            .run(provider)
            .await?;

        let entries = loaded
            .iter()
            .flat_map(|file| classify_file(file, &report))
            .collect();

        Ok(VerificationReport {
            entries,
            rejected,
            cancelled: report.cancelled,
        })
    }
}

fn classify_file<'a>(
    file: &'a SumsFile,
    report: &'a BatchReport,
) -> impl Iterator<Item = VerificationEntry> + 'a {
    file.entries.iter().map(move |entry| VerificationEntry {
        sums_file: file.path.clone(),
        algorithm: file.algorithm,
        path: entry.path.clone(),
        status: classify(&entry.path, file.algorithm, &entry.expected, report),
    })
}

fn classify(
    path: &Path,
    algorithm: HashAlgorithm,
    expected: &str,
    report: &BatchReport,
) -> VerificationStatus {
    if let Some(digest) = report.results.get(path, algorithm) {
        let actual = compact_digest(digest);
        if actual == expected {
            VerificationStatus::Matched
        } else {
            VerificationStatus::Mismatched {
                expected: expected.to_string(),
                actual,
            }
        }
    } else if let Some(message) = report.errors.get(path) {
        VerificationStatus::Unreadable {
            message: message.clone(),
        }
    } else {
        VerificationStatus::NotChecked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullProvider;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_verify_classifies_entries() {
        let dir = TempDir::new().unwrap();
        write(&dir, "good.txt", "abc");
        write(&dir, "bad.txt", "abd");
        let abc = compact_digest(&HashAlgorithm::SHA1.hash_bytes(b"abc"));
        let sums = write(
            &dir,
            "SHA1SUMS.txt",
            &format!("{abc} *good.txt\n{abc} *bad.txt\n{abc} *gone.txt\n"),
        );

        let report = Verifier::new(&HasherConfig::test())
            .verify(&[sums], Arc::new(NullProvider))
            .await
            .unwrap();

        assert_eq!(report.entries.len(), 3);
        assert_eq!(report.entries[0].status, VerificationStatus::Matched);
        assert!(matches!(
            &report.entries[1].status,
            VerificationStatus::Mismatched { expected, .. } if *expected == abc
        ));
        assert!(matches!(
            report.entries[2].status,
            VerificationStatus::Unreadable { .. }
        ));
        assert_eq!(report.matched(), 1);
        assert!(!report.is_success());
    }

    #[tokio::test]
    async fn test_malformed_file_is_rejected_others_checked() {
        let dir = TempDir::new().unwrap();
        write(&dir, "data.bin", "");
        let md5 = write(
            &dir,
            "MD5SUMS.txt",
            "d41d8cd98f00b204e9800998ecf8427e *data.bin\n",
        );
        let broken = write(&dir, "SHA256SUMS.txt", "not a checksum line\n");
        let unnamed = write(&dir, "list.txt", "");

        let report = Verifier::new(&HasherConfig::test())
            .verify(&[md5, broken.clone(), unnamed.clone()], Arc::new(NullProvider))
            .await
            .unwrap();

        assert_eq!(report.matched(), 1);
        assert_eq!(report.rejected.len(), 2);
        assert!(report.rejected[&broken].contains("line 1"));
        assert!(report.rejected.contains_key(&unnamed));
        assert!(!report.is_success());
    }

    #[tokio::test]
    async fn test_cancelled_verification_marks_not_checked() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.bin", "a");
        let sums = write(
            &dir,
            "MD5SUMS.txt",
            "0cc175b9c0f1b6a831c399e269772661 *a.bin\n",
        );
        let token = CancellationToken::new();
        token.cancel();

        let report = Verifier::new(&HasherConfig::test())
            .with_cancellation(token)
            .verify(&[sums], Arc::new(NullProvider))
            .await
            .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.entries[0].status, VerificationStatus::NotChecked);
    }
}
