//! Batch outcomes: the results map and the final report

use crate::hashing::HashAlgorithm;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Rendered digests keyed by file, then algorithm.
///
/// Entries are write-once: inserting an existing (file, algorithm) key is
/// refused and leaves the stored digest untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DigestResults {
    files: BTreeMap<PathBuf, BTreeMap<HashAlgorithm, String>>,
}

impl DigestResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a digest; returns `false` if one was already recorded
    pub fn insert(
        &mut self,
        path: impl Into<PathBuf>,
        algorithm: HashAlgorithm,
        digest: impl Into<String>,
    ) -> bool {
        match self.files.entry(path.into()).or_default().entry(algorithm) {
            Entry::Vacant(slot) => {
                slot.insert(digest.into());
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn get(&self, path: &Path, algorithm: HashAlgorithm) -> Option<&str> {
        self.files
            .get(path)
            .and_then(|digests| digests.get(&algorithm))
            .map(String::as_str)
    }

    pub fn contains(&self, path: &Path, algorithm: HashAlgorithm) -> bool {
        self.get(path, algorithm).is_some()
    }

    /// All digests computed for one file
    pub fn for_file(&self, path: &Path) -> Option<&BTreeMap<HashAlgorithm, String>> {
        self.files.get(path)
    }

    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    /// Every (file, algorithm, digest) triple in path order
    pub fn iter(&self) -> impl Iterator<Item = (&Path, HashAlgorithm, &str)> {
        self.files.iter().flat_map(|(path, digests)| {
            digests
                .iter()
                .map(move |(algorithm, digest)| (path.as_path(), *algorithm, digest.as_str()))
        })
    }

    /// Digests of one algorithm across all files
    pub fn by_algorithm(&self, algorithm: HashAlgorithm) -> Vec<(&Path, &str)> {
        self.files
            .iter()
            .filter_map(|(path, digests)| {
                digests
                    .get(&algorithm)
                    .map(|digest| (path.as_path(), digest.as_str()))
            })
            .collect()
    }

    /// Algorithms present for at least one file, in display order
    pub fn algorithms(&self) -> Vec<HashAlgorithm> {
        HashAlgorithm::ALL
            .into_iter()
            .filter(|algorithm| self.files.values().any(|d| d.contains_key(algorithm)))
            .collect()
    }

    /// Fold `other` in, keeping existing entries. Returns how many were added.
    pub fn merge(&mut self, other: DigestResults) -> usize {
        let mut added = 0;
        for (path, digests) in other.files {
            for (algorithm, digest) in digests {
                if self.insert(path.clone(), algorithm, digest) {
                    added += 1;
                }
            }
        }
        added
    }

    /// Number of (file, algorithm) entries
    pub fn len(&self) -> usize {
        self.files.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything a finished batch produced
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Digests of every task that completed
    pub results: DigestResults,
    /// First error message per file that could not be processed
    pub errors: BTreeMap<PathBuf, String>,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub failed_tasks: usize,
    /// Whether the batch's cancellation token fired
    pub cancelled: bool,
    /// Highest number of tasks observed running at once
    pub peak_concurrency: usize,
    pub elapsed: Duration,
}

impl BatchReport {
    /// True when every task produced a digest
    pub fn is_complete(&self) -> bool {
        self.completed_tasks == self.total_tasks
    }

    /// Tasks that neither completed nor failed
    pub fn skipped_tasks(&self) -> usize {
        self.total_tasks - self.completed_tasks - self.failed_tasks
    }

    /// One aggregated notice listing every failed file, or `None`
    pub fn error_summary(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }
        let mut summary = format!("{} file(s) could not be processed:\n", self.errors.len());
        for (path, message) in &self.errors {
            summary.push_str(&format!("{} error: {message}\n", path.display()));
        }
        Some(summary)
    }
}
