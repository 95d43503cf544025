//! Batch requests: which algorithms to compute for which files

use super::results::DigestResults;
use crate::hashing::HashAlgorithm;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Mapping of file path to the algorithms wanted for it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComputationRequest {
    files: BTreeMap<PathBuf, Vec<HashAlgorithm>>,
}

impl ComputationRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`ComputationRequest::add_file`]
    pub fn with_file(mut self, path: impl Into<PathBuf>, algorithms: &[HashAlgorithm]) -> Self {
        self.add_file(path, algorithms);
        self
    }

    /// Request `algorithms` for `path`, merging with anything already
    /// requested. Duplicates are ignored; first-seen order is kept.
    pub fn add_file(&mut self, path: impl Into<PathBuf>, algorithms: &[HashAlgorithm]) {
        if algorithms.is_empty() {
            return;
        }
        let wanted = self.files.entry(path.into()).or_default();
        for &algorithm in algorithms {
            if !wanted.contains(&algorithm) {
                wanted.push(algorithm);
            }
        }
    }

    /// Drop every (file, algorithm) pair already present in `known`, for
    /// incremental re-runs. Returns how many pairs were removed.
    pub fn skip_computed(&mut self, known: &DigestResults) -> usize {
        let mut skipped = 0;
        self.files.retain(|path, algorithms| {
            let before = algorithms.len();
            algorithms.retain(|&algorithm| !known.contains(path, algorithm));
            skipped += before - algorithms.len();
            !algorithms.is_empty()
        });
        skipped
    }

    /// Number of (file, algorithm) tasks this request produces
    pub fn task_count(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn files(&self) -> impl Iterator<Item = (&Path, &[HashAlgorithm])> {
        self.files
            .iter()
            .map(|(path, algorithms)| (path.as_path(), algorithms.as_slice()))
    }

    pub(crate) fn into_pairs(self) -> impl Iterator<Item = (PathBuf, HashAlgorithm)> {
        self.files.into_iter().flat_map(|(path, algorithms)| {
            algorithms
                .into_iter()
                .map(move |algorithm| (path.clone(), algorithm))
        })
    }
}

impl FromIterator<(PathBuf, Vec<HashAlgorithm>)> for ComputationRequest {
    fn from_iter<I: IntoIterator<Item = (PathBuf, Vec<HashAlgorithm>)>>(iter: I) -> Self {
        let mut request = Self::new();
        for (path, algorithms) in iter {
            request.add_file(path, &algorithms);
        }
        request
    }
}
