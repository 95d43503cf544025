//! Expands command-line paths into the files to hash
//!
//! Plain file arguments pass through untouched, even when they do not exist,
//! so the scheduler can report them in its per-file error log. Directories
//! are walked with `walkdir`.

mod walker;

pub use walker::{FileDiscoveryOptions, discover};

use std::path::PathBuf;

/// Result of file discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Path to the discovered file
    pub path: PathBuf,
    /// Size of the file in bytes, `0` when unknown
    pub size: u64,
}

/// Error type for file discovery operations
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("{0} is a directory (use --recursive to hash its contents)")]
    Directory(PathBuf),
}

/// Result type for file discovery operations
pub type Result<T> = std::result::Result<T, DiscoveryError>;
