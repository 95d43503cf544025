//! Validation related error types

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Validation and configuration errors
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Algorithm name not recognized
    #[error("Unknown hash algorithm: {name}")]
    UnknownAlgorithm { name: String },

    /// A checksum file line could not be parsed
    #[error("Malformed checksum line {line} in {}: {reason}", path.display())]
    MalformedChecksumLine {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// A checksum file whose name does not identify an algorithm
    #[error("Cannot determine algorithm from checksum file name: {}", path.display())]
    UnrecognizedChecksumFile { path: PathBuf },

    /// Invalid input parameter
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter { parameter: String, reason: String },
}

impl ValidationError {
    /// Create an unknown algorithm error
    pub fn unknown_algorithm(name: &str) -> Self {
        Self::UnknownAlgorithm {
            name: name.to_string(),
        }
    }

    /// Create a malformed checksum line error (`line` is 1-based)
    pub fn malformed_checksum_line(path: &Path, line: usize, reason: &str) -> Self {
        Self::MalformedChecksumLine {
            path: path.to_path_buf(),
            line,
            reason: reason.to_string(),
        }
    }

    /// Create an unrecognized checksum file error
    pub fn unrecognized_checksum_file(path: &Path) -> Self {
        Self::UnrecognizedChecksumFile {
            path: path.to_path_buf(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: &str, reason: &str) -> Self {
        Self::InvalidParameter {
            parameter: parameter.to_string(),
            reason: reason.to_string(),
        }
    }
}
