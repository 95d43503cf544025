//! SimpleHasher Core Library
//!
//! Self-contained message digests (MD5, SHA-1, SHA-2 family, Tiger) and a
//! bounded concurrent scheduler that computes them for many files at once,
//! plus reading and writing of `*SUMS.txt` checksum files.

pub mod error;
pub mod hashing;
pub mod progress;
pub mod scheduler;
pub mod sums;
pub mod verification;

// Re-export main types
pub use error::{Error, Result};
pub use hashing::{Digest, HashAlgorithm, HashCalculator, HashResult, StreamingHasher};
pub use progress::{ChannelProvider, NullProvider, ProgressProvider, ProgressUpdate};
pub use scheduler::{
    BatchReport, ComputationBatch, ComputationRequest, ComputationTask, DigestResults, Scheduler,
    TaskStatus, WorkerLimit,
};
pub use verification::{VerificationEntry, VerificationReport, VerificationStatus, Verifier};

use error::ValidationError;

/// Default size of a single file read, rounded down to whole blocks per task
pub const DEFAULT_READ_BUFFER_SIZE: usize = 64 * 1024;

const MIN_READ_BUFFER_SIZE: usize = 128;
const MAX_READ_BUFFER_SIZE: usize = 64 * 1024 * 1024;

/// Core hashing configuration
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HasherConfig {
    /// Maximum number of tasks running at once; `0` means one per core
    pub workers: WorkerLimit,
    /// Bytes read from a file per step
    pub read_buffer_size: usize,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            workers: WorkerLimit::SystemDefault,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }
}

impl HasherConfig {
    /// Create a test configuration
    pub fn test() -> Self {
        Self {
            workers: WorkerLimit::from_count(2),
            read_buffer_size: 1024, // small reads exercise the block loop
        }
    }

    /// Reject values the scheduler cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(MIN_READ_BUFFER_SIZE..=MAX_READ_BUFFER_SIZE).contains(&self.read_buffer_size) {
            return Err(Error::Validation(ValidationError::invalid_parameter(
                "read_buffer_size",
                &format!(
                    "must be between {MIN_READ_BUFFER_SIZE} and {MAX_READ_BUFFER_SIZE} bytes, got {}",
                    self.read_buffer_size
                ),
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        HasherConfig::default().validate().unwrap();
        HasherConfig::test().validate().unwrap();
    }

    #[test]
    fn test_read_buffer_bounds() {
        let mut config = HasherConfig {
            read_buffer_size: 64,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.read_buffer_size = MIN_READ_BUFFER_SIZE;
        assert!(config.validate().is_ok());

        config.read_buffer_size = MAX_READ_BUFFER_SIZE + 1;
        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("read_buffer_size"));
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: HasherConfig = serde_json::from_str(r#"{"workers": 3}"#).unwrap();
        assert_eq!(config.workers, WorkerLimit::from_count(3));
        assert_eq!(config.read_buffer_size, DEFAULT_READ_BUFFER_SIZE);
    }
}
