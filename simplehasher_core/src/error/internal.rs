//! Internal library error types

use thiserror::Error;

/// Internal library errors
#[derive(Error, Debug)]
pub enum InternalError {
    /// A worker terminated abnormally
    #[error("Worker for '{task}' failed: {message}")]
    WorkerFailed { task: String, message: String },

    /// Internal assertion failure
    #[error("Internal assertion failed: {message}")]
    Assertion { message: String },
}

impl InternalError {
    /// Create a worker failure error
    pub fn worker_failed(task: impl Into<String>, message: impl Into<String>) -> Self {
        Self::WorkerFailed {
            task: task.into(),
            message: message.into(),
        }
    }

    /// Create an internal assertion failure error
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_failed_error() {
        let error = InternalError::worker_failed("SHA-256 of a.bin", "panicked");
        assert!(error.to_string().contains("SHA-256 of a.bin"));
        assert!(error.to_string().contains("panicked"));
    }

    #[test]
    fn test_assertion_error() {
        let error = InternalError::assertion("semaphore closed");
        assert!(error.to_string().contains("Internal assertion failed"));
    }
}
