//! Error types for the SimpleHasher core library
//!
//! Errors are grouped by origin so callers can decide what is recoverable:
//! per-file I/O failures are folded into a batch's error log, validation
//! failures reject a single input, and internal errors indicate a bug.

use thiserror::Error;

pub mod internal;
pub mod io;
pub mod validation;

pub use self::io::{IoError, IoErrorKind};
pub use self::validation::ValidationError;
pub use internal::InternalError;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the SimpleHasher core library
///
/// - I/O errors: opening or reading files and checksum files
/// - Validation errors: unknown algorithms, bad configuration, malformed
///   checksum files
/// - Internal errors: broken invariants inside the library
#[derive(Error, Debug)]
pub enum Error {
    /// I/O related errors
    #[error(transparent)]
    Io(#[from] IoError),

    /// Validation related errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Internal library errors
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Io(IoError::from_std(source))
    }
}

impl Error {
    /// Whether the error only affects the current file, so the caller can
    /// record it and carry on with the rest
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            Error::Io(_)
                | Error::Validation(
                    ValidationError::MalformedChecksumLine { .. }
                        | ValidationError::UnrecognizedChecksumFile { .. }
                )
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;
    use std::io;
    use std::path::Path;

    #[test]
    fn test_file_not_found_error_creation() {
        let path = Path::new("/non/existent/file.iso");
        let error = Error::Io(IoError::file_not_found(path));

        match error {
            Error::Io(io_err) => {
                assert_eq!(io_err.kind, IoErrorKind::FileNotFound);
                assert_eq!(io_err.path, Some(path.to_path_buf()));
            }
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();

        match error {
            Error::Io(io_err) => assert_eq!(io_err.kind, IoErrorKind::FileNotFound),
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_unknown_algorithm_error() {
        let error = Error::Validation(ValidationError::unknown_algorithm("whirlpool"));
        assert!(error.to_string().contains("whirlpool"));
        assert!(!error.is_per_file());
    }

    #[test]
    fn test_per_file_classification() {
        let io_error = Error::Io(IoError::file_not_found(Path::new("a.bin")));
        assert!(io_error.is_per_file());

        let malformed = Error::Validation(ValidationError::malformed_checksum_line(
            Path::new("MD5SUMS.txt"),
            3,
            "missing separator",
        ));
        assert!(malformed.is_per_file());

        let unnamed = Error::Validation(ValidationError::unrecognized_checksum_file(Path::new(
            "notes.txt",
        )));
        assert!(unnamed.is_per_file());

        let internal = Error::Internal(InternalError::assertion("pool closed"));
        assert!(!internal.is_per_file());
    }

    #[test]
    fn test_error_source_chain() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "Access denied");
        let error = Error::Io(IoError::from_std(io_error).with_path(Path::new("/x")));
        assert!(error.source().is_some());
        assert_eq!(error.to_string(), "Permission denied for file: /x");
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_file_errors_include_path_context() {
        let path = std::path::PathBuf::from("/data/archives/backup 2024-01-01.tar");

        let error = Error::Io(IoError::file_not_found(&path));
        assert!(error.to_string().contains("backup 2024-01-01.tar"));

        let io_error = io::Error::other("device not ready");
        let error = Error::Io(IoError::from_std(io_error).with_path(&path));
        assert!(error.to_string().contains("backup 2024-01-01.tar"));
        assert!(error.to_string().contains("device not ready"));
    }
}
