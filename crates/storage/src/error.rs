//! Storage Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A storage error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// No artifact is stored under this name
    #[display("artifact not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// Access denied (permissions)
    #[display("permission denied: {_0}")]
    PermissionDenied(#[error(not(source))] String),
    /// Underlying I/O error
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// Not a bare file name
    #[display("invalid artifact name: {_0:?}")]
    InvalidName(#[error(not(source))] String),
    /// Store root is relative, or exists but is not a directory
    #[display("invalid store root: {}", _0.display())]
    InvalidRoot(#[error(not(source))] PathBuf),
}
impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::NotFound("photo-abc.png".to_string()).to_string(), "artifact not found: photo-abc.png");
        assert_eq!(ErrorKind::InvalidName("../x".to_string()).to_string(), "invalid artifact name: \"../x\"");
        assert_eq!(ErrorKind::InvalidRoot(PathBuf::from("relative")).to_string(), "invalid store root: relative");
    }

    #[test]
    fn error_kind_retryable() {
        assert!(!ErrorKind::NotFound("a.png".to_string()).is_retryable());
        assert!(!ErrorKind::InvalidName("../a.png".to_string()).is_retryable());
        assert!(ErrorKind::Io(IoError::other("disk on fire")).is_retryable());
    }
}
