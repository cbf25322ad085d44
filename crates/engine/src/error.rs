//! Engine Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Failures from the store or the
//! network are raised as [`Storage`](ErrorKind::Storage) or
//! [`Fetch`](ErrorKind::Fetch) with the original error kept as a child frame.

use derive_more::{Display, Error};

/// An engine error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// No extension could be inferred and none was supplied; an extensionless
    /// artifact cannot be served correctly.
    #[display("no file extension could be inferred for `{_0}`; supply one explicitly")]
    MissingExtension(#[error(not(source))] String),
    /// The fetch succeeded at the transport level but carried no body.
    #[display("the server responded with an empty body")]
    EmptyResponseBody,
    /// The body was present but held zero bytes.
    #[display("the response payload is empty")]
    EmptyPayload,
    /// The locator is not an absolute URL.
    #[display("invalid locator: {_0}")]
    InvalidLocator(#[error(not(source))] String),
    /// A file name is not a single, plain path component.
    #[display("invalid file name: {_0}")]
    InvalidFileName(#[error(not(source))] String),
    /// The server answered with a non-success status.
    #[display("server responded with HTTP {_0}")]
    HttpStatus(#[error(not(source))] u16),
    /// Transport-level failure (DNS, connection, TLS, timeout, ...).
    #[display("fetch failed")]
    Fetch,
    /// Reading or writing the preload store failed.
    #[display("preload store operation failed")]
    Storage,
    /// Clearing or copying the preload store failed.
    #[display("build lifecycle step failed")]
    Lifecycle,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch | Self::Storage | Self::Lifecycle => true,
            Self::HttpStatus(code) => *code >= 500 || *code == 429,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn error_kind_display() {
        assert_eq!(
            ErrorKind::MissingExtension("https://example.com/img/photo".to_string()).to_string(),
            "no file extension could be inferred for `https://example.com/img/photo`; supply one explicitly"
        );
        assert_eq!(ErrorKind::HttpStatus(404).to_string(), "server responded with HTTP 404");
    }

    #[rstest]
    #[case(ErrorKind::Fetch, true)]
    #[case(ErrorKind::HttpStatus(503), true)]
    #[case(ErrorKind::HttpStatus(429), true)]
    #[case(ErrorKind::HttpStatus(404), false)]
    #[case(ErrorKind::EmptyPayload, false)]
    #[case(ErrorKind::MissingExtension(String::new()), false)]
    fn error_kind_retryable(#[case] kind: ErrorKind, #[case] expected: bool) {
        assert_eq!(kind.is_retryable(), expected);
    }
}
