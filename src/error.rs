//! Error types for Restie operations.
//!
//! This module defines every failure a request, a plugin or the client itself can
//! report. The [`Result`] type alias provides a convenient shorthand for operations
//! that may fail.
//!
//! # Error Categories
//!
//! | Category | Variants | Status code |
//! |----------|----------|-------------|
//! | Transport | `Transport` | 0 |
//! | HTTP status | `Status` | the response status |
//! | Configuration | `Config` | 0 |
//! | Rate limiting | `QueueOverflow` | 0 |
//! | Serialization | `Json`, `InvalidUtf8` | 0 |
//! | Immutability | `Immutable` | 0 |
//!
//! Errors are `Clone` because a single de-duplicated request hands the very same
//! failure to every caller that joined it.
//!
//! # Examples
//!
//! ```
//! use restie::RestieError;
//!
//! let err = RestieError::Transport("connection refused".into());
//! assert_eq!(err.status_code(), 0);
//! assert!(err.response().is_none());
//! ```

use crate::types::RestieResponse;
use thiserror::Error;

/// Result type for Restie operations.
///
/// Provides a convenient shorthand for `Result<T, RestieError>`.
pub type Result<T> = std::result::Result<T, RestieError>;

/// Errors that can occur while building or executing Restie requests.
///
/// # Examples
///
/// ```
/// use restie::RestieError;
///
/// fn describe(err: &RestieError) -> String {
///     match err {
///         RestieError::Status { status, .. } if *status == 404 => "missing".to_string(),
///         RestieError::Transport(_) => "offline".to_string(),
///         other => other.to_string(),
///     }
/// }
///
/// assert_eq!(describe(&RestieError::Transport("dns".into())), "offline");
/// ```
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum RestieError {
    /// No HTTP response could be obtained (connection, DNS, timeout...).
    #[error("Transport error: {0}")]
    Transport(String),

    /// A response was received but its status falls outside `[200, 300)`.
    ///
    /// The shaped response is attached so callers can inspect the body the
    /// server sent along with the failure.
    #[error("{message}")]
    Status {
        /// Numeric HTTP status.
        status: u16,
        /// Reason phrase of the status (e.g. `Not Found`).
        message: String,
        /// The shaped response.
        response: Box<RestieResponse>,
    },

    /// Programmer misuse detected at construction or registration time.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The rate limiter queue reached its hard limit.
    #[error("Limit reached in queued requests ({limit})")]
    QueueOverflow {
        /// The configured queue limit.
        limit: usize,
    },

    /// JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// A response body declared as text was not valid UTF-8.
    #[error("Invalid UTF-8: {0}")]
    InvalidUtf8(String),

    /// Attempted to mutate the data of a frozen result.
    #[error("Response is immutable")]
    Immutable,
}

impl From<serde_json::Error> for RestieError {
    fn from(err: serde_json::Error) -> Self {
        RestieError::Json(err.to_string())
    }
}

impl RestieError {
    /// Numeric status attached to the error.
    ///
    /// Returns the HTTP status for [`RestieError::Status`] and `0` for every
    /// failure where no response was obtained.
    #[inline]
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            RestieError::Status { status, .. } => *status,
            _ => 0,
        }
    }

    /// The shaped response, when the server answered.
    #[must_use]
    pub fn response(&self) -> Option<&RestieResponse> {
        match self {
            RestieError::Status { response, .. } => Some(response),
            _ => None,
        }
    }

    /// Whether the failure happened before any response was received.
    #[inline]
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, RestieError::Transport(_))
    }

    /// Whether the server answered with a non-success status.
    #[inline]
    #[must_use]
    pub fn is_status(&self) -> bool {
        matches!(self, RestieError::Status { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_has_zero_status() {
        let err = RestieError::Transport("connection reset".into());
        assert_eq!(err.status_code(), 0);
        assert!(err.is_transport());
        assert!(!err.is_status());
        assert!(err.response().is_none());
    }

    #[test]
    fn test_queue_overflow_display() {
        let err = RestieError::QueueOverflow { limit: 3 };
        assert!(err.to_string().contains("Limit reached"));
        assert_eq!(err.status_code(), 0);
    }

    #[test]
    fn test_json_conversion() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: RestieError = parse_err.into();
        assert!(matches!(err, RestieError::Json(_)));
    }

    #[test]
    fn test_config_display() {
        let err = RestieError::Config("bucket size must be positive".into());
        assert!(err.to_string().contains("bucket size"));
    }
}
