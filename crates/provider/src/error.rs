//! Provider Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A provider error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for provider operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Upstream unreachable (DNS, refused connection, reset mid-body).
    #[display("transport error: {_0}")]
    Transport(#[error(not(source))] String),
    /// Upstream did not answer within the configured timeout.
    #[display("request timed out")]
    Timeout,
    /// Upstream answered with an unexpected status.
    #[display("unexpected status {_0}")]
    Protocol(#[error(not(source))] u16),
    /// Upstream answered, but the document is missing its primary container
    /// or the payload could not be decoded.
    #[display("malformed source")]
    MalformedSource,
    /// A page key that the provider's key scheme cannot interpret.
    #[display("invalid page key: {_0}")]
    InvalidKey(#[error(not(source))] String),
    /// A category name that doesn't correspond to any known category.
    #[display("unknown category: {_0}")]
    UnknownCategory(#[error(not(source))] String),
    /// Provider client could not be constructed.
    #[display("invalid provider configuration: {_0}")]
    Configuration(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout | Self::MalformedSource => true,
            Self::Protocol(status) => *status == 429 || *status >= 500,
            Self::InvalidKey(_) | Self::UnknownCategory(_) | Self::Configuration(_) => false,
        }
    }
}
