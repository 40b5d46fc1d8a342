//! Extraction Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An extraction error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The document is present, but the container that every record of the
    /// requested kind hangs off is missing. Usually means the upstream markup
    /// changed (or an error page was served with a 200).
    #[display("malformed source: missing anchor '{_0}'")]
    MalformedSource(#[error(not(source))] &'static str),
    /// A provider tag that doesn't correspond to any known provider.
    #[display("unknown provider: {_0}")]
    UnknownProvider(#[error(not(source))] String),
    /// A record kind tag that doesn't correspond to any known kind.
    #[display("unknown record kind: {_0}")]
    UnknownKind(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Upstream markup breakage is frequently transient (maintenance
        // pages, half-deployed templates); unknown tags never are.
        matches!(self, Self::MalformedSource(_))
    }
}
