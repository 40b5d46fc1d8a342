//! Synchronization Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use folio_extract::models::ProviderId;
use folio_provider::error::{Error as ProviderError, ErrorKind as ProviderErrorKind};

/// A synchronization error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for synchronization operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The provider could not produce the page; the partition is untouched.
    #[display("fetch failed: {_0}")]
    Fetch(ProviderErrorKind),
    /// Reading or committing to the page cache failed.
    #[display("cache error")]
    Cache,
    /// The partition was cleared or refreshed while the page was being
    /// fetched; the page was discarded.
    #[display("partition changed during load")]
    Superseded,
    /// The load was cancelled before anything was committed.
    #[display("load cancelled")]
    Cancelled,
    /// No client is registered for the provider.
    #[display("provider not configured: {_0}")]
    UnknownProvider(#[error(not(source))] ProviderId),
}
impl ErrorKind {
    /// Convert a provider error into a synchronization error, preserving the
    /// provider crate's `Exn` frame (error tree) as a child in its own error
    /// tree.
    #[track_caller]
    pub fn fetch(err: ProviderError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Fetch(inner))
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch(inner) => inner.is_retryable(),
            Self::Cache | Self::Superseded | Self::Cancelled => true,
            Self::UnknownProvider(_) => false,
        }
    }
}
