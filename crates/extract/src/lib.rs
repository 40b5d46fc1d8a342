//! Record extraction for upstream manga providers.
//!
//! Every provider renders its listings, detail pages and chapter indexes in
//! its own ad-hoc markup. This crate turns a raw document plus the
//! [`RecordKind`](models::RecordKind) the caller expects into a sequence of
//! typed [`Record`](models::Record)s, without touching the network or any
//! storage.

mod consts;
pub mod error;
mod extract;
pub mod models;

use tracing::instrument;

use crate::error::Result;
pub use crate::extract::{Extractor, supports};
use crate::models::{ProviderId, Record, RecordKind};

/// Easy, top-level entrypoint for extracting records from raw HTML.
///
/// See [`Extractor`] for documents that need an origin URL (overviews) or
/// that are queried for more than one kind of record.
#[instrument(skip(html), fields(html_size = html.len()))]
pub fn extract(provider: ProviderId, html: &str, kind: RecordKind) -> Result<Vec<Record>> {
    Extractor::from_html(provider, html).records(kind)
}
