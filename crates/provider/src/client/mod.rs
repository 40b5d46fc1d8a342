//! Provider trait and the HTTP-backed implementations.
//!
//! This module defines the [`Provider`] trait, which gives the
//! synchronization engine one uniform fetch contract over providers with
//! wildly different URL layouts, markup and pagination.

mod dm5;
mod http;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod readmanga;
mod senmanga;

pub use self::dm5::Dm5;
pub use self::http::{HttpClient, HttpOptions};
#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockProvider;
pub use self::readmanga::ReadManga;
pub use self::senmanga::SenManga;
use crate::category::{Category, CategoryKind};
use crate::error::{ErrorKind, Result};
use crate::key::{KeyScheme, PageKey};
use crate::page::Page;
use async_trait::async_trait;
use exn::{OptionExt, ResultExt};
use folio_extract::Extractor;
use folio_extract::models::{ProviderId, Record, RecordKind};
use std::sync::Arc;

/// Shared, type-erased provider.
pub type ProviderHandle = Arc<dyn Provider>;

/// Uniform interface over upstream providers.
///
/// One call is one network round trip. Implementations must not retry,
/// cache, or paper over faults: those are surfaced as errors so the caller
/// can leave its cache untouched.
///
/// # Examples
///
/// ```
/// use folio_provider::{Category, Provider};
/// use folio_provider::error::Result;
///
/// async fn first_page_size(provider: &dyn Provider) -> Result<usize> {
///     let key = provider.key_scheme().starting_key();
///     let page = provider.fetch(&Category::Recent, &key).await?;
///     Ok(page.len())
/// }
/// ```
#[async_trait]
pub trait Provider: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Pagination scheme used for every category of this provider.
    fn key_scheme(&self) -> KeyScheme;

    /// Categories (tabs) this provider offers.
    fn categories(&self) -> &[CategoryKind];

    fn supports(&self, category: &Category) -> bool {
        self.categories().contains(&category.kind())
    }

    /// Fetch one page of a category.
    ///
    /// Unsupported categories return an [empty page](Page::empty) rather than
    /// an error.
    async fn fetch(&self, category: &Category, key: &PageKey) -> Result<Page>;

    /// Fetch non-paginated detail records (overview, chapters, pages,
    /// authors, genres) for the content at `link`.
    ///
    /// Unsupported kinds return no records.
    async fn lookup(&self, kind: RecordKind, link: &str) -> Result<Vec<Record>>;
}

/// Construct the HTTP client for `id`.
pub fn connect(id: ProviderId, options: &HttpOptions) -> Result<ProviderHandle> {
    let http = HttpClient::new(options)?;
    Ok(match id {
        ProviderId::ReadManga => Arc::new(ReadManga::new(http)),
        ProviderId::SenManga => Arc::new(SenManga::new(http)),
        ProviderId::Dm5 => Arc::new(Dm5::new(http, options.page_size)),
    })
}

/// Page number for numbered schemes.
fn page_number(key: &PageKey) -> Result<u32> {
    key.as_number().ok_or_raise(|| ErrorKind::InvalidKey(key.to_string()))
}

/// Run the extraction layer over a fetched document.
///
/// Kept synchronous so the (non-`Send`) parsed document never lives across an
/// await point.
fn parse(provider: ProviderId, origin: &str, html: &str, kind: RecordKind) -> Result<Vec<Record>> {
    Extractor::from_html(provider, html)
        .with_origin(origin)
        .records(kind)
        .or_raise(|| ErrorKind::MalformedSource)
}

/// GET `link` and extract `kind` records from it.
async fn scrape(http: &HttpClient, provider: ProviderId, link: &str, kind: RecordKind) -> Result<Vec<Record>> {
    if !folio_extract::supports(provider, kind) {
        return Ok(Vec::new());
    }
    let url = http.url(link);
    let html = http.get(&url, &[]).await?;
    parse(provider, &url, &html, kind)
}
