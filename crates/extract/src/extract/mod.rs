//! Per-provider extraction of typed records from raw markup.

mod dm5;
mod readmanga;
mod senmanga;

use exn::OptionExt;
use scraper::{ElementRef, Html, Selector};
use tracing::instrument;

use crate::consts;
use crate::error::{ErrorKind, Result};
use crate::models::{ProviderId, Record, RecordKind};

/// A provider's markup dialect: knows where each kind of record lives in
/// that provider's documents.
///
/// Implementations must be pure. Missing optional fields fall back to
/// defaults, records missing their link are skipped, and only a missing
/// primary container is reported (as [`ErrorKind::MalformedSource`]).
pub(crate) trait Dialect: Send + Sync {
    fn supports(&self, kind: RecordKind) -> bool;
    fn extract(&self, document: &Html, origin: &str, kind: RecordKind) -> Result<Vec<Record>>;
}

fn dialect(provider: ProviderId) -> &'static dyn Dialect {
    match provider {
        ProviderId::ReadManga => &readmanga::ReadManga,
        ProviderId::SenManga => &senmanga::SenManga,
        ProviderId::Dm5 => &dm5::Dm5,
    }
}

/// Returns `true` if the provider's extractor knows how to produce the given
/// record kind.
pub fn supports(provider: ProviderId, kind: RecordKind) -> bool {
    dialect(provider).supports(kind)
}

#[derive(Debug)]
pub struct Extractor {
    provider: ProviderId,
    document: Html,
    origin: String,
}
impl Extractor {
    pub fn from_document(provider: ProviderId, document: Html) -> Self {
        Self { provider, document, origin: String::new() }
    }

    pub fn from_html(provider: ProviderId, html: &str) -> Self {
        Self::from_document(provider, Html::parse_document(html))
    }

    /// The URL the document was fetched from. Records that describe the
    /// document itself (an overview) use it as their identity.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    /// Extracts every record of the given kind, in document order.
    ///
    /// Kinds the provider doesn't support yield an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::MalformedSource`] if the document lacks the
    /// container the requested kind is anchored on. A present container with
    /// zero items is *not* an error.
    #[instrument(skip(self), fields(provider = %self.provider, records))]
    pub fn records(&self, kind: RecordKind) -> Result<Vec<Record>> {
        let dialect = dialect(self.provider);
        if !dialect.supports(kind) {
            tracing::debug!(%kind, "record kind not supported by provider");
            return Ok(Vec::new());
        }
        let records = dialect.extract(&self.document, &self.origin, kind)?;
        tracing::Span::current().record("records", records.len());
        Ok(records)
    }
}

/// Finds the primary container a record kind is anchored on.
pub(crate) fn require<'a>(document: &'a Html, selector: &Selector, anchor: &'static str) -> Result<ElementRef<'a>> {
    document.select(selector).next().ok_or_raise(|| ErrorKind::MalformedSource(anchor))
}

/// Whitespace-collapsed text content of an element and its descendants.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

/// Text of the first descendant matching `selector`, or an empty string.
pub(crate) fn text(element: ElementRef<'_>, selector: &Selector) -> String {
    element.select(selector).next().map(element_text).unwrap_or_default()
}

/// Text nodes that are direct children of the first descendant matching
/// `selector`, ignoring any nested elements (labels, icons).
pub(crate) fn own_text(element: ElementRef<'_>, selector: &Selector) -> String {
    let Some(found) = element.select(selector).next() else {
        return String::new();
    };
    found
        .children()
        .filter_map(|node| node.value().as_text().map(|text| text.text.to_string()))
        .flat_map(|text| text.split_whitespace().map(str::to_string).collect::<Vec<_>>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// First non-empty value of `name` on descendants matching `selector`.
pub(crate) fn attr(element: ElementRef<'_>, selector: &Selector, name: &str) -> Option<String> {
    element
        .select(selector)
        .filter_map(|el| el.value().attr(name))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Image source, preferring lazy-loading attributes over the placeholder
/// that usually sits in `src`.
pub(crate) fn image_source(image: ElementRef<'_>) -> Option<String> {
    ["data-src", "data-original", "src"]
        .iter()
        .filter_map(|name| image.value().attr(name))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// First image source below `element`.
pub(crate) fn first_image(element: ElementRef<'_>) -> Option<String> {
    element.select(&consts::IMAGE).find_map(image_source)
}

/// Parses the first (possibly comma-grouped) number in `text`.
pub(crate) fn count(text: &str) -> Option<u64> {
    consts::DIGITS_REGEX.captures(text)?.get(1)?.as_str().replace(',', "").parse().ok()
}

/// Extracts the URL from an inline `background-image: url(...)` style.
pub(crate) fn background_url(style: &str) -> Option<String> {
    Some(consts::BACKGROUND_URL_REGEX.captures(style)?.get(1)?.as_str().trim().to_string())
}

/// Chapter ordinal for a provider that lists chapters newest first.
///
/// The markup position is inverted (`size - (index + 1)`) so that the
/// earliest chapter always sits at the start, then made one-based.
pub(crate) fn inverted_ordinal(size: usize, index: usize) -> f64 {
    (size - (index + 1) + 1) as f64
}

pub(crate) fn skip(kind: RecordKind, index: usize, reason: &'static str) {
    tracing::debug!(%kind, index, reason, "skipping malformed record");
}
