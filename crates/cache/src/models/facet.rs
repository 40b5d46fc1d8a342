use folio_extract::models::{Details, RecordKind};

/// Compact JSON form of [`Details`].
///
/// The variant is stored in its own `kind` column, so the proxy is a flat
/// bag of optional fields; each variant only writes the ones it has.
#[derive(facet::Facet, Default)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub(crate) struct DetailsProxy {
    #[facet(rename = "c", default, transparent, skip_serializing_if = Option::is_none)]
    latest_chapter: Option<String>,
    #[facet(rename = "v", default, transparent, skip_serializing_if = Option::is_none)]
    view_count: Option<u64>,
    #[facet(rename = "a", default, transparent, skip_serializing_if = Option::is_none)]
    author: Option<String>,
    #[facet(rename = "alt", default, transparent, skip_serializing_if = Option::is_none)]
    alternative_title: Option<String>,
    #[facet(rename = "s", default, transparent, skip_serializing_if = Option::is_none)]
    summary: Option<String>,
    #[facet(rename = "st", default, transparent, skip_serializing_if = Option::is_none)]
    status: Option<String>,
    #[facet(rename = "n", default, transparent, skip_serializing_if = Option::is_none)]
    number: Option<f64>,
    #[facet(rename = "p", default, transparent, skip_serializing_if = Option::is_none)]
    page: Option<u32>,
    #[facet(rename = "d", default, transparent, skip_serializing_if = Option::is_none)]
    date: Option<String>,
}
impl From<&Details> for DetailsProxy {
    fn from(details: &Details) -> Self {
        match details {
            Details::Listing { latest_chapter, view_count } => Self {
                latest_chapter: Some(latest_chapter.clone()),
                view_count: *view_count,
                ..Self::default()
            },
            Details::SearchHit { latest_chapter, author } => Self {
                latest_chapter: Some(latest_chapter.clone()),
                author: author.clone(),
                ..Self::default()
            },
            Details::Overview { alternative_title, summary, status } => Self {
                alternative_title: Some(alternative_title.clone()),
                summary: Some(summary.clone()),
                status: Some(status.clone()),
                ..Self::default()
            },
            Details::Chapter { number, date } => Self {
                number: Some(*number),
                date: Some(date.clone()),
                ..Self::default()
            },
            Details::Page { number } => Self {
                page: Some(*number),
                ..Self::default()
            },
            Details::Author | Details::Genre => Self::default(),
        }
    }
}
impl DetailsProxy {
    /// Rebuild the details of a record of `kind`, defaulting missing fields.
    pub(crate) fn into_details(self, kind: RecordKind) -> Details {
        match kind {
            RecordKind::Listing => Details::Listing {
                latest_chapter: self.latest_chapter.unwrap_or_default(),
                view_count: self.view_count,
            },
            RecordKind::SearchHits => Details::SearchHit {
                latest_chapter: self.latest_chapter.unwrap_or_default(),
                author: self.author,
            },
            RecordKind::Overview => Details::Overview {
                alternative_title: self.alternative_title.unwrap_or_default(),
                summary: self.summary.unwrap_or_default(),
                status: self.status.unwrap_or_default(),
            },
            RecordKind::Chapters => Details::Chapter {
                number: self.number.unwrap_or_default(),
                date: self.date.unwrap_or_default(),
            },
            RecordKind::Pages => Details::Page {
                number: self.page.unwrap_or_default(),
            },
            RecordKind::Authors => Details::Author,
            RecordKind::Genres => Details::Genre,
        }
    }
}
