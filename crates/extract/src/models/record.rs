use std::fmt::{Display, Formatter, Result as FmtResult};

use super::{ProviderId, RecordKind};

/// One typed unit of extracted content.
///
/// Records are immutable once extracted: fetching the same content again
/// produces a new record that replaces the old one, it never patches it.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Which provider produced the record.
    pub provider: ProviderId,
    /// Identity within the provider; the (usually absolute) link to the
    /// content the record describes.
    pub link: String,
    /// Display title/label.
    pub title: String,
    /// Media references (cover images, page images).
    pub media: Vec<String>,
    /// Kind-specific fields.
    pub details: Details,
}
impl Record {
    pub fn new(provider: ProviderId, link: impl Into<String>, title: impl Into<String>, details: Details) -> Self {
        Self {
            provider,
            link: link.into(),
            title: title.into(),
            media: Vec::new(),
            details,
        }
    }

    /// Attach a media reference, ignoring empty URLs (providers routinely
    /// render `<img src="">` placeholders).
    pub fn with_media(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        if !url.trim().is_empty() {
            self.media.push(url);
        }
        self
    }

    pub fn kind(&self) -> RecordKind {
        self.details.kind()
    }
}
impl Display for Record {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.details {
            Details::Chapter { number, .. } => write!(f, "#{number} {} <{}>", self.title, self.link),
            Details::Page { number } => write!(f, "p{number} <{}>", self.link),
            _ => write!(f, "{} <{}>", self.title, self.link),
        }
    }
}

/// Kind-specific record fields.
///
/// Fields that a provider's markup doesn't expose are filled with defaults
/// (empty strings, `None` counts) instead of failing the record.
#[derive(Debug, Clone, PartialEq)]
pub enum Details {
    Listing {
        latest_chapter: String,
        view_count: Option<u64>,
    },
    SearchHit {
        latest_chapter: String,
        author: Option<String>,
    },
    Overview {
        alternative_title: String,
        summary: String,
        status: String,
    },
    Chapter {
        /// Ordinal number; `1` is always the earliest chapter regardless of
        /// the order the provider lists them in.
        number: f64,
        date: String,
    },
    Page {
        /// One-based position within the chapter.
        number: u32,
    },
    Author,
    Genre,
}
impl Details {
    pub fn kind(&self) -> RecordKind {
        match self {
            Details::Listing { .. } => RecordKind::Listing,
            Details::SearchHit { .. } => RecordKind::SearchHits,
            Details::Overview { .. } => RecordKind::Overview,
            Details::Chapter { .. } => RecordKind::Chapters,
            Details::Page { .. } => RecordKind::Pages,
            Details::Author => RecordKind::Authors,
            Details::Genre => RecordKind::Genres,
        }
    }
}
