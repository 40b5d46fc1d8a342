use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use super::sanitize;
use crate::error::{Error, ErrorKind};

/// The kind of record an extractor is asked to produce from a document.
///
/// A provider need not support every kind; asking for an unsupported kind
/// yields no records rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Entries on a browsing page (recently updated, trending, by genre, ...).
    Listing,
    /// Entries on a search results page.
    SearchHits,
    /// The detail page of a single title.
    Overview,
    /// The chapter index of a single title.
    Chapters,
    /// The page images of a single chapter.
    Pages,
    /// Credited authors of a single title.
    Authors,
    /// Genres/tags of a single title.
    Genres,
}
impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Listing => "listing",
            RecordKind::SearchHits => "search",
            RecordKind::Overview => "overview",
            RecordKind::Chapters => "chapters",
            RecordKind::Pages => "pages",
            RecordKind::Authors => "authors",
            RecordKind::Genres => "genres",
        }
    }
}
impl FromStr for RecordKind {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match sanitize(s).as_str() {
            "listing" | "listings" => RecordKind::Listing,
            "search" | "searchhits" => RecordKind::SearchHits,
            "overview" => RecordKind::Overview,
            "chapters" | "chapter" => RecordKind::Chapters,
            "pages" | "page" => RecordKind::Pages,
            "authors" | "author" => RecordKind::Authors,
            "genres" | "genre" | "tags" => RecordKind::Genres,
            _ => exn::bail!(ErrorKind::UnknownKind(s.to_string())),
        })
    }
}
impl Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
