use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use exn::bail;

use crate::error::{Error, ErrorKind, Result};
use folio_extract::models::RecordKind;

/// A logical, paginated content category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Recent,
    Trending,
    Genre(String),
    Author(String),
    Search(String),
}

/// [`Category`] without its query parameter; what a provider advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CategoryKind {
    Recent,
    Trending,
    Genre,
    Author,
    Search,
}

impl Category {
    /// Build a category from its name and (for parameterised categories) its
    /// query text.
    pub fn from_parts(kind: CategoryKind, query: impl Into<String>) -> Result<Self> {
        let query = query.into();
        let needs_query = !matches!(kind, CategoryKind::Recent | CategoryKind::Trending);
        if needs_query && query.trim().is_empty() {
            bail!(ErrorKind::UnknownCategory(format!("{kind} requires a query")));
        }
        Ok(match kind {
            CategoryKind::Recent => Self::Recent,
            CategoryKind::Trending => Self::Trending,
            CategoryKind::Genre => Self::Genre(query),
            CategoryKind::Author => Self::Author(query),
            CategoryKind::Search => Self::Search(query),
        })
    }

    pub fn kind(&self) -> CategoryKind {
        match self {
            Self::Recent => CategoryKind::Recent,
            Self::Trending => CategoryKind::Trending,
            Self::Genre(_) => CategoryKind::Genre,
            Self::Author(_) => CategoryKind::Author,
            Self::Search(_) => CategoryKind::Search,
        }
    }

    /// Query text; empty for unparameterised categories.
    pub fn query(&self) -> &str {
        match self {
            Self::Recent | Self::Trending => "",
            Self::Genre(query) | Self::Author(query) | Self::Search(query) => query,
        }
    }

    /// The record kind that pages of this category hold.
    pub fn record_kind(&self) -> RecordKind {
        match self {
            Self::Recent | Self::Trending | Self::Genre(_) => RecordKind::Listing,
            Self::Author(_) | Self::Search(_) => RecordKind::SearchHits,
        }
    }
}
impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Recent | Self::Trending => write!(f, "{}", self.kind()),
            _ => write!(f, "{}:{}", self.kind(), self.query()),
        }
    }
}

impl CategoryKind {
    pub const ALL: [CategoryKind; 5] = [Self::Recent, Self::Trending, Self::Genre, Self::Author, Self::Search];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recent => "recent",
            Self::Trending => "trending",
            Self::Genre => "genre",
            Self::Author => "author",
            Self::Search => "search",
        }
    }
}
impl Display for CategoryKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
impl FromStr for CategoryKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_ascii_lowercase();
        match needle.as_str() {
            "recent" | "latest" => Ok(Self::Recent),
            "trending" | "popular" => Ok(Self::Trending),
            "genre" => Ok(Self::Genre),
            "author" => Ok(Self::Author),
            "search" => Ok(Self::Search),
            _ => bail!(ErrorKind::UnknownCategory(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("recent", CategoryKind::Recent)]
    #[case(" Latest ", CategoryKind::Recent)]
    #[case("popular", CategoryKind::Trending)]
    #[case("GENRE", CategoryKind::Genre)]
    #[case("search", CategoryKind::Search)]
    fn test_kind_from_str(#[case] input: &str, #[case] expected: CategoryKind) {
        assert_eq!(input.parse::<CategoryKind>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_kind() {
        let err = "bookmarks".parse::<CategoryKind>().unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnknownCategory(name) if name == "bookmarks"));
    }

    #[test]
    fn test_from_parts_requires_query() {
        assert_eq!(Category::from_parts(CategoryKind::Recent, "").unwrap(), Category::Recent);
        assert_eq!(
            Category::from_parts(CategoryKind::Genre, "action").unwrap(),
            Category::Genre("action".into())
        );
        assert!(Category::from_parts(CategoryKind::Search, "  ").is_err());
    }

    #[test]
    fn test_display_and_record_kind() {
        assert_eq!(Category::Trending.to_string(), "trending");
        assert_eq!(Category::Search("one piece".into()).to_string(), "search:one piece");
        assert_eq!(Category::Genre("x".into()).record_kind(), RecordKind::Listing);
        assert_eq!(Category::Author("x".into()).record_kind(), RecordKind::SearchHits);
    }
}
