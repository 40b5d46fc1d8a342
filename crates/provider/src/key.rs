use std::fmt::{Display, Formatter, Result as FmtResult};

use tracing::warn;

use crate::page::Page;

/// An opaque, provider-defined page key.
///
/// Numbered schemes store the decimal page number, token schemes store
/// whatever continuation token the upstream handed out. The engine only ever
/// compares keys for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageKey(String);

impl PageKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interpret the key as a page number, if it is one.
    pub fn as_number(&self) -> Option<u32> {
        self.0.parse().ok()
    }
}
impl From<u32> for PageKey {
    fn from(number: u32) -> Self {
        Self(number.to_string())
    }
}
impl From<&str> for PageKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}
impl From<String> for PageKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}
impl Display for PageKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// The pair of keys attached to a committed page.
///
/// `next == None` is the authoritative "no more data" signal; `previous ==
/// None` means there is no earlier page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor {
    pub previous: Option<PageKey>,
    pub next: Option<PageKey>,
}

impl Cursor {
    pub fn new(previous: Option<PageKey>, next: Option<PageKey>) -> Self {
        Self { previous, next }
    }
}

/// How a provider paginates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyScheme {
    /// Plain page numbers counting up from `start`.
    Numbered { start: u32 },
    /// Opaque continuation tokens. The first page is requested with `start`;
    /// every fetched [`Page`] carries the tokens for its neighbours.
    Token { start: PageKey },
}

impl KeyScheme {
    pub fn starting_key(&self) -> PageKey {
        match self {
            Self::Numbered { start } => PageKey::from(*start),
            Self::Token { start } => start.clone(),
        }
    }

    pub fn is_start(&self, key: &PageKey) -> bool {
        *key == self.starting_key()
    }

    /// Key of the page before `key`, or `None` if `key` is the first page.
    pub fn predecessor(&self, key: &PageKey, page: &Page) -> Option<PageKey> {
        if self.is_start(key) {
            return None;
        }
        match self {
            Self::Numbered { start } => match key.as_number() {
                Some(number) if number > *start => Some(PageKey::from(number - 1)),
                Some(_) => None,
                None => {
                    warn!(%key, "non-numeric key under a numbered scheme");
                    None
                },
            },
            Self::Token { .. } => page.previous.clone(),
        }
    }

    /// Key of the page after `key`, or `None` if the upstream says there
    /// isn't one.
    pub fn successor(&self, key: &PageKey, page: &Page) -> Option<PageKey> {
        match self {
            Self::Numbered { .. } => match key.as_number() {
                Some(number) => number.checked_add(1).map(PageKey::from),
                None => {
                    warn!(%key, "non-numeric key under a numbered scheme");
                    None
                },
            },
            Self::Token { .. } => page.next.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, "1", None, Some("2"))]
    #[case(1, "2", Some("1"), Some("3"))]
    #[case(0, "0", None, Some("1"))]
    #[case(0, "7", Some("6"), Some("8"))]
    fn test_numbered_neighbours(
        #[case] start: u32,
        #[case] key: &str,
        #[case] previous: Option<&str>,
        #[case] next: Option<&str>,
    ) {
        let scheme = KeyScheme::Numbered { start };
        let key = PageKey::from(key);
        let page = Page::default();
        assert_eq!(scheme.predecessor(&key, &page), previous.map(PageKey::from));
        assert_eq!(scheme.successor(&key, &page), next.map(PageKey::from));
    }

    #[test]
    fn test_numbered_ignores_page_tokens() {
        let scheme = KeyScheme::Numbered { start: 1 };
        let page = Page::default().with_tokens(Some("x".into()), Some("y".into()));
        assert_eq!(scheme.successor(&PageKey::from(4), &page), Some(PageKey::from(5)));
        assert_eq!(scheme.predecessor(&PageKey::from(4), &page), Some(PageKey::from(3)));
    }

    #[test]
    fn test_numbered_rejects_garbage_keys() {
        let scheme = KeyScheme::Numbered { start: 1 };
        let page = Page::default();
        assert_eq!(scheme.successor(&PageKey::from("abc"), &page), None);
        assert_eq!(scheme.predecessor(&PageKey::from("abc"), &page), None);
    }

    #[test]
    fn test_token_scheme_reads_page() {
        let scheme = KeyScheme::Token { start: PageKey::from("") };
        assert_eq!(scheme.starting_key(), PageKey::from(""));

        let first = Page::default().with_tokens(Some("ignored".into()), Some("c2".into()));
        // The starting page never has a predecessor, whatever upstream says.
        assert_eq!(scheme.predecessor(&PageKey::from(""), &first), None);
        assert_eq!(scheme.successor(&PageKey::from(""), &first), Some(PageKey::from("c2")));

        let last = Page::default().with_tokens(Some("c1".into()), None);
        assert_eq!(scheme.predecessor(&PageKey::from("c2"), &last), Some(PageKey::from("c1")));
        assert_eq!(scheme.successor(&PageKey::from("c2"), &last), None);
    }
}
