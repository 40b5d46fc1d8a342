use crate::key::PageKey;
use folio_extract::models::Record;

/// One fetched page of records, in provider order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub records: Vec<Record>,
    /// Backward continuation token; only meaningful for token schemes.
    pub previous: Option<PageKey>,
    /// Forward continuation token; only meaningful for token schemes.
    pub next: Option<PageKey>,
}

impl Page {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            previous: None,
            next: None,
        }
    }

    /// An empty page; what unsupported categories and exhausted listings
    /// return.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_tokens(mut self, previous: Option<PageKey>, next: Option<PageKey>) -> Self {
        self.previous = previous;
        self.next = next;
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
