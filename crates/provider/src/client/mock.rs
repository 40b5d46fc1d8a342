//! Scripted provider for testing.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::Provider;
use crate::category::{Category, CategoryKind};
use crate::error::{ErrorKind, Result};
use crate::key::{KeyScheme, PageKey};
use crate::page::Page;
use folio_extract::models::{Details, ProviderId, Record, RecordKind};

/// Scripted provider for testing.
///
/// Pages are keyed by `(category, key)`; any page that wasn't scripted is
/// served empty, which reads as "end of data". Every call to
/// [`fetch`](Provider::fetch) is counted, so tests can assert how many
/// network round trips a scenario cost.
pub struct MockProvider {
    id: ProviderId,
    scheme: KeyScheme,
    categories: Vec<CategoryKind>,
    delay: Option<Duration>,
    pages: HashMap<(Category, PageKey), Page>,
    lookups: HashMap<(RecordKind, String), Vec<Record>>,
    failures: Mutex<VecDeque<ErrorKind>>,
    fetched: Mutex<Vec<PageKey>>,
    fetches: AtomicUsize,
}

impl MockProvider {
    pub fn new(id: ProviderId) -> Self {
        Self {
            id,
            scheme: KeyScheme::Numbered { start: 1 },
            categories: CategoryKind::ALL.to_vec(),
            delay: None,
            pages: HashMap::new(),
            lookups: HashMap::new(),
            failures: Mutex::new(VecDeque::new()),
            fetched: Mutex::new(Vec::new()),
            fetches: AtomicUsize::new(0),
        }
    }

    /// `count` listing records titled `"{prefix} {n}"`.
    pub fn records(prefix: &str, count: usize) -> Vec<Record> {
        (1..=count)
            .map(|n| {
                let details = Details::Listing {
                    latest_chapter: String::new(),
                    view_count: None,
                };
                Record::new(ProviderId::ReadManga, format!("https://mock.invalid/{prefix}/{n}"), format!("{prefix} {n}"), details)
            })
            .collect()
    }

    pub fn with_scheme(mut self, scheme: KeyScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_categories(mut self, categories: &[CategoryKind]) -> Self {
        self.categories = categories.to_vec();
        self
    }

    /// Hold every fetch for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_page(mut self, category: Category, key: impl Into<PageKey>, page: Page) -> Self {
        self.pages.insert((category, key.into()), page);
        self
    }

    pub fn with_lookup(mut self, kind: RecordKind, link: impl Into<String>, records: Vec<Record>) -> Self {
        self.lookups.insert((kind, link.into()), records);
        self
    }

    /// Fail the next fetch with `kind` (queued; each failure is used once).
    pub fn fail_next(&self, kind: ErrorKind) {
        self.failures.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).push_back(kind);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Keys requested so far, in call order.
    pub fn fetched_keys(&self) -> Vec<PageKey> {
        self.fetched.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }
}
impl Default for MockProvider {
    fn default() -> Self {
        Self::new(ProviderId::ReadManga)
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn key_scheme(&self) -> KeyScheme {
        self.scheme.clone()
    }

    fn categories(&self) -> &[CategoryKind] {
        &self.categories
    }

    async fn fetch(&self, category: &Category, key: &PageKey) -> Result<Page> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.fetched.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).push(key.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let failure = self.failures.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).pop_front();
        if let Some(kind) = failure {
            exn::bail!(kind);
        }
        if !self.supports(category) {
            return Ok(Page::empty());
        }
        Ok(self.pages.get(&(category.clone(), key.clone())).cloned().unwrap_or_default())
    }

    async fn lookup(&self, kind: RecordKind, link: &str) -> Result<Vec<Record>> {
        Ok(self.lookups.get(&(kind, link.to_string())).cloned().unwrap_or_default())
    }
}
