use std::collections::BTreeMap;

use exn::{OptionExt, ResultExt};
use folio_cache::{Partition, Repository};
use folio_extract::models::{ProviderId, Record, RecordKind};
use folio_provider::{Category, CategoryKind, ProviderHandle};
use tracing::{debug, instrument};

use crate::error::{ErrorKind, Result};
use crate::mediator::Mediator;
use crate::pager::Pager;

/// How close to the loaded tail a read has to be before the next page is
/// requested.
pub const DEFAULT_PREFETCH_DISTANCE: usize = 10;

/// Entry point: every configured provider, behind one read contract.
///
/// # Examples
///
/// ```no_run
/// use folio_cache::{Database, Repository};
/// use folio_extract::models::ProviderId;
/// use folio_provider::{Category, ProviderHandle};
/// use folio_sync::{LoadDirection, Sources};
///
/// async fn recent(db: &Database, readmanga: ProviderHandle) {
///     let sources = Sources::new(Repository::from(db)).with_provider(readmanga);
///     let pager = sources.pager(ProviderId::ReadManga, Category::Recent);
///     if pager.request_load(LoadDirection::Refresh).await.is_success() {
///         for record in pager.snapshot().await.unwrap_or_default() {
///             println!("{record}");
///         }
///     }
/// }
/// ```
pub struct Sources {
    cache: Repository,
    mediators: BTreeMap<ProviderId, Mediator>,
    prefetch_distance: usize,
}

impl Sources {
    pub fn new(cache: Repository) -> Self {
        Self {
            cache,
            mediators: BTreeMap::new(),
            prefetch_distance: DEFAULT_PREFETCH_DISTANCE,
        }
    }

    pub fn with_prefetch_distance(mut self, distance: usize) -> Self {
        self.prefetch_distance = distance;
        self
    }

    /// Register a provider, replacing any previous client with the same id.
    pub fn with_provider(mut self, provider: ProviderHandle) -> Self {
        self.register(provider);
        self
    }

    pub fn register(&mut self, provider: ProviderHandle) {
        let id = provider.id();
        debug!(provider = %id, "registering provider");
        self.mediators.insert(id, Mediator::new(provider, self.cache.clone()));
    }

    /// Configured providers.
    pub fn providers(&self) -> impl Iterator<Item = ProviderId> + '_ {
        self.mediators.keys().copied()
    }

    /// Categories a provider offers; none if it isn't configured.
    pub fn categories(&self, provider: ProviderId) -> Vec<CategoryKind> {
        self.mediators
            .get(&provider)
            .map(|mediator| mediator.provider().categories().to_vec())
            .unwrap_or_default()
    }

    /// Read handle over `(provider, category)`.
    ///
    /// Unconfigured providers and unsupported categories produce a pager that
    /// is empty and exhausted from the start.
    pub fn pager(&self, provider: ProviderId, category: Category) -> Pager {
        let mediator = self
            .mediators
            .get(&provider)
            .filter(|mediator| mediator.provider().supports(&category))
            .cloned();
        if mediator.is_none() {
            debug!(%provider, %category, "unsupported category; pager is inert");
        }
        Pager::new(Partition::new(provider, category), self.cache.clone(), mediator, self.prefetch_distance)
    }

    pub async fn overview(&self, provider: ProviderId, link: &str) -> Result<Option<Record>> {
        Ok(self.lookup(provider, RecordKind::Overview, link).await?.into_iter().next())
    }

    pub async fn chapters(&self, provider: ProviderId, link: &str) -> Result<Vec<Record>> {
        self.lookup(provider, RecordKind::Chapters, link).await
    }

    pub async fn pages(&self, provider: ProviderId, link: &str) -> Result<Vec<Record>> {
        self.lookup(provider, RecordKind::Pages, link).await
    }

    pub async fn authors(&self, provider: ProviderId, link: &str) -> Result<Vec<Record>> {
        self.lookup(provider, RecordKind::Authors, link).await
    }

    pub async fn genres(&self, provider: ProviderId, link: &str) -> Result<Vec<Record>> {
        self.lookup(provider, RecordKind::Genres, link).await
    }

    /// Uncached detail lookup.
    #[instrument(skip(self))]
    async fn lookup(&self, provider: ProviderId, kind: RecordKind, link: &str) -> Result<Vec<Record>> {
        let mediator = self.mediators.get(&provider).ok_or_raise(|| ErrorKind::UnknownProvider(provider))?;
        mediator.provider().lookup(kind, link).await.map_err(ErrorKind::fetch)
    }

    /// Drop everything cached for `(provider, category)`.
    pub async fn forget(&self, provider: ProviderId, category: Category) -> Result<()> {
        let partition = Partition::new(provider, category);
        match self.mediators.get(&provider) {
            Some(mediator) => mediator.forget(&partition).await,
            None => self.cache.clear_partition(&partition).await.or_raise(|| ErrorKind::Cache),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::LoadDirection;
    use folio_cache::Database;
    use folio_extract::models::Details;
    use folio_provider::client::MockProvider;
    use folio_provider::Page;
    use std::sync::Arc;
    use std::time::Duration;

    async fn sources() -> Sources {
        let db = Database::connect_in_memory().await.unwrap();
        let overview = Record::new(
            ProviderId::ReadManga,
            "/one-piece",
            "One Piece",
            Details::Overview {
                alternative_title: String::new(),
                summary: "Pirates".to_string(),
                status: "Ongoing".to_string(),
            },
        );
        let readmanga = MockProvider::new(ProviderId::ReadManga)
            .with_categories(&[CategoryKind::Recent, CategoryKind::Genre])
            .with_page(Category::Recent, 1, Page::new(MockProvider::records("recent", 30)))
            .with_page(Category::Genre("action".into()), 1, Page::new(MockProvider::records("action", 5)))
            .with_lookup(RecordKind::Overview, "/one-piece", vec![overview])
            .with_lookup(RecordKind::Chapters, "/one-piece", MockProvider::records("chapter", 3));
        let senmanga = MockProvider::new(ProviderId::SenManga).with_categories(&[CategoryKind::Recent]);
        Sources::new(Repository::from(&db))
            .with_provider(Arc::new(readmanga))
            .with_provider(Arc::new(senmanga))
    }

    #[tokio::test]
    async fn test_providers_and_categories() {
        let sources = sources().await;
        assert_eq!(sources.providers().collect::<Vec<_>>(), [ProviderId::ReadManga, ProviderId::SenManga]);
        assert_eq!(sources.categories(ProviderId::ReadManga), [CategoryKind::Recent, CategoryKind::Genre]);
        assert!(sources.categories(ProviderId::Dm5).is_empty());
    }

    #[tokio::test]
    async fn test_partitions_are_independent() {
        let sources = sources().await;
        let recent = sources.pager(ProviderId::ReadManga, Category::Recent);
        let action = sources.pager(ProviderId::ReadManga, Category::Genre("action".into()));
        recent.request_load(LoadDirection::Refresh).await;
        action.request_load(LoadDirection::Refresh).await;
        assert_eq!(recent.snapshot().await.unwrap().len(), 30);
        assert_eq!(action.snapshot().await.unwrap().len(), 5);

        sources.forget(ProviderId::ReadManga, Category::Recent).await.unwrap();
        assert!(recent.snapshot().await.unwrap().is_empty());
        assert_eq!(action.snapshot().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_forget_during_append_leaves_partition_empty() {
        let db = Database::connect_in_memory().await.unwrap();
        let provider = MockProvider::new(ProviderId::ReadManga)
            .with_page(Category::Recent, 1, Page::new(MockProvider::records("one", 30)))
            .with_page(Category::Recent, 2, Page::new(MockProvider::records("two", 30)))
            .with_delay(Duration::from_millis(100));
        let sources = Sources::new(Repository::from(&db)).with_provider(Arc::new(provider));
        let pager = sources.pager(ProviderId::ReadManga, Category::Recent);
        assert!(pager.request_load(LoadDirection::Refresh).await.is_success());

        let (append, forgotten) = tokio::join!(pager.request_load(LoadDirection::Append), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            sources.forget(ProviderId::ReadManga, Category::Recent).await
        });
        forgotten.unwrap();
        assert!(append.is_success());
        assert!(pager.snapshot().await.unwrap().is_empty());
        assert_eq!(pager.cursor().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unsupported_pager_is_inert() {
        let sources = sources().await;
        for pager in [
            sources.pager(ProviderId::SenManga, Category::Search("kingdom".into())),
            sources.pager(ProviderId::Dm5, Category::Recent),
        ] {
            assert!(!pager.is_supported());
            assert!(pager.request_load(LoadDirection::Refresh).await.end_reached());
            assert!(pager.request_load(LoadDirection::Append).await.end_reached());
            assert!(pager.snapshot().await.unwrap().is_empty());
            assert_eq!(pager.get(0).await.unwrap(), None);
        }
    }

    #[tokio::test]
    async fn test_lookups() {
        let sources = sources().await;
        let overview = sources.overview(ProviderId::ReadManga, "/one-piece").await.unwrap().unwrap();
        assert_eq!(overview.title, "One Piece");
        assert_eq!(sources.chapters(ProviderId::ReadManga, "/one-piece").await.unwrap().len(), 3);
        assert!(sources.pages(ProviderId::ReadManga, "/one-piece").await.unwrap().is_empty());
        assert_eq!(sources.overview(ProviderId::SenManga, "/nothing").await.unwrap(), None);

        let err = sources.chapters(ProviderId::Dm5, "/x").await.unwrap_err();
        assert_eq!(*err, ErrorKind::UnknownProvider(ProviderId::Dm5));
    }
}
