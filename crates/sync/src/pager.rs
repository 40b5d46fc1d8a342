use async_stream::stream;
use exn::ResultExt;
use folio_cache::{Partition, Repository};
use folio_extract::models::Record;
use folio_provider::Cursor;
use futures::Stream;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::error::{ErrorKind, Result};
use crate::load::{LoadDirection, LoadEvent, LoadOutcome, LoadState};
use crate::mediator::Mediator;

/// Read handle over one partition.
///
/// Reads always come straight from the cache and never wait for a fetch.
/// Reading close to the end of what's loaded kicks off the next page in the
/// background; [`records`](Self::records) then observes it once committed.
pub struct Pager {
    partition: Partition,
    cache: Repository,
    /// `None` when the provider doesn't offer the category.
    mediator: Option<Mediator>,
    prefetch_distance: usize,
    cancel: CancellationToken,
}

impl Pager {
    pub(crate) fn new(partition: Partition, cache: Repository, mediator: Option<Mediator>, prefetch_distance: usize) -> Self {
        Self {
            partition,
            cache,
            mediator,
            prefetch_distance,
            cancel: CancellationToken::new(),
        }
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Whether loads can ever produce anything. Unsupported pagers are empty
    /// and exhausted from the start.
    pub fn is_supported(&self) -> bool {
        self.mediator.is_some()
    }

    /// Every committed record, in order.
    pub async fn snapshot(&self) -> Result<Vec<Record>> {
        self.cache.read_partition(&self.partition).await.or_raise(|| ErrorKind::Cache)
    }

    /// The partition's cursor, or `None` before the first commit.
    pub async fn cursor(&self) -> Result<Option<Cursor>> {
        self.cache.cursor(&self.partition).await.or_raise(|| ErrorKind::Cache)
    }

    /// Load a page and wait for the outcome. Joins an identical load that's
    /// already in flight.
    #[instrument(skip(self), fields(partition = %self.partition))]
    pub async fn request_load(&self, direction: LoadDirection) -> LoadOutcome {
        match &self.mediator {
            Some(mediator) => mediator.load(self.partition.clone(), direction, self.cancel.child_token()).await,
            None => LoadOutcome::Success { end_reached: true },
        }
    }

    /// Record at `index`, if loaded.
    ///
    /// Within the prefetch distance of the loaded tail, the next page is
    /// requested in the background (or the first page, if nothing has been
    /// loaded yet).
    pub async fn get(&self, index: usize) -> Result<Option<Record>> {
        let records = self.snapshot().await?;
        if index.saturating_add(self.prefetch_distance) >= records.len() {
            self.prefetch().await?;
        }
        Ok(records.into_iter().nth(index))
    }

    async fn prefetch(&self) -> Result<()> {
        let Some(mediator) = self.mediator.clone() else {
            return Ok(());
        };
        let direction = match self.cursor().await? {
            None => LoadDirection::Refresh,
            Some(Cursor { next: None, .. }) => return Ok(()),
            Some(_) => LoadDirection::Append,
        };
        debug!(partition = %self.partition, %direction, "prefetching");
        let partition = self.partition.clone();
        let cancel = self.cancel.child_token();
        tokio::spawn(async move { mediator.load(partition, direction, cancel).await });
        Ok(())
    }

    /// Cancel every load this pager started that hasn't begun committing.
    ///
    /// Cancellation is permanent: later loads through this pager that need a
    /// fetch fail with [`ErrorKind::Cancelled`].
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// The current records, then again after every commit to this
    /// partition.
    pub fn records(&self) -> impl Stream<Item = Result<Vec<Record>>> + '_ {
        let mut commits = self.cache.subscribe();
        stream! {
            yield self.snapshot().await;
            loop {
                match commits.recv().await {
                    Ok(partition) if partition == self.partition => yield self.snapshot().await,
                    Ok(_) => continue,
                    // Missed some commits; one re-read covers all of them.
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "record stream lagged");
                        yield self.snapshot().await;
                    },
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    /// Loading-indicator state changes for this partition.
    pub fn events(&self) -> impl Stream<Item = LoadEvent> + '_ {
        let mut events = self.mediator.as_ref().map(Mediator::subscribe);
        stream! {
            let Some(events) = events.as_mut() else {
                yield LoadEvent {
                    partition: self.partition.clone(),
                    direction: LoadDirection::Refresh,
                    state: LoadState::NotLoading { end_reached: true },
                };
                return;
            };
            loop {
                match events.recv().await {
                    Ok(event) if event.partition == self.partition => yield event,
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => debug!(skipped, "event stream lagged"),
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_cache::Database;
    use folio_extract::models::ProviderId;
    use folio_provider::client::MockProvider;
    use folio_provider::{Category, Page, PageKey};
    use futures::StreamExt;
    use std::pin::pin;
    use std::sync::Arc;
    use std::time::Duration;

    async fn pager(provider: MockProvider, prefetch_distance: usize) -> (Pager, Arc<MockProvider>) {
        let db = Database::connect_in_memory().await.unwrap();
        let cache = Repository::from(&db);
        let provider = Arc::new(provider);
        let mediator = Mediator::new(provider.clone(), cache.clone());
        let partition = Partition::new(ProviderId::ReadManga, Category::Recent);
        (Pager::new(partition, cache, Some(mediator), prefetch_distance), provider)
    }

    fn provider() -> MockProvider {
        MockProvider::default()
            .with_page(Category::Recent, 1, Page::new(MockProvider::records("one", 30)))
            .with_page(Category::Recent, 2, Page::new(MockProvider::records("two", 30)))
    }

    #[tokio::test]
    async fn test_request_load() {
        let (pager, _provider) = pager(provider(), 10).await;
        assert!(pager.snapshot().await.unwrap().is_empty());
        assert!(!pager.request_load(LoadDirection::Refresh).await.end_reached());
        assert_eq!(pager.snapshot().await.unwrap().len(), 30);
        assert_eq!(pager.cursor().await.unwrap(), Some(Cursor::new(None, Some(PageKey::from(2)))));
    }

    #[tokio::test]
    async fn test_records_stream_follows_commits() {
        let (pager, _provider) = pager(provider(), 10).await;
        let mut records = pin!(pager.records());
        assert!(records.next().await.unwrap().unwrap().is_empty());

        pager.request_load(LoadDirection::Refresh).await;
        assert_eq!(records.next().await.unwrap().unwrap().len(), 30);
        pager.request_load(LoadDirection::Append).await;
        assert_eq!(records.next().await.unwrap().unwrap().len(), 60);
    }

    #[tokio::test]
    async fn test_get_far_from_tail_does_not_prefetch() {
        let (pager, provider) = pager(provider(), 10).await;
        pager.request_load(LoadDirection::Refresh).await;
        let record = pager.get(5).await.unwrap().unwrap();
        assert_eq!(record.title, "one 6");
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(provider.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_get_near_tail_prefetches_in_background() {
        let (pager, provider) = pager(provider(), 10).await;
        let mut records = pin!(pager.records());
        assert!(records.next().await.unwrap().unwrap().is_empty());

        // Nothing loaded yet: the read returns immediately and starts page 1.
        assert_eq!(pager.get(0).await.unwrap(), None);
        assert_eq!(records.next().await.unwrap().unwrap().len(), 30);

        // Index 25 is within 10 of the tail (30): page 2 follows.
        assert_eq!(pager.get(25).await.unwrap().unwrap().title, "one 26");
        assert_eq!(records.next().await.unwrap().unwrap().len(), 60);
        assert_eq!(provider.fetched_keys(), [PageKey::from(1), PageKey::from(2)]);
    }

    #[tokio::test]
    async fn test_events_for_this_partition() {
        let (pager, _provider) = pager(provider(), 10).await;
        let mut events = pin!(pager.events());
        pager.request_load(LoadDirection::Refresh).await;
        assert!(matches!(events.next().await.unwrap().state, LoadState::Loading));
        assert!(matches!(
            events.next().await.unwrap().state,
            LoadState::NotLoading { end_reached: false }
        ));
    }

    #[tokio::test]
    async fn test_cancel() {
        let (pager, _provider) = pager(provider().with_delay(Duration::from_millis(200)), 10).await;
        let (outcome, ()) = tokio::join!(pager.request_load(LoadDirection::Refresh), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            pager.cancel();
        });
        assert!(matches!(outcome, LoadOutcome::Error(err) if **err == ErrorKind::Cancelled));
        assert!(pager.snapshot().await.unwrap().is_empty());
    }
}
