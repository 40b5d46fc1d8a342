//! The synchronization state machine.
//!
//! A [`Mediator`] owns one provider and drives every load for that
//! provider's partitions:
//!
//! ```text
//! Idle -> KeyResolved -> Fetching -> Committing -> Done
//!              |             |            |
//!              +-------------+------------+-----> Failed
//! ```
//!
//! Loads are single-flight per `(partition, direction)`: a request that finds
//! the same load already running joins it instead of fetching again. Loads in
//! different directions on the same partition run one after the other, so
//! each one resolves its key against the cursor the previous one committed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use exn::ResultExt;
use folio_cache::error::ErrorKind as CacheErrorKind;
use folio_cache::{Edge, Partition, PendingPage, Repository};
use folio_provider::{Cursor, KeyScheme, PageKey, ProviderHandle};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info_span, instrument, warn};

use crate::error::{ErrorKind, Result};
use crate::load::{LoadDirection, LoadEvent, LoadOutcome, LoadState, Phase};

type SharedLoad = Shared<BoxFuture<'static, LoadOutcome>>;

// Pagers that fall this far behind skip ahead (they only miss indicator
// updates, never records).
const EVENT_CAPACITY: usize = 64;

/// Drives loads for every partition of a single provider.
///
/// Cheap to clone; clones share in-flight loads.
#[derive(Clone)]
pub struct Mediator {
    inner: Arc<Inner>,
}

struct Inner {
    provider: ProviderHandle,
    cache: Repository,
    in_flight: Mutex<HashMap<(Partition, LoadDirection), SharedLoad>>,
    partitions: Mutex<HashMap<Partition, Arc<tokio::sync::Mutex<()>>>>,
    events: broadcast::Sender<LoadEvent>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // Guarded maps hold no invariants a panicking holder could break.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Mediator {
    pub fn new(provider: ProviderHandle, cache: Repository) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                provider,
                cache,
                in_flight: Mutex::new(HashMap::new()),
                partitions: Mutex::new(HashMap::new()),
                events,
            }),
        }
    }

    pub fn provider(&self) -> &ProviderHandle {
        &self.inner.provider
    }

    pub fn cache(&self) -> &Repository {
        &self.inner.cache
    }

    /// Load state changes for every partition of this provider.
    pub fn subscribe(&self) -> broadcast::Receiver<LoadEvent> {
        self.inner.events.subscribe()
    }

    /// Load one page in `direction`, or join the identical load already in
    /// flight.
    ///
    /// The load runs on its own task: dropping the returned future does not
    /// abort it, cancelling `cancel` does (as long as it hasn't started
    /// committing). Only the token of the caller that started the load is
    /// observed.
    pub async fn load(&self, partition: Partition, direction: LoadDirection, cancel: CancellationToken) -> LoadOutcome {
        let load = {
            let mut in_flight = lock(&self.inner.in_flight);
            let key = (partition, direction);
            match in_flight.get(&key) {
                Some(load) => {
                    debug!(partition = %key.0, %direction, "joining in-flight load");
                    load.clone()
                },
                None => {
                    let load = self.spawn(key.0.clone(), direction, cancel);
                    in_flight.insert(key, load.clone());
                    load
                },
            }
        };
        load.await
    }

    /// Drop everything cached for `partition`.
    ///
    /// Waits for the load currently holding the partition to commit, and
    /// runs before any load queued behind it, so nothing fetched for the old
    /// contents lands afterwards.
    #[instrument(skip(self), fields(%partition))]
    pub async fn forget(&self, partition: &Partition) -> Result<()> {
        let guard = self.inner.guard(partition);
        let _serialized = guard.lock().await;
        self.inner.cache.clear_partition(partition).await.or_raise(|| ErrorKind::Cache)
    }

    fn spawn(&self, partition: Partition, direction: LoadDirection, cancel: CancellationToken) -> SharedLoad {
        let inner = Arc::clone(&self.inner);
        let span = info_span!("load", %partition, %direction);
        let task = tokio::spawn(
            async move {
                _ = inner.events.send(LoadEvent {
                    partition: partition.clone(),
                    direction,
                    state: LoadState::Loading,
                });
                let outcome = inner.run(&partition, direction, &cancel).await;
                // Leave the in-flight map before anyone can observe the
                // outcome, so a later request starts a fresh load.
                lock(&inner.in_flight).remove(&(partition.clone(), direction));
                _ = inner.events.send(LoadEvent::finished(partition, direction, &outcome));
                outcome
            }
            .instrument(span),
        );
        async move {
            task.await.unwrap_or_else(|err| {
                warn!(error = %err, "load task did not complete");
                LoadOutcome::Error(Arc::new(exn::Exn::from(ErrorKind::Cancelled)))
            })
        }
        .boxed()
        .shared()
    }
}

impl Inner {
    fn guard(&self, partition: &Partition) -> Arc<tokio::sync::Mutex<()>> {
        Arc::clone(lock(&self.partitions).entry(partition.clone()).or_default())
    }

    async fn run(&self, partition: &Partition, direction: LoadDirection, cancel: &CancellationToken) -> LoadOutcome {
        let guard = self.guard(partition);
        let _serialized = guard.lock().await;
        match self.execute(partition, direction, cancel).await {
            Ok(end_reached) => {
                debug!(phase = %Phase::Done, end_reached, "load finished");
                LoadOutcome::Success { end_reached }
            },
            Err(err) => {
                warn!(phase = %Phase::Failed, error = ?err, "load failed");
                LoadOutcome::Error(Arc::new(err))
            },
        }
    }

    async fn execute(&self, partition: &Partition, direction: LoadDirection, cancel: &CancellationToken) -> Result<bool> {
        debug!(phase = %Phase::Idle, "resolving key");
        let scheme = self.provider.key_scheme();
        let key = match self.resolve(partition, direction, &scheme).await? {
            Resolved::Key(key) => key,
            Resolved::Finished { end_reached } => return Ok(end_reached),
        };
        debug!(phase = %Phase::KeyResolved, %key);
        if cancel.is_cancelled() {
            exn::bail!(ErrorKind::Cancelled);
        }

        debug!(phase = %Phase::Fetching, %key);
        let page = tokio::select! {
            biased;
            () = cancel.cancelled() => exn::bail!(ErrorKind::Cancelled),
            page = self.provider.fetch(&partition.category, &key) => page.map_err(ErrorKind::fetch)?,
        };

        let empty = page.is_empty();
        let previous = match direction {
            LoadDirection::Prepend if empty => None,
            _ => scheme.predecessor(&key, &page),
        };
        let next = match direction {
            LoadDirection::Refresh | LoadDirection::Append if empty => None,
            _ => scheme.successor(&key, &page),
        };
        let end_reached = match direction {
            LoadDirection::Prepend => previous.is_none(),
            LoadDirection::Refresh | LoadDirection::Append => next.is_none(),
        };

        if cancel.is_cancelled() {
            exn::bail!(ErrorKind::Cancelled);
        }
        debug!(phase = %Phase::Committing, records = page.len(), ?previous, ?next);
        let pending = PendingPage::new(key, Cursor::new(previous, next), page.records);
        let committed = match direction {
            LoadDirection::Refresh => self.cache.replace_partition(partition, &pending).await,
            LoadDirection::Prepend => self.cache.append_to_partition(partition, &pending, Edge::Head).await,
            LoadDirection::Append => self.cache.append_to_partition(partition, &pending, Edge::Tail).await,
        };
        committed.map_err(|err| {
            if matches!(*err, CacheErrorKind::Conflict) {
                err.raise(ErrorKind::Superseded)
            } else {
                err.raise(ErrorKind::Cache)
            }
        })?;
        Ok(end_reached)
    }

    async fn resolve(&self, partition: &Partition, direction: LoadDirection, scheme: &KeyScheme) -> Result<Resolved> {
        let edge = match direction {
            LoadDirection::Refresh => return Ok(Resolved::Key(scheme.starting_key())),
            LoadDirection::Prepend => Edge::Head,
            LoadDirection::Append => Edge::Tail,
        };
        let boundary = self.cache.boundary(partition, edge).await.or_raise(|| ErrorKind::Cache)?;
        let Some(page) = boundary else {
            // Nothing to extend yet; the first load has to be a refresh.
            debug!(%direction, "no boundary page");
            return Ok(Resolved::Finished { end_reached: false });
        };
        let key = match edge {
            Edge::Head => page.cursor.previous,
            Edge::Tail => page.cursor.next,
        };
        Ok(match key {
            Some(key) => Resolved::Key(key),
            None => Resolved::Finished { end_reached: true },
        })
    }
}

enum Resolved {
    Key(PageKey),
    Finished { end_reached: bool },
}
