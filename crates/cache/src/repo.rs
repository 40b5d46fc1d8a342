//! Repository for partitions: their pages, cursors, and records.
//!
//! A partition is an ordered run of pages. Refresh replaces the run
//! wholesale; Prepend and Append add one page at either end. Every mutation
//! is a single transaction, so readers only ever see whole commits.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{PageRow, PendingPage, RecordRow, StoredPage};
use crate::partition::{Edge, Partition};
use exn::ResultExt;
use folio_extract::models::{ProviderId, Record};
use folio_provider::{Category, CategoryKind, Cursor};
use sqlx::{Sqlite, SqlitePool, Transaction};
use time::UtcDateTime;
use tokio::sync::broadcast;
use tracing::{debug, instrument, warn};

/// Repository for managing cached partitions.
///
/// # Relationships
///
/// - A partition owns zero or more pages, ordered by position
/// - A page owns zero or more records, ordered by ordinal
/// - Deleting a page cascades to its records
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
    commits: broadcast::Sender<Partition>,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
            commits: db.commits(),
        }
    }
}
impl Repository {
    /// Notifications of every committed write, by partition.
    ///
    /// Receivers only learn *which* partition changed; they re-read it to
    /// see what changed.
    pub fn subscribe(&self) -> broadcast::Receiver<Partition> {
        self.commits.subscribe()
    }

    fn notify(&self, partition: &Partition) {
        // Nobody listening is fine.
        _ = self.commits.send(partition.clone());
    }

    // =========================================================================
    // Read
    // =========================================================================

    /// All records of a partition, in page order then provider order.
    #[instrument(skip(self), fields(%partition))]
    pub async fn read_partition(&self, partition: &Partition) -> Result<Vec<Record>> {
        let (provider, category, query) = partition.columns();
        let rows: Vec<RecordRow> = sqlx::query_as(include_str!("../queries/list_records.sql"))
            .bind(provider)
            .bind(category)
            .bind(query)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(Record::try_from).collect()
    }

    pub async fn record_count(&self, partition: &Partition) -> Result<usize> {
        let (provider, category, query) = partition.columns();
        let count: i64 = sqlx::query_scalar(include_str!("../queries/count_records.sql"))
            .bind(provider)
            .bind(category)
            .bind(query)
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        usize::try_from(count).or_raise(|| ErrorKind::InvalidData("record count"))
    }

    /// Committed pages of a partition, head first.
    pub async fn pages(&self, partition: &Partition) -> Result<Vec<StoredPage>> {
        let (provider, category, query) = partition.columns();
        let rows: Vec<PageRow> = sqlx::query_as(include_str!("../queries/list_pages.sql"))
            .bind(provider)
            .bind(category)
            .bind(query)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(StoredPage::try_from).collect()
    }

    /// The page at one end of a partition, or `None` if nothing has been
    /// committed yet.
    pub async fn boundary(&self, partition: &Partition, edge: Edge) -> Result<Option<StoredPage>> {
        Self::load_boundary(&self.pool, partition, edge).await
    }

    /// The partition's cursor: the head page's backward key and the tail
    /// page's forward key. `None` if nothing has been committed yet.
    pub async fn cursor(&self, partition: &Partition) -> Result<Option<Cursor>> {
        let Some(head) = self.boundary(partition, Edge::Head).await? else {
            return Ok(None);
        };
        let Some(tail) = self.boundary(partition, Edge::Tail).await? else {
            return Ok(None);
        };
        Ok(Some(Cursor::new(head.cursor.previous, tail.cursor.next)))
    }

    /// Every partition with at least one committed page.
    pub async fn partitions(&self) -> Result<Vec<Partition>> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(include_str!("../queries/list_partitions.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter()
            .map(|(provider, category, query)| -> Result<Partition> {
                let provider = provider.parse::<ProviderId>().or_raise(|| ErrorKind::InvalidData("provider"))?;
                let kind = category.parse::<CategoryKind>().or_raise(|| ErrorKind::InvalidData("category"))?;
                let category = Category::from_parts(kind, query).or_raise(|| ErrorKind::InvalidData("category"))?;
                Ok(Partition::new(provider, category))
            })
            .collect()
    }

    // =========================================================================
    // Write
    // =========================================================================

    /// Replace everything in a partition with a single page.
    ///
    /// The delete and the insert are one transaction: readers see either the
    /// old partition or the new one.
    #[instrument(skip(self, page), fields(%partition, key = %page.key, records = page.records.len()))]
    pub async fn replace_partition(&self, partition: &Partition, page: &PendingPage) -> Result<()> {
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        Self::delete_pages(&mut tx, partition).await?;
        Self::insert_page(&mut tx, partition, 0, page).await?;
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        debug!("partition replaced");
        self.notify(partition);
        Ok(())
    }

    /// Add a page at one end of a partition without touching existing pages.
    ///
    /// The page must continue the current boundary: its key has to be the
    /// boundary page's key in that direction. Anything else (an empty
    /// partition, a boundary that was replaced or already extended) fails
    /// with [`ErrorKind::Conflict`] and leaves the partition as it was.
    #[instrument(skip(self, page), fields(%partition, key = %page.key, records = page.records.len()))]
    pub async fn append_to_partition(&self, partition: &Partition, page: &PendingPage, edge: Edge) -> Result<()> {
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let Some(boundary) = Self::load_boundary(&mut *tx, partition, edge).await? else {
            warn!("partition is empty; refusing to extend it");
            exn::bail!(ErrorKind::Conflict);
        };
        let expected = match edge {
            Edge::Head => boundary.cursor.previous.as_ref(),
            Edge::Tail => boundary.cursor.next.as_ref(),
        };
        if expected != Some(&page.key) {
            warn!(boundary = %boundary.key, ?expected, "page does not continue the boundary");
            exn::bail!(ErrorKind::Conflict);
        }
        let position = match edge {
            Edge::Head => boundary.position - 1,
            Edge::Tail => boundary.position + 1,
        };
        Self::insert_page(&mut tx, partition, position, page).await?;
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        debug!(position, "page committed");
        self.notify(partition);
        Ok(())
    }

    /// Drop every page and record of a partition.
    #[instrument(skip(self), fields(%partition))]
    pub async fn clear_partition(&self, partition: &Partition) -> Result<()> {
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        Self::delete_pages(&mut tx, partition).await?;
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        self.notify(partition);
        Ok(())
    }

    async fn load_boundary<'e, E>(executor: E, partition: &Partition, edge: Edge) -> Result<Option<StoredPage>>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        let (provider, category, query) = partition.columns();
        let sql = match edge {
            Edge::Head => include_str!("../queries/get_head_page.sql"),
            Edge::Tail => include_str!("../queries/get_tail_page.sql"),
        };
        let row: Option<PageRow> = sqlx::query_as(sql)
            .bind(provider)
            .bind(category)
            .bind(query)
            .fetch_optional(executor)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(StoredPage::try_from).transpose()
    }

    async fn delete_pages(tx: &mut Transaction<'_, Sqlite>, partition: &Partition) -> Result<()> {
        let (provider, category, query) = partition.columns();
        sqlx::query(include_str!("../queries/delete_partition.sql"))
            .bind(provider)
            .bind(category)
            .bind(query)
            .execute(&mut **tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    async fn insert_page(
        tx: &mut Transaction<'_, Sqlite>,
        partition: &Partition,
        position: i64,
        page: &PendingPage,
    ) -> Result<()> {
        let rows = page.records.iter().map(RecordRow::try_from).collect::<Result<Vec<_>>>()?;
        let (provider, category, query) = partition.columns();
        let page_id: i64 = sqlx::query_scalar(include_str!("../queries/insert_page.sql"))
            .bind(provider)
            .bind(category)
            .bind(query)
            .bind(position)
            .bind(page.key.as_str())
            .bind(page.cursor.previous.as_ref().map(|key| key.as_str()))
            .bind(page.cursor.next.as_ref().map(|key| key.as_str()))
            .bind(UtcDateTime::now().unix_timestamp())
            .fetch_one(&mut **tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        for (ordinal, row) in rows.into_iter().enumerate() {
            let ordinal = i64::try_from(ordinal).or_raise(|| ErrorKind::InvalidData("ordinal"))?;
            sqlx::query(include_str!("../queries/insert_record.sql"))
                .bind(page_id)
                .bind(ordinal)
                .bind(row.provider)
                .bind(row.kind)
                .bind(row.link)
                .bind(row.title)
                .bind(row.media)
                .bind(row.details)
                .execute(&mut **tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
        }
        Ok(())
    }
}
