//! SQLite pool for the page cache.
//!
//! The workload is many short reads (pagers re-reading a partition after
//! every commit) against one writer committing a page at a time. Partitions
//! are cleared and refreshed often, so freed pages are handed back on close
//! instead of letting the file only ever grow.

use std::path::Path;
use std::time::Duration;

use exn::ResultExt;
use sqlx::sqlite::{SqliteAutoVacuum, SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use tokio::sync::broadcast;
use tracing::{debug, instrument};

use crate::error::{ErrorKind, Result};
use crate::partition::Partition;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

// One writer (the mediator) plus a handful of concurrently reading pagers.
const MAX_CONNECTIONS: u32 = 4;
// A commit is one page of records; readers waiting longer than this are stuck.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
// Slow subscribers lag (and resynchronise with a full read) past this.
const NOTIFY_CAPACITY: usize = 64;

/// The page cache database.
///
/// Cloning shares the pool and the commit channel, so every
/// [`Repository`](crate::Repository) built from any clone sees the same
/// commit notifications.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    commits: broadcast::Sender<Partition>,
}

impl Database {
    /// Open (creating if needed) the cache at `path` and bring its schema up
    /// to date.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let options = Self::options().filename(path.as_ref()).create_if_missing(true);
        Self::open(options, MAX_CONNECTIONS).await
    }

    /// A private, throwaway cache.
    ///
    /// Every connection to `:memory:` is its own database, so the pool is
    /// held to a single connection. Not test-gated: dependent crates use it
    /// in their tests.
    pub async fn connect_in_memory() -> Result<Self> {
        Self::open(Self::options().filename(":memory:"), 1).await
    }

    async fn open(options: SqliteConnectOptions, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .or_raise(|| ErrorKind::Database)?;
        MIGRATOR.run(&pool).await.or_raise(|| ErrorKind::Migration)?;
        debug!(max_connections, "page cache ready");
        let (commits, _) = broadcast::channel(NOTIFY_CAPACITY);
        Ok(Self { pool, commits })
    }

    fn options() -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            // Readers keep reading while a page commits.
            .journal_mode(SqliteJournalMode::Wal)
            // Records are removed with their page by cascade.
            .foreign_keys(true)
            // Everything here can be fetched again; losing the last commit
            // on power failure is acceptable.
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(BUSY_TIMEOUT)
            // Only takes effect on a fresh file (before the first table).
            .auto_vacuum(SqliteAutoVacuum::Incremental)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub(crate) fn commits(&self) -> broadcast::Sender<Partition> {
        self.commits.clone()
    }

    /// Reclaim pages freed by cleared partitions, then close every
    /// connection.
    pub async fn close(&self) {
        _ = sqlx::query("PRAGMA incremental_vacuum").execute(&self.pool).await;
        _ = sqlx::query("PRAGMA optimize").execute(&self.pool).await;
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Edge, PendingPage, Repository};
    use folio_extract::models::{Details, ProviderId, Record};
    use folio_provider::{Category, Cursor, PageKey};

    fn recent() -> Partition {
        Partition::new(ProviderId::SenManga, Category::Recent)
    }

    fn first_page(count: usize) -> PendingPage {
        let records = (1..=count)
            .map(|n| {
                let details = Details::Listing {
                    latest_chapter: String::new(),
                    view_count: None,
                };
                Record::new(ProviderId::SenManga, format!("/title-{n}"), format!("Title {n}"), details)
            })
            .collect();
        PendingPage::new(PageKey::from(1), Cursor::new(None, Some(PageKey::from(2))), records)
    }

    async fn count(db: &Database, sql: &'static str) -> i64 {
        sqlx::query_scalar(sql).fetch_one(db.pool()).await.unwrap()
    }

    #[tokio::test]
    async fn test_in_memory_is_a_single_connection() {
        let db = Database::connect_in_memory().await.unwrap();
        assert_eq!(db.pool().options().get_max_connections(), 1);
        let foreign_keys: i64 = sqlx::query_scalar("PRAGMA foreign_keys").fetch_one(db.pool()).await.unwrap();
        assert_eq!(foreign_keys, 1);
        db.close().await;
    }

    #[tokio::test]
    async fn test_commit_channel_is_shared_by_every_repository() {
        let db = Database::connect_in_memory().await.unwrap();
        let writer = Repository::from(&db.clone());
        let mut commits = Repository::from(&db).subscribe();

        writer.replace_partition(&recent(), &first_page(1)).await.unwrap();
        assert_eq!(commits.recv().await.unwrap(), recent());
    }

    #[tokio::test]
    async fn test_clearing_a_partition_removes_its_records() {
        let db = Database::connect_in_memory().await.unwrap();
        let repo = Repository::from(&db);
        repo.replace_partition(&recent(), &first_page(3)).await.unwrap();
        assert_eq!(count(&db, "SELECT COUNT(*) FROM records").await, 3);

        repo.clear_partition(&recent()).await.unwrap();
        assert_eq!(count(&db, "SELECT COUNT(*) FROM pages").await, 0);
        assert_eq!(count(&db, "SELECT COUNT(*) FROM records").await, 0);
    }

    #[tokio::test]
    async fn test_cache_survives_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.sqlite");

        let db = Database::connect(&path).await.unwrap();
        let journal: String = sqlx::query_scalar("PRAGMA journal_mode").fetch_one(db.pool()).await.unwrap();
        assert_eq!(journal, "wal");
        Repository::from(&db).replace_partition(&recent(), &first_page(2)).await.unwrap();
        db.close().await;

        let db = Database::connect(&path).await.unwrap();
        let repo = Repository::from(&db);
        assert_eq!(repo.record_count(&recent()).await.unwrap(), 2);
        let tail = repo.boundary(&recent(), Edge::Tail).await.unwrap().unwrap();
        assert_eq!(tail.cursor.next, Some(PageKey::from(2)));
        db.close().await;
    }
}
