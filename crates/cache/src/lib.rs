//! SQLite page cache for paginated provider listings.
//!
//! This crate is the only durable state in the system: for every partition
//! (provider, category, query) it keeps the ordered pages fetched so far,
//! their records, and the cursor attached to each page. The cache is not the
//! source of truth - the upstream providers are. If the database is deleted,
//! every partition simply starts empty again.
//!
//! # Architecture
//! - **Pages**: one row per committed fetch, ordered by position, carrying
//!   the key it was fetched with and its `(previous, next)` cursor.
//! - **Records**: the page's records in provider order. Record details are
//!   stored as compact JSON.
//!
//! Writers get atomic replace/append/clear operations; readers get stable
//! snapshots plus a [broadcast](Repository::subscribe) of committed writes.

mod db;
pub mod error;
mod models;
mod partition;
mod repo;

pub use crate::db::Database;
pub use crate::models::{PendingPage, StoredPage};
pub use crate::partition::{Edge, Partition};
pub use crate::repo::Repository;
