//! Upstream provider clients.
//!
//! A provider is anything that can answer "give me page `key` of category
//! `category`". Each one declares the [`KeyScheme`] it paginates with, so the
//! synchronization engine can compute cursors without ever assuming that keys
//! are numbers.

mod category;
pub mod client;
pub mod error;
mod key;
mod page;

pub use crate::category::{Category, CategoryKind};
pub use crate::client::{Provider, ProviderHandle};
pub use crate::key::{Cursor, KeyScheme, PageKey};
pub use crate::page::Page;
pub use folio_extract::models::{Details, ProviderId, Record, RecordKind};
