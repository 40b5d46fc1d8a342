//! Synchronization between paginated upstream providers and the page cache.
//!
//! [`Sources`] hands out a [`Pager`] per (provider, category). Pagers read
//! from the cache; when a consumer reads near the end of what's loaded, or
//! explicitly asks for a load, the provider's [`Mediator`] fetches the next
//! page and commits it atomically. Concurrent requests for the same load
//! share a single fetch.

pub mod error;
mod load;
mod mediator;
mod pager;
mod sources;

pub use crate::load::{LoadDirection, LoadEvent, LoadOutcome, LoadState, Phase};
pub use crate::mediator::Mediator;
pub use crate::pager::Pager;
pub use crate::sources::{DEFAULT_PREFETCH_DISTANCE, Sources};
