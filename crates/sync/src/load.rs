use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use folio_cache::Partition;

use crate::error::Error;

/// Which way a load extends a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadDirection {
    /// Discard the partition and start again from the provider's first page.
    Refresh,
    /// Load the page before the partition's head.
    Prepend,
    /// Load the page after the partition's tail.
    Append,
}
impl Display for LoadDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Refresh => "refresh",
            Self::Prepend => "prepend",
            Self::Append => "append",
        })
    }
}

/// Result of one load, shared between every caller that joined it.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// Committed (or nothing to do). `end_reached` means there is nothing
    /// further in the requested direction.
    Success { end_reached: bool },
    /// Nothing was committed.
    Error(Arc<Error>),
}
impl LoadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn end_reached(&self) -> bool {
        matches!(self, Self::Success { end_reached: true })
    }
}

/// Where a load is in its lifecycle. Only ever observed through tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    KeyResolved,
    Fetching,
    Committing,
    Done,
    Failed,
}
impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::KeyResolved => "key-resolved",
            Self::Fetching => "fetching",
            Self::Committing => "committing",
            Self::Done => "done",
            Self::Failed => "failed",
        })
    }
}

/// Loading-indicator state for one partition.
#[derive(Debug, Clone)]
pub enum LoadState {
    Loading,
    NotLoading { end_reached: bool },
    Error(Arc<Error>),
}

/// A state change of a load, broadcast to every pager.
#[derive(Debug, Clone)]
pub struct LoadEvent {
    pub partition: Partition,
    pub direction: LoadDirection,
    pub state: LoadState,
}
impl LoadEvent {
    pub(crate) fn finished(partition: Partition, direction: LoadDirection, outcome: &LoadOutcome) -> Self {
        let state = match outcome {
            LoadOutcome::Success { end_reached } => LoadState::NotLoading { end_reached: *end_reached },
            LoadOutcome::Error(err) => LoadState::Error(Arc::clone(err)),
        };
        Self { partition, direction, state }
    }
}
