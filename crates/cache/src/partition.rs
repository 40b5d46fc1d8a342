use std::fmt::{Display, Formatter, Result as FmtResult};

use folio_extract::models::ProviderId;
use folio_provider::Category;

/// The unit of caching: one provider's view of one category.
///
/// Partitions never share pages, records, or cursors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Partition {
    pub provider: ProviderId,
    pub category: Category,
}

impl Partition {
    pub fn new(provider: ProviderId, category: Category) -> Self {
        Self { provider, category }
    }

    /// The `(provider, category, query)` columns identifying this partition.
    pub(crate) fn columns(&self) -> (&'static str, &'static str, &str) {
        (self.provider.as_str(), self.category.kind().as_str(), self.category.query())
    }
}
impl Display for Partition {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}/{}", self.provider, self.category)
    }
}

/// Which end of a partition a page sits at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Head,
    Tail,
}
