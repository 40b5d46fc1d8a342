mod facet;
mod page;
mod record;

pub use self::page::{PendingPage, StoredPage};
pub(crate) use self::page::PageRow;
pub(crate) use self::record::RecordRow;
