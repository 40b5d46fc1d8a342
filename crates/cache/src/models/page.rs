use exn::ResultExt;
use folio_extract::models::Record;
use folio_provider::{Cursor, PageKey};
use time::UtcDateTime;

use crate::error::{Error, ErrorKind};

/// A page about to be committed: the key it was fetched with, the cursor
/// computed for it, and its records in provider order.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPage {
    pub key: PageKey,
    pub cursor: Cursor,
    pub records: Vec<Record>,
}

impl PendingPage {
    pub fn new(key: PageKey, cursor: Cursor, records: Vec<Record>) -> Self {
        Self { key, cursor, records }
    }
}

/// A committed page, without its records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPage {
    /// Position within the partition; only the relative order is meaningful.
    pub position: i64,
    pub key: PageKey,
    pub cursor: Cursor,
    pub fetched_at: UtcDateTime,
}

#[derive(sqlx::FromRow)]
pub(crate) struct PageRow {
    pub(crate) position: i64,
    pub(crate) page_key: String,
    #[sqlx(default)]
    pub(crate) prev_key: Option<String>,
    #[sqlx(default)]
    pub(crate) next_key: Option<String>,
    pub(crate) fetched_at: i64,
}
impl TryFrom<PageRow> for StoredPage {
    type Error = Error;
    fn try_from(row: PageRow) -> Result<Self, Self::Error> {
        Ok(Self {
            position: row.position,
            key: PageKey::new(row.page_key),
            cursor: Cursor::new(row.prev_key.map(PageKey::new), row.next_key.map(PageKey::new)),
            fetched_at: UtcDateTime::from_unix_timestamp(row.fetched_at)
                .or_raise(|| ErrorKind::InvalidData("fetch date"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_to_model() {
        let fetched = UtcDateTime::now();
        let row = PageRow {
            position: -2,
            page_key: "3".to_string(),
            prev_key: Some("2".to_string()),
            next_key: None,
            fetched_at: fetched.unix_timestamp(),
        };
        let page = StoredPage::try_from(row).unwrap();
        assert_eq!(page.position, -2);
        assert_eq!(page.key, PageKey::from(3));
        assert_eq!(page.cursor, Cursor::new(Some(PageKey::from(2)), None));
        // Converting to a Unix timestamp (measured in seconds) inherently strips the nanoseconds component.
        assert_eq!(page.fetched_at, fetched.replace_nanosecond(0).unwrap());
    }
}
