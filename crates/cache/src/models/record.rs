use exn::ResultExt;
use facet_json::{from_str as from_json, to_string as to_json};
use folio_extract::models::{ProviderId, Record, RecordKind};

use crate::error::{Error, ErrorKind};
use crate::models::facet::DetailsProxy;

#[derive(sqlx::FromRow)]
pub(crate) struct RecordRow {
    pub(crate) provider: String,
    pub(crate) kind: String,
    pub(crate) link: String,
    pub(crate) title: String,
    pub(crate) media: String,
    pub(crate) details: String,
}
impl TryFrom<&Record> for RecordRow {
    type Error = Error;
    fn try_from(record: &Record) -> Result<Self, Self::Error> {
        Ok(Self {
            provider: record.provider.as_str().to_string(),
            kind: record.kind().as_str().to_string(),
            link: record.link.clone(),
            title: record.title.clone(),
            media: to_json(&record.media).or_raise(|| ErrorKind::InvalidData("media"))?,
            details: to_json(&DetailsProxy::from(&record.details)).or_raise(|| ErrorKind::InvalidData("details"))?,
        })
    }
}
impl TryFrom<RecordRow> for Record {
    type Error = Error;
    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        let provider = row.provider.parse::<ProviderId>().or_raise(|| ErrorKind::InvalidData("provider"))?;
        let kind = row.kind.parse::<RecordKind>().or_raise(|| ErrorKind::InvalidData("record kind"))?;
        let details = from_json::<DetailsProxy>(&row.details)
            .or_raise(|| ErrorKind::InvalidData("details"))?
            .into_details(kind);
        let mut record = Record::new(provider, row.link, row.title, details);
        record.media = from_json::<Vec<String>>(&row.media).or_raise(|| ErrorKind::InvalidData("media"))?;
        Ok(record)
    }
}
