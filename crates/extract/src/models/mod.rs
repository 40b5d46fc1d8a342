mod kind;
mod provider;
mod record;

pub use self::kind::RecordKind;
pub use self::provider::ProviderId;
pub use self::record::{Details, Record};

fn sanitize(s: impl AsRef<str>) -> String {
    s.as_ref().trim().to_lowercase().replace('/', "").replace('-', "").replace('_', "").replace(' ', "")
}
