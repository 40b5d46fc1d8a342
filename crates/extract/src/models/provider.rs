use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use super::sanitize;
use crate::error::{Error, ErrorKind};

/// An upstream content provider.
///
/// Each provider has its own markup dialect and pagination scheme. The string
/// form returned by [`as_str`](Self::as_str) is stable, and is what gets
/// written to the cache as the partition's provider tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProviderId {
    /// readmng.com
    ReadManga,
    /// senmanga.com
    SenManga,
    /// dm5.com
    Dm5,
}
impl ProviderId {
    pub const ALL: [ProviderId; 3] = [ProviderId::ReadManga, ProviderId::SenManga, ProviderId::Dm5];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::ReadManga => "readmanga",
            ProviderId::SenManga => "senmanga",
            ProviderId::Dm5 => "dm5",
        }
    }
}
impl FromStr for ProviderId {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match sanitize(s).as_str() {
            "readmanga" | "readmng" => ProviderId::ReadManga,
            "senmanga" => ProviderId::SenManga,
            "dm5" => ProviderId::Dm5,
            _ => exn::bail!(ErrorKind::UnknownProvider(s.to_string())),
        })
    }
}
impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
