use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("configuration error")]
    Config,
    #[display("could not open the page cache")]
    Cache,
    #[display("could not set up provider {_0}")]
    Provider(#[error(not(source))] String),
    #[display("{_0}")]
    Invalid(#[error(not(source))] String),
    #[display("load failed: {_0}")]
    Load(#[error(not(source))] String),
    #[display("lookup failed")]
    Lookup,
}
