use std::result;

use thiserror::Error;

#[derive(Debug, PartialEq, Error)]
pub enum Error {
    #[error("Invalid header syntax at byte {pos}: {reason}")]
    InvalidHeaderSyntax { pos: usize, reason: &'static str },
    #[error("Missing \"{0}\" in challenge")]
    MissingRequired(&'static str),
    #[error("Empty or missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("Unsupported qop: {0}")]
    UnsupportedQop(String),
    #[error("Encoded credential length overflows for {0} input bytes")]
    EncodedLength(usize),
    #[cfg(feature = "http")]
    #[error("Credential is not a valid header value")]
    InvalidHeaderValue,
}

pub type Result<T> = result::Result<T, Error>;

#[cfg(feature = "http")]
impl From<http::header::InvalidHeaderValue> for Error {
    fn from(_: http::header::InvalidHeaderValue) -> Self {
        Error::InvalidHeaderValue
    }
}
