//! Error types

use thiserror::Error;

/// Fatal parse failure: the page yielded no usable script data at all.
/// Individual field misses are never errors, they degrade to null.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no usable script data blocks found in page")]
    NoScriptData,
}

/// Top-level error for the fetch-and-extract path.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("request failed: {0}")]
    Http(Box<ureq::Error>),
    #[error("invalid request url: {0}")]
    Url(#[from] url::ParseError),
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        Error::Http(Box::new(err))
    }
}
