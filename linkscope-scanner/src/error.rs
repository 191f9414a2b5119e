use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    ParseError(String),
}

pub type Result<T> = std::result::Result<T, ScanError>;

/// Transport-level failure of a single fetch.
///
/// Anything that produced an HTTP status line is *not* a `FetchError`; 4xx and
/// 5xx responses are terminal answers and are recorded as such.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("too many redirects (limit {0})")]
    TooManyRedirects(usize),

    #[error("invalid redirect location: {0}")]
    InvalidRedirect(String),

    #[error("request failed: {0}")]
    Request(String),
}
