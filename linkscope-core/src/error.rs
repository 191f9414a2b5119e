use linkscope_scanner::ScanError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    /// The page's own URL is unusable; nothing else can be resolved against it.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Invalid audit options: {0}")]
    InvalidOptions(String),

    #[error("Failed to fetch page {url}: {reason}")]
    PageFetch { url: String, reason: String },

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AuditError>;
