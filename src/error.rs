use thiserror::Error;

/// Failures of the local key-value storage.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failures of a price lookup. Every variant means "no price this cycle".
#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("quote request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("quote endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("quote response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failures of the outbound email call. Logged, never surfaced.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("email service is not configured")]
    NotConfigured,

    #[error("email request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("email service returned {status}: {body}")]
    Status { status: u16, body: String },
}
