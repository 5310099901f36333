#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to encode request body for {url}: {source}")]
    Encode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("api request to {url} failed: {reason}")]
    Request { url: String, reason: String },
    #[error("api call to {url} failed with status {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("failed to read response body from {url}: {source}")]
    ReadBody {
        url: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode response from {url}: {reason} (response body: {body})")]
    Decode {
        url: String,
        reason: String,
        body: String,
    },
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
