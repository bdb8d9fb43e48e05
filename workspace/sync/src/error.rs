use thiserror::Error;

/// Failure of a single call to the server.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request never completed: connection refused, reset or timed out.
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered but did not accept the request, or the answer could not be decoded.
    #[error("Rejected by server ({status}): {message}")]
    Rejected {
        status: u16,
        code: Option<String>,
        message: String,
    },
}

impl TransportError {
    pub fn is_network(&self) -> bool {
        matches!(self, TransportError::Network(_))
    }
}

/// Errors raised while setting up the client.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}
