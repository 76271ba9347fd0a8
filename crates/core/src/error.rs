use thiserror::Error;

/// Failure of a single provider fetch.
///
/// Every variant renders to the human-readable message stored in
/// [`crate::FetchState::error`].
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, connect, timeout, body read).
    #[error("request failed: {0}")]
    Http(String),

    /// The provider answered with a non-success status.
    #[error("{message} (HTTP {status})")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message taken from the response body when available.
        message: String,
    },

    /// The payload could not be mapped into a display model.
    #[error("malformed response: {0}")]
    Decode(String),

    /// A required setting (API key, base URL) is absent.
    #[error("{0} not configured")]
    MissingConfig(&'static str),

    /// Every feed of a multi-feed provider failed in the same cycle.
    #[error("all {0} feeds failed")]
    AllSourcesFailed(&'static str),
}

impl From<serde_json::Error> for FetchError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}
