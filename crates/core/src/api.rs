use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `GET /api/health` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// Error body returned by the bandwidth service on non-2xx responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// `"{error}: {message}"`, or just the error when there is no message.
    pub fn describe(&self) -> String {
        match &self.message {
            Some(message) => format!("{}: {}", self.error, message),
            None => self.error.clone(),
        }
    }
}
