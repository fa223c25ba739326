use serde::{Deserialize, Serialize};

/// Body returned when no supplier could be matched
///
/// Sent with a 200 status: an unmatched request is a business outcome, not a
/// transport failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchFailureResponse {
    pub message: String,
}

impl MatchFailureResponse {
    pub fn new(reason: impl std::fmt::Display) -> Self {
        Self {
            message: format!("No suitable supplier found: {}", reason),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
