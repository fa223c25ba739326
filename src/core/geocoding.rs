use async_trait::async_trait;
use thiserror::Error;

use crate::models::Coordinates;

/// Errors that can occur while resolving an address
#[derive(Debug, Error)]
pub enum GeocodingError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    Api(String),

    #[error("No results for address: {0}")]
    NoResults(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Resolves a free-text address into coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Coordinates, GeocodingError>;
}
