use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::core::geocoding::{Geocoder, GeocodingError};
use crate::models::Coordinates;
use crate::services::cache::{CacheError, CacheKey, CacheManager};

/// One entry of a Nominatim `/search` response
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

/// Geocoding client for Nominatim-compatible search APIs
///
/// Lookups are made once with the configured timeout; a timeout or transport
/// error is returned to the caller, never retried here.
pub struct NominatimClient {
    base_url: String,
    client: Client,
    cache: Option<Arc<CacheManager>>,
}

impl NominatimClient {
    /// Create a new geocoding client
    pub fn new(
        base_url: String,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, GeocodingError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            base_url,
            client,
            cache: None,
        })
    }

    /// Cache resolved addresses in the given cache
    pub fn with_cache(mut self, cache: Arc<CacheManager>) -> Self {
        self.cache = Some(cache);
        self
    }

    async fn search(&self, address: &str) -> Result<Coordinates, GeocodingError> {
        let url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(address)
        );

        tracing::debug!("Geocoding address via: {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(GeocodingError::Api(format!(
                "Geocoding request failed: {}",
                response.status()
            )));
        }

        let places: Vec<Place> = response
            .json()
            .await
            .map_err(|e| GeocodingError::InvalidResponse(format!("Failed to parse places: {}", e)))?;

        let place = places
            .into_iter()
            .next()
            .ok_or_else(|| GeocodingError::NoResults(address.to_string()))?;

        let latitude: f64 = place
            .lat
            .parse()
            .map_err(|_| GeocodingError::InvalidResponse(format!("Invalid latitude '{}'", place.lat)))?;
        let longitude: f64 = place
            .lon
            .parse()
            .map_err(|_| GeocodingError::InvalidResponse(format!("Invalid longitude '{}'", place.lon)))?;

        tracing::debug!(
            "Geocoded '{}' to ({}, {}) [{}]",
            address,
            latitude,
            longitude,
            place.display_name.as_deref().unwrap_or("unnamed")
        );

        Ok(Coordinates::new(latitude, longitude))
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn geocode(&self, address: &str) -> Result<Coordinates, GeocodingError> {
        let key = CacheKey::geocode(address);

        if let Some(cache) = &self.cache {
            match cache.get::<Coordinates>(&key).await {
                Ok(coordinates) => return Ok(coordinates),
                Err(CacheError::CacheMiss(_)) => {}
                Err(e) => tracing::warn!("Geocode cache read failed for {}: {}", key, e),
            }
        }

        let coordinates = self.search(address).await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(&key, &coordinates).await {
                tracing::warn!("Geocode cache write failed for {}: {}", key, e);
            }
        }

        Ok(coordinates)
    }
}
