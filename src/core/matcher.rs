use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use validator::Validate;

use crate::core::{
    catalog::SupplierCatalog,
    distance::round_distance,
    error::MatchError,
    geocoding::Geocoder,
    ledger::validate_quantity,
};
use crate::models::{
    CandidateQuery, Coordinates, MatchRequest, StockSummary, SupplierCandidate, SupplierSummary,
};

/// Confirmation sent with every successful match
pub const MATCH_SUCCESS_MESSAGE: &str = "Closest supplier found successfully";

/// Decimal places kept in the reported distance
pub const DISTANCE_DECIMALS: u32 = 2;

/// Closest supplier able to fill a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub supplier: SupplierSummary,
    #[serde(rename = "availableStock")]
    pub available_stock: StockSummary,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
    pub message: String,
}

/// Tunables for the matcher
#[derive(Debug, Clone, Copy)]
pub struct MatcherSettings {
    /// How many ranked candidates to pull from the catalog
    pub candidate_limit: usize,
}

impl Default for MatcherSettings {
    fn default() -> Self {
        Self {
            candidate_limit: 10,
        }
    }
}

/// Finds the nearest eligible supplier for a filament request
///
/// # Pipeline Stages
/// 1. Request validation (nothing external is called for a bad request)
/// 2. Geocoding of the buyer address when coordinates are missing
/// 3. Catalog query for eligible supplier/stock candidates
/// 4. Nearest-candidate selection with a deterministic tie-break
/// 5. Stock lot resolution for the selected candidate
///
/// Matching never reserves stock; callers reserve through a
/// [`StockLedger`](crate::core::StockLedger) once they accept a match.
#[derive(Clone)]
pub struct SupplierMatcher {
    catalog: Arc<dyn SupplierCatalog>,
    geocoder: Arc<dyn Geocoder>,
    settings: MatcherSettings,
}

impl SupplierMatcher {
    pub fn new(
        catalog: Arc<dyn SupplierCatalog>,
        geocoder: Arc<dyn Geocoder>,
        settings: MatcherSettings,
    ) -> Self {
        Self {
            catalog,
            geocoder,
            settings,
        }
    }

    pub fn with_default_settings(
        catalog: Arc<dyn SupplierCatalog>,
        geocoder: Arc<dyn Geocoder>,
    ) -> Self {
        Self::new(catalog, geocoder, MatcherSettings::default())
    }

    /// Find the closest supplier holding enough of the requested filament
    ///
    /// # Returns
    /// The match, or a [`MatchError`] naming exactly why none was produced
    pub async fn find_closest_supplier(
        &self,
        request: &MatchRequest,
    ) -> Result<MatchResult, MatchError> {
        let validated = validate_request(request)?;

        let origin = match validated.coordinates {
            Some(coordinates) => coordinates,
            None => self.geocode_buyer(&request.buyer_address).await?,
        };

        let query = CandidateQuery {
            material_type: request.material_type,
            color: request.color.clone(),
            required_kg: validated.required_kg,
            origin,
            limit: self.settings.candidate_limit.max(1),
        };

        let candidates = self.catalog.find_candidates(&query).await?;

        tracing::debug!(
            "Catalog returned {} candidates for {} {} ({} kg)",
            candidates.len(),
            query.material_type,
            query.color,
            query.required_kg
        );

        let selected = select_closest(&candidates).ok_or_else(|| {
            tracing::info!(
                "No supplier found for {} {} ({} kg)",
                query.material_type,
                query.color,
                query.required_kg
            );
            MatchError::SupplierNotFound {
                material_type: query.material_type,
                color: query.color.clone(),
                required_kg: query.required_kg,
            }
        })?;

        let inconsistency = || {
            tracing::error!(
                "Stock lot {} matched for supplier {} could not be resolved",
                selected.stock_id,
                selected.supplier.id
            );
            MatchError::StockDataInconsistency {
                supplier_id: selected.supplier.id,
                stock_id: selected.stock_id,
            }
        };

        let stock = self
            .catalog
            .find_stock(selected.stock_id)
            .await?
            .filter(|lot| lot.supplier_id == selected.supplier.id)
            .ok_or_else(inconsistency)?;

        tracing::info!(
            "Matched supplier {} (stock lot {}) at {:.3} km",
            selected.supplier.id,
            stock.id,
            selected.distance_km
        );

        Ok(MatchResult {
            supplier: selected.supplier.clone(),
            available_stock: StockSummary::from(&stock),
            distance_km: round_distance(selected.distance_km, DISTANCE_DECIMALS),
            message: MATCH_SUCCESS_MESSAGE.to_string(),
        })
    }

    async fn geocode_buyer(&self, address: &str) -> Result<Coordinates, MatchError> {
        let failed = |reason: String| {
            tracing::warn!("Geocoding failed for '{}': {}", address, reason);
            MatchError::GeocodingFailed {
                address: address.to_string(),
                reason,
            }
        };

        let coordinates = self
            .geocoder
            .geocode(address)
            .await
            .map_err(|e| failed(e.to_string()))?;

        if !coordinates.is_valid() {
            return Err(failed(format!(
                "geocoder returned out-of-range coordinates ({}, {})",
                coordinates.latitude, coordinates.longitude
            )));
        }

        Ok(coordinates)
    }
}

/// Match request after validation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedRequest {
    /// Buyer location when both coordinates were supplied
    pub coordinates: Option<Coordinates>,
    /// Required quantity on the ledger's 1 mg grid
    pub required_kg: f64,
}

/// Validate a match request before anything external is consulted
///
/// The required quantity is normalized the same way the ledger normalizes
/// reservations, so a matched lot can always take the reservation.
pub fn validate_request(request: &MatchRequest) -> Result<ValidatedRequest, MatchError> {
    request
        .validate()
        .map_err(|errors| MatchError::invalid(errors.to_string()))?;

    if request.color.trim().is_empty() {
        return Err(MatchError::invalid("color must not be blank"));
    }

    if request.buyer_address.trim().is_empty() {
        return Err(MatchError::invalid("buyer address must not be blank"));
    }

    let required_kg = validate_quantity(request.required_quantity_kg).map_err(|_| {
        MatchError::invalid(format!(
            "required quantity must be at least 1 mg, got {} kg",
            request.required_quantity_kg
        ))
    })?;

    let coordinates = match (request.buyer_latitude, request.buyer_longitude) {
        (Some(latitude), Some(longitude)) => {
            let coordinates = Coordinates::new(latitude, longitude);
            if !coordinates.is_valid() {
                return Err(MatchError::invalid(format!(
                    "buyer coordinates out of range: ({}, {})",
                    latitude, longitude
                )));
            }
            Some(coordinates)
        }
        (None, None) => None,
        _ => {
            return Err(MatchError::invalid(
                "buyer latitude and longitude must be provided together",
            ))
        }
    };

    Ok(ValidatedRequest {
        coordinates,
        required_kg,
    })
}

/// Ordering used for selection: distance, then supplier id, then stock id
pub fn compare_candidates(a: &SupplierCandidate, b: &SupplierCandidate) -> Ordering {
    a.distance_km
        .total_cmp(&b.distance_km)
        .then_with(|| a.supplier.id.cmp(&b.supplier.id))
        .then_with(|| a.stock_id.cmp(&b.stock_id))
}

/// Pick the nearest candidate; equidistant candidates go to the lowest supplier id
pub fn select_closest(candidates: &[SupplierCandidate]) -> Option<&SupplierCandidate> {
    candidates.iter().min_by(|a, b| compare_candidates(a, b))
}
