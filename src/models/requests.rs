use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::MaterialType;

/// Request to find the closest supplier able to fill an order
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MatchRequest {
    #[serde(alias = "material_type", rename = "materialType")]
    pub material_type: MaterialType,
    #[validate(length(min = 1))]
    #[serde(default)]
    pub color: String,
    #[serde(alias = "required_quantity_kg", rename = "requiredQuantityKg")]
    pub required_quantity_kg: f64,
    #[validate(length(min = 1))]
    #[serde(alias = "buyer_address", rename = "buyerAddress", default)]
    pub buyer_address: String,
    #[serde(alias = "buyer_latitude", rename = "buyerLatitude", default)]
    pub buyer_latitude: Option<f64>,
    #[serde(alias = "buyer_longitude", rename = "buyerLongitude", default)]
    pub buyer_longitude: Option<f64>,
}

/// Request body for reserve/release
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockQuantityRequest {
    #[serde(alias = "quantity_kg", rename = "quantityKg")]
    pub quantity_kg: f64,
}
