use thiserror::Error;

use crate::core::catalog::CatalogError;
use crate::models::{MaterialType, StockId, SupplierId};

/// Outcome of a failed supplier match
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("no supplier has {required_kg} kg of {material_type} in color '{color}' available")]
    SupplierNotFound {
        material_type: MaterialType,
        color: String,
        required_kg: f64,
    },

    #[error("stock data inconsistency: supplier {supplier_id} matched stock lot {stock_id}, which could not be resolved")]
    StockDataInconsistency {
        supplier_id: SupplierId,
        stock_id: StockId,
    },

    #[error("could not geocode address '{address}': {reason}")]
    GeocodingFailed { address: String, reason: String },

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

impl MatchError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        MatchError::InvalidArgument { reason: reason.into() }
    }

    /// Expected business outcomes, reported to buyers as an unmatched request
    pub fn is_unmatched(&self) -> bool {
        matches!(
            self,
            MatchError::SupplierNotFound { .. } | MatchError::GeocodingFailed { .. }
        )
    }
}
