use async_trait::async_trait;
use thiserror::Error;

use crate::core::catalog::CatalogError;
use crate::models::{StockId, StockLot};

/// Smallest quantity the ledger tracks (1 mg)
///
/// Quantities are snapped to this grid after every mutation, so reserving and
/// then releasing the same amount restores the previous value exactly.
pub const QUANTITY_RESOLUTION_KG: f64 = 1e-6;

const STEPS_PER_KG: f64 = 1e6;

/// Errors raised by reservation accounting
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("Insufficient stock in lot {stock_id}: required {required_kg} kg, available {available_kg} kg")]
    InsufficientStock {
        stock_id: StockId,
        required_kg: f64,
        available_kg: f64,
    },

    #[error("Invalid release from lot {stock_id}: reserved {reserved_kg} kg, requested {requested_kg} kg")]
    InvalidRelease {
        stock_id: StockId,
        reserved_kg: f64,
        requested_kg: f64,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] CatalogError),
}

impl LedgerError {
    pub fn unknown_stock(stock_id: StockId) -> Self {
        LedgerError::InvalidArgument {
            reason: format!("unknown stock lot {}", stock_id),
        }
    }
}

/// Atomic reservation accounting, keyed by stock lot
///
/// Calls against the same lot must be serialized by the implementation;
/// calls against different lots must not block each other.
#[async_trait]
pub trait StockLedger: Send + Sync {
    /// Move `quantity_kg` from available to reserved
    async fn reserve(&self, stock_id: StockId, quantity_kg: f64) -> Result<StockLot, LedgerError>;

    /// Return `quantity_kg` of a previous reservation to available
    async fn release(&self, stock_id: StockId, quantity_kg: f64) -> Result<StockLot, LedgerError>;

    /// Current state of a lot
    async fn stock_lot(&self, stock_id: StockId) -> Result<Option<StockLot>, LedgerError>;
}

/// Snap a quantity onto the ledger grid
#[inline]
pub fn normalize_quantity(kg: f64) -> f64 {
    (kg * STEPS_PER_KG).round() / STEPS_PER_KG
}

/// Check that a reserve/release quantity is a usable positive amount
pub fn validate_quantity(quantity_kg: f64) -> Result<f64, LedgerError> {
    if !quantity_kg.is_finite() {
        return Err(LedgerError::InvalidArgument {
            reason: format!("quantity must be a finite number, got {}", quantity_kg),
        });
    }

    let normalized = normalize_quantity(quantity_kg);
    if normalized <= 0.0 {
        return Err(LedgerError::InvalidArgument {
            reason: format!("quantity must be greater than zero, got {} kg", quantity_kg),
        });
    }

    Ok(normalized)
}

/// Whether the lot's unreserved quantity covers `required_kg`
#[inline]
pub fn has_enough_stock(lot: &StockLot, required_kg: f64) -> bool {
    normalize_quantity(lot.available_quantity_kg()) >= normalize_quantity(required_kg)
}

/// Apply a reservation to a lot the caller holds exclusively
///
/// Leaves the lot untouched on error.
pub fn apply_reserve(lot: &mut StockLot, quantity_kg: f64) -> Result<(), LedgerError> {
    let quantity = validate_quantity(quantity_kg)?;

    if !has_enough_stock(lot, quantity) {
        return Err(LedgerError::InsufficientStock {
            stock_id: lot.id,
            required_kg: quantity,
            available_kg: normalize_quantity(lot.available_quantity_kg()),
        });
    }

    lot.reserved_kg = normalize_quantity(lot.reserved_kg + quantity).min(lot.quantity_kg);
    Ok(())
}

/// Apply a release to a lot the caller holds exclusively
///
/// Leaves the lot untouched on error.
pub fn apply_release(lot: &mut StockLot, quantity_kg: f64) -> Result<(), LedgerError> {
    let quantity = validate_quantity(quantity_kg)?;
    let reserved = normalize_quantity(lot.reserved_kg);

    if reserved < quantity {
        return Err(LedgerError::InvalidRelease {
            stock_id: lot.id,
            reserved_kg: reserved,
            requested_kg: quantity,
        });
    }

    lot.reserved_kg = normalize_quantity(reserved - quantity).max(0.0);
    Ok(())
}
