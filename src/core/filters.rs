use crate::core::ledger::has_enough_stock;
use crate::models::{CandidateQuery, StockLot, Supplier};

/// Check if a supplier may be offered to buyers at all
///
/// Suppliers must be active, verified and have a known location.
#[inline]
pub fn is_eligible_supplier(supplier: &Supplier) -> bool {
    supplier.active && supplier.verified && supplier.coordinates().is_some()
}

/// Check if a stock lot can fill the queried order on its own
///
/// Color comparison is exact and case-sensitive.
#[inline]
pub fn matches_stock_criteria(lot: &StockLot, query: &CandidateQuery) -> bool {
    if !lot.available {
        return false;
    }

    if lot.material_type != query.material_type || lot.color != query.color {
        return false;
    }

    has_enough_stock(lot, query.required_kg)
}
