//! Filament Match - closest-supplier matching for 3D-printing filament
//!
//! Given a material, color and quantity, finds the nearest verified supplier
//! holding enough unreserved stock, and provides atomic reserve/release
//! accounting over individual stock lots.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{
    haversine_distance, round_distance, LedgerError, MatchError, MatchResult, StockLedger,
    SupplierCatalog, SupplierMatcher,
};
pub use models::{MatchRequest, MaterialType, StockLot, Supplier};
