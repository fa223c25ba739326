// Core algorithm exports
pub mod catalog;
pub mod distance;
pub mod error;
pub mod filters;
pub mod geocoding;
pub mod ledger;
pub mod matcher;

pub use catalog::{CatalogError, SupplierCatalog};
pub use distance::{haversine_distance, round_distance};
pub use error::MatchError;
pub use filters::{is_eligible_supplier, matches_stock_criteria};
pub use geocoding::{Geocoder, GeocodingError};
pub use ledger::{has_enough_stock, LedgerError, StockLedger};
pub use matcher::{select_closest, MatchResult, MatcherSettings, SupplierMatcher, ValidatedRequest};
