// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    CandidateQuery, Coordinates, MaterialType, StockId, StockLot, StockSummary, Supplier,
    SupplierCandidate, SupplierId, SupplierSummary,
};
pub use requests::{MatchRequest, StockQuantityRequest};
pub use responses::{ErrorResponse, HealthResponse, MatchFailureResponse};
