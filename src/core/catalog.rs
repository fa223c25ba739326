use async_trait::async_trait;
use thiserror::Error;

use crate::models::{CandidateQuery, StockId, StockLot, SupplierCandidate};

/// Errors raised by catalog/ledger storage backends
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Read side of supplier/stock storage used by the matcher
///
/// Implementations own the eligibility join: only suppliers that are active,
/// verified and located, holding an available lot of the requested material and
/// exact color with at least `required_kg` unreserved, may be returned.
/// Results should come back nearest first and at most `query.limit` long; the
/// matcher still applies its own ordering, so a backend that can only
/// approximate the ranking (e.g. a spatial index) is acceptable.
#[async_trait]
pub trait SupplierCatalog: Send + Sync {
    /// Eligible candidates with their distance from `query.origin`
    async fn find_candidates(
        &self,
        query: &CandidateQuery,
    ) -> Result<Vec<SupplierCandidate>, CatalogError>;

    /// Load a single stock lot by id
    async fn find_stock(&self, stock_id: StockId) -> Result<Option<StockLot>, CatalogError>;

    /// Whether the backing store is reachable
    async fn health_check(&self) -> Result<bool, CatalogError> {
        Ok(true)
    }
}
