// Service exports
pub mod cache;
pub mod geocoding;
pub mod memory;
pub mod postgres;

pub use cache::{CacheError, CacheKey, CacheManager};
pub use geocoding::NominatimClient;
pub use memory::InMemoryInventory;
pub use postgres::PostgresClient;
