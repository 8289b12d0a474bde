// Service exports
pub mod cache;
pub mod catalog;
pub mod postgres;

pub use cache::{CacheError, CacheKey, CacheManager};
pub use catalog::{CatalogClient, CatalogError, CatalogTables};
pub use postgres::{NewResult, PostgresClient, PostgresError};
