pub mod fixture;
pub mod manager;
pub mod models;
pub mod postgres;
pub mod sqlite;
pub mod store;

pub use fixture::CatalogData;
pub use manager::{DatabaseError, DatabaseManager, DatabaseResult};
pub use postgres::PgCatalog;
pub use sqlite::SqliteCatalog;
pub use store::{schema_statements, CatalogSession, CatalogStore, CATALOG_TABLES};
