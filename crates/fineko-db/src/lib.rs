//! FINEKO Database: SurrealDB connection management, schema
//! migrations, the tenant-safe document store and the typed repositories.

mod connection;
mod error;
mod schema;
mod store;

pub mod repository;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::{latest_version, run_migrations};
pub use store::SurrealDocumentStore;
