//! FINEKO Core: domain models, error types, and the data-access
//! abstractions shared by every other crate.

pub mod context;
pub mod error;
pub mod models;
pub mod repository;
pub mod service;
pub mod store;
pub mod summary;

pub use context::TenantContext;
pub use error::{FinekoError, FinekoResult};
pub use store::{Collection, Document, DocumentStore, TenantEntity};
pub use summary::SummaryValue;
