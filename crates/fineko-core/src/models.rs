//! Domain models for FINEKO.
//!
//! Global records (users, companies, employees, sessions) are served by
//! typed repositories. Everything else is a tenant-scoped document that
//! carries `companyId` and goes through the [`DocumentStore`](crate::store::DocumentStore).

pub mod audit;
pub mod company;
pub mod employee;
pub mod knowledge;
pub mod org;
pub mod result;
pub mod session;
pub mod task;
pub mod telegram;
pub mod template;
pub mod user;
