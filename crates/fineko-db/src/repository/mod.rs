//! SurrealDB repository implementations.

mod company;
mod employee;
mod session;
mod user;

pub use company::SurrealCompanyRepository;
pub use employee::SurrealEmployeeRepository;
pub use session::SurrealSessionRepository;
pub use user::SurrealUserRepository;
