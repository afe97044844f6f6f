//! FINEKO Auth: chat-platform login, company selection and
//! company-scoped sessions.

pub mod config;
pub mod error;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use service::{AuthService, MembershipRemoval, ScopedLogin, TempLogin};
pub use token::SessionClaims;
