//! Error types for the FINEKO core.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinekoError {
    /// Missing entity, or an entity owned by another company. The two cases
    /// are never distinguished to the caller.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Generic storage failure. Internal detail is logged, not carried.
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Tenant context missing or invalid")]
    TenantContext,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FinekoError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for FinekoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type FinekoResult<T> = Result<T, FinekoError>;
