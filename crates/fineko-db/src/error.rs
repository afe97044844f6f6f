//! Database-specific error types and conversions.

use fineko_core::error::FinekoError;
use tracing::error;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    /// A statement inside an otherwise delivered query failed.
    #[error("Query failed: {0}")]
    Query(String),

    #[error("Stored value could not be decoded: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl DbError {
    /// The database reported that the queried table does not exist.
    ///
    /// A brand-new company has no documents yet, so callers treat this as
    /// an empty result rather than a failure.
    pub fn is_missing_collection(&self) -> bool {
        match self {
            DbError::Surreal(e) => {
                let msg = e.to_string();
                msg.contains("table") && msg.contains("does not exist")
            }
            _ => false,
        }
    }
}

impl From<DbError> for FinekoError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => FinekoError::NotFound { entity, id },
            other => {
                error!(error = %other, "Database operation failed");
                FinekoError::Database("storage operation failed".into())
            }
        }
    }
}

/// Parse a UUID stored as a string column.
pub(crate) fn parse_uuid(raw: &str, what: &str) -> Result<uuid::Uuid, DbError> {
    uuid::Uuid::parse_str(raw).map_err(|e| DbError::Decode(format!("invalid {what} UUID: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_failures_are_opaque_to_callers() {
        let err = FinekoError::from(DbError::Query("Found 'boom' for field `position`".into()));
        match err {
            FinekoError::Database(msg) => assert!(!msg.contains("boom")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn not_found_passes_through() {
        let err = FinekoError::from(DbError::NotFound {
            entity: "session".into(),
            id: "token".into(),
        });
        assert!(matches!(err, FinekoError::NotFound { .. }));
    }
}
