//! Error types for model calls and the audit workflow.

use fineko_core::error::FinekoError;
use thiserror::Error;
use uuid::Uuid;

/// Failure of a language-model call.
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    #[error("model request failed: {0}")]
    RequestFailed(String),

    #[error("rate limited")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("network error: {0}")]
    NetworkError(String),

    #[error("could not parse model output: {0}")]
    ParseError(String),

    #[error("model returned no text")]
    EmptyResponse,
}

/// Failure of an audit operation.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit {0} not found")]
    NotFound(Uuid),

    /// Speech could not be turned into text. Nothing was saved.
    #[error("transcription failed: {0}")]
    Transcription(LlmError),

    #[error("audit is already finalized")]
    AlreadyFinalized,

    #[error("audit has no user answer to process")]
    NothingToProcess,

    #[error("model call failed: {0}")]
    Generation(LlmError),

    #[error(transparent)]
    Store(#[from] FinekoError),
}

impl From<LlmError> for FinekoError {
    fn from(err: LlmError) -> Self {
        FinekoError::ExternalService(err.to_string())
    }
}

impl From<AuditError> for FinekoError {
    fn from(err: AuditError) -> Self {
        match err {
            AuditError::NotFound(id) => FinekoError::not_found("audit", id),
            AuditError::AlreadyFinalized | AuditError::NothingToProcess => {
                FinekoError::validation(err.to_string())
            }
            AuditError::Transcription(e) | AuditError::Generation(e) => e.into(),
            AuditError::Store(e) => e,
        }
    }
}
