//! Authentication error types.

use fineko_core::error::FinekoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("session has expired")]
    SessionExpired,

    #[error("session is invalid or has been revoked")]
    SessionInvalid,

    #[error("session cannot be used for this operation")]
    WrongSessionKind,

    #[error("user is not a member of this company")]
    NotMember,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for FinekoError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::NotMember => FinekoError::Forbidden {
                reason: err.to_string(),
            },
            AuthError::Crypto(msg) => FinekoError::Internal(format!("crypto: {msg}")),
            AuthError::SessionExpired
            | AuthError::SessionInvalid
            | AuthError::WrongSessionKind
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_) => FinekoError::AuthenticationFailed {
                reason: err.to_string(),
            },
        }
    }
}
