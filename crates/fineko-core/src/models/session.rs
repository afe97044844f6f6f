//! Session domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SessionKind {
    /// Short-lived, issued after chat-platform login. Only good for
    /// listing, selecting or creating a company.
    Temp,
    /// Long-lived, bound to one company.
    Permanent,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Temp => "Temp",
            SessionKind::Permanent => "Permanent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Temp" => Some(SessionKind::Temp),
            "Permanent" => Some(SessionKind::Permanent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    /// `None` for temp sessions.
    pub company_id: Option<Uuid>,
    pub kind: SessionKind,
    /// SHA-256 of the opaque temp token. Permanent sessions are looked up
    /// by id instead.
    pub token_hash: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSession {
    pub user_id: Uuid,
    pub company_id: Option<Uuid>,
    pub kind: SessionKind,
    pub token_hash: Option<String>,
    pub expires_at: DateTime<Utc>,
}
