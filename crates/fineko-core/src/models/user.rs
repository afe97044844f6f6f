//! User domain model.
//!
//! Users are global: one person may belong to several companies through
//! [`Employee`](super::employee::Employee) links.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Numeric id assigned by the chat platform. Immutable.
    pub telegram_id: i64,
    /// Chat-platform username. Immutable.
    pub username: Option<String>,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Identity as supplied by the chat-platform login widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramIdentity {
    pub id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub photo_url: Option<String>,
}

impl TelegramIdentity {
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.trim().is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl From<&TelegramIdentity> for CreateUser {
    fn from(identity: &TelegramIdentity) -> Self {
        Self {
            telegram_id: identity.id,
            username: identity.username.clone(),
            display_name: identity.display_name(),
            avatar_url: identity.photo_url.clone(),
        }
    }
}

/// Mutable profile fields. Identity fields have no counterpart here.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUser {
    pub display_name: Option<String>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub avatar_url: Option<Option<String>>,
}
