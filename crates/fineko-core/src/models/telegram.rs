//! Chat-platform groups linked to a company, their members, and the log
//! of messages the bot interpreted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{Collection, TenantEntity};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramGroup {
    pub id: Uuid,
    pub company_id: Uuid,
    pub chat_id: i64,
    pub title: String,
    pub linked_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTelegramGroup {
    pub chat_id: i64,
    pub title: String,
    pub linked_by: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TelegramGroupPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl TenantEntity for TelegramGroup {
    const COLLECTION: Collection = Collection::TelegramGroups;
    const ENTITY: &'static str = "telegram group";
    type New = NewTelegramGroup;
    type Patch = TelegramGroupPatch;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramMember {
    pub id: Uuid,
    pub company_id: Uuid,
    pub group_id: Uuid,
    pub telegram_user_id: i64,
    #[serde(default)]
    pub username: Option<String>,
    /// Set once the chat user is matched to an employee.
    #[serde(default)]
    pub employee_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTelegramMember {
    pub group_id: Uuid,
    pub telegram_user_id: i64,
    pub username: Option<String>,
    pub employee_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TelegramMemberPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<Option<Uuid>>,
}

impl TenantEntity for TelegramMember {
    const COLLECTION: Collection = Collection::TelegramMembers;
    const ENTITY: &'static str = "telegram member";
    type New = NewTelegramMember;
    type Patch = TelegramMemberPatch;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramMessageLog {
    pub id: Uuid,
    pub company_id: Uuid,
    #[serde(default)]
    pub group_id: Option<Uuid>,
    pub telegram_user_id: i64,
    pub text: String,
    /// Command name the interpreter produced, e.g. `create_task`.
    #[serde(default)]
    pub command: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTelegramMessageLog {
    pub group_id: Option<Uuid>,
    pub telegram_user_id: i64,
    pub text: String,
    pub command: Option<String>,
}

/// Message logs are append-only; the patch type has no fields.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TelegramMessageLogPatch {}

impl TenantEntity for TelegramMessageLog {
    const COLLECTION: Collection = Collection::TelegramMessageLogs;
    const ENTITY: &'static str = "telegram message log";
    type New = NewTelegramMessageLog;
    type Patch = TelegramMessageLogPatch;
}
