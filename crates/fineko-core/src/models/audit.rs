//! Business audit interview domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{Collection, TenantEntity};
use crate::summary::SummaryValue;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
            at: Utc::now(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
            at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkPlanStep {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub timeframe: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkPlan {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub steps: Vec<WorkPlanStep>,
    #[serde(default = "Utc::now")]
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditStatus {
    InProgress,
    /// Every interview section answered; waiting for finalization.
    AiComplete,
    /// Work plan generated. Terminal.
    Finalized,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    pub id: Uuid,
    pub company_id: Uuid,
    pub created_by: Uuid,
    #[serde(default)]
    pub conversation: Vec<ConversationTurn>,
    #[serde(default)]
    pub summary: SummaryValue,
    #[serde(default)]
    pub work_plan: Option<WorkPlan>,
    #[serde(default)]
    pub is_ai_complete: bool,
    #[serde(default)]
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Audit {
    pub fn status(&self) -> AuditStatus {
        if self.is_completed {
            AuditStatus::Finalized
        } else if self.is_ai_complete {
            AuditStatus::AiComplete
        } else {
            AuditStatus::InProgress
        }
    }

    pub fn last_turn(&self) -> Option<&ConversationTurn> {
        self.conversation.last()
    }

    pub fn model_turns(&self) -> usize {
        self.conversation
            .iter()
            .filter(|t| t.role == TurnRole::Model)
            .count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAudit {
    pub created_by: Uuid,
    pub conversation: Vec<ConversationTurn>,
    pub summary: SummaryValue,
    pub is_ai_complete: bool,
    pub is_completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AuditPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation: Option<Vec<ConversationTurn>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_plan: Option<WorkPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_ai_complete: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
}

impl TenantEntity for Audit {
    const COLLECTION: Collection = Collection::Audits;
    const ENTITY: &'static str = "audit";
    type New = NewAudit;
    type Patch = AuditPatch;
}
