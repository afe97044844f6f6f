//! Daily task domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{Collection, TenantEntity};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Todo,
    Done,
}

/// Eisenhower priority quadrant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    UrgentImportant,
    NotUrgentImportant,
    UrgentNotImportant,
    NotUrgentNotImportant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub assignee_id: Uuid,
    pub reporter_id: Uuid,
    pub due_date: NaiveDate,
    pub status: TaskStatus,
    #[serde(default)]
    pub quadrant: Option<Quadrant>,
    /// Minutes.
    #[serde(default)]
    pub expected_time: Option<u32>,
    /// Minutes.
    #[serde(default)]
    pub actual_time: Option<u32>,
    #[serde(default)]
    pub result_id: Option<Uuid>,
    /// Set when the task was generated from a template.
    #[serde(default)]
    pub template_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub assignee_id: Uuid,
    pub reporter_id: Uuid,
    pub due_date: NaiveDate,
    pub status: TaskStatus,
    pub quadrant: Option<Quadrant>,
    pub expected_time: Option<u32>,
    pub actual_time: Option<u32>,
    pub result_id: Option<Uuid>,
    pub template_id: Option<Uuid>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, assignee_id: Uuid, reporter_id: Uuid, due_date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            description: None,
            assignee_id,
            reporter_id,
            due_date,
            status: TaskStatus::Todo,
            quadrant: None,
            expected_time: None,
            actual_time: None,
            result_id: None,
            template_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quadrant: Option<Option<Quadrant>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_time: Option<Option<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_time: Option<Option<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_id: Option<Option<Uuid>>,
}

impl TenantEntity for Task {
    const COLLECTION: Collection = Collection::Tasks;
    const ENTITY: &'static str = "task";
    type New = NewTask;
    type Patch = TaskPatch;
}
