//! Task-specific queries and transitions.

use chrono::NaiveDate;
use serde_json::Value;
use uuid::Uuid;

use crate::context::TenantContext;
use crate::error::FinekoResult;
use crate::models::task::{Task, TaskPatch, TaskStatus};
use crate::store::DocumentStore;

use super::EntityService;

impl<S: DocumentStore> EntityService<S, Task> {
    /// Tasks due on `date`, across all assignees.
    pub async fn list_for_day(&self, ctx: &TenantContext, date: NaiveDate) -> FinekoResult<Vec<Task>> {
        self.list_where(ctx, "dueDate", Value::String(date.to_string()))
            .await
    }

    pub async fn list_for_result(&self, ctx: &TenantContext, result_id: Uuid) -> FinekoResult<Vec<Task>> {
        self.list_where(ctx, "resultId", Value::String(result_id.to_string()))
            .await
    }

    pub async fn list_for_assignee(
        &self,
        ctx: &TenantContext,
        assignee_id: Uuid,
    ) -> FinekoResult<Vec<Task>> {
        self.list_where(ctx, "assigneeId", Value::String(assignee_id.to_string()))
            .await
    }

    /// Mark a task done (recording the actual minutes spent) or reopen it.
    pub async fn set_status(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        status: TaskStatus,
        actual_time: Option<u32>,
    ) -> FinekoResult<Option<Task>> {
        let patch = TaskPatch {
            status: Some(status),
            actual_time: actual_time.map(Some),
            ..Default::default()
        };
        self.update(ctx, id, patch).await
    }
}
