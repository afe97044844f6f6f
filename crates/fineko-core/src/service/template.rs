//! Task generation from recurring templates.

use chrono::NaiveDate;
use tracing::info;

use crate::context::TenantContext;
use crate::error::FinekoResult;
use crate::models::task::{NewTask, Task, TaskStatus};
use crate::models::template::{GeneratedTask, Template, TemplatePatch};
use crate::store::DocumentStore;

use super::EntityService;

impl<S: DocumentStore + Clone> EntityService<S, Template> {
    /// Create one task for every active template due on `date` and record
    /// it in the template's history. Templates already generated for
    /// `date` are skipped, so repeated calls produce nothing new.
    pub async fn generate_due_tasks(
        &self,
        ctx: &TenantContext,
        date: NaiveDate,
    ) -> FinekoResult<Vec<Task>> {
        let tasks = self.sibling::<Task>();
        let mut created = Vec::new();

        for template in self.list(ctx).await? {
            if !template.is_due(date) {
                continue;
            }

            let task = tasks
                .create(
                    ctx,
                    NewTask {
                        title: template.title.clone(),
                        description: template.description.clone(),
                        assignee_id: template.assignee_id,
                        reporter_id: template.reporter_id,
                        due_date: date,
                        status: TaskStatus::Todo,
                        quadrant: None,
                        expected_time: template.expected_time,
                        actual_time: None,
                        result_id: template.result_id,
                        template_id: Some(template.id),
                    },
                )
                .await?;

            let mut history = template.history;
            history.push(GeneratedTask {
                date,
                task_id: task.id,
            });
            self.update(
                ctx,
                template.id,
                TemplatePatch {
                    history: Some(history),
                    ..Default::default()
                },
            )
            .await?;

            created.push(task);
        }

        info!(
            company_id = %ctx.company_id,
            %date,
            generated = created.len(),
            "Generated tasks from templates"
        );
        Ok(created)
    }
}
