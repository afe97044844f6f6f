//! Sub-result tree and comment editing for results.
//!
//! The whole tree is stored inside the result document, so every edit is a
//! read-modify-write of the `subResults` field.

use chrono::Utc;
use uuid::Uuid;

use crate::context::TenantContext;
use crate::error::{FinekoError, FinekoResult};
use crate::models::result::{self, BusinessResult, Comment, ResultPatch, SubResult};
use crate::store::DocumentStore;

use super::EntityService;

impl<S: DocumentStore> EntityService<S, BusinessResult> {
    /// Attach `sub` under `parent_id`, or at the top level when `None`.
    ///
    /// `Ok(None)` if the result is not visible to the caller.
    pub async fn add_sub_result(
        &self,
        ctx: &TenantContext,
        result_id: Uuid,
        parent_id: Option<Uuid>,
        sub: SubResult,
    ) -> FinekoResult<Option<BusinessResult>> {
        let Some(mut current) = self.get(ctx, result_id).await? else {
            return Ok(None);
        };

        // `sub` may carry its own children; the whole subtree must fit.
        let subtree = std::slice::from_ref(&sub);
        match parent_id {
            None => {
                result::check_depth(subtree, 0)?;
                current.sub_results.push(sub);
            }
            Some(parent_id) => {
                let (parent, depth) =
                    result::find_sub_result_mut(&mut current.sub_results, parent_id, 1)
                        .ok_or_else(|| FinekoError::not_found("sub-result", parent_id))?;
                result::check_depth(subtree, depth)?;
                parent.sub_results.push(sub);
            }
        }

        self.replace_tree(ctx, result_id, current.sub_results).await
    }

    pub async fn set_sub_result_completed(
        &self,
        ctx: &TenantContext,
        result_id: Uuid,
        sub_id: Uuid,
        completed: bool,
    ) -> FinekoResult<Option<BusinessResult>> {
        let Some(mut current) = self.get(ctx, result_id).await? else {
            return Ok(None);
        };
        let (node, _) = result::find_sub_result_mut(&mut current.sub_results, sub_id, 1)
            .ok_or_else(|| FinekoError::not_found("sub-result", sub_id))?;
        node.completed = completed;

        self.replace_tree(ctx, result_id, current.sub_results).await
    }

    pub async fn remove_sub_result(
        &self,
        ctx: &TenantContext,
        result_id: Uuid,
        sub_id: Uuid,
    ) -> FinekoResult<Option<BusinessResult>> {
        let Some(mut current) = self.get(ctx, result_id).await? else {
            return Ok(None);
        };
        if !result::remove_sub_result(&mut current.sub_results, sub_id) {
            return Err(FinekoError::not_found("sub-result", sub_id));
        }

        self.replace_tree(ctx, result_id, current.sub_results).await
    }

    pub async fn add_comment(
        &self,
        ctx: &TenantContext,
        result_id: Uuid,
        text: impl Into<String>,
    ) -> FinekoResult<Option<BusinessResult>> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(FinekoError::validation("comment text is empty"));
        }
        let Some(mut current) = self.get(ctx, result_id).await? else {
            return Ok(None);
        };
        current.comments.push(Comment {
            id: Uuid::new_v4(),
            author_id: ctx.employee_id,
            text,
            created_at: Utc::now(),
        });

        let patch = ResultPatch {
            comments: Some(current.comments),
            ..Default::default()
        };
        self.update(ctx, result_id, patch).await
    }

    async fn replace_tree(
        &self,
        ctx: &TenantContext,
        result_id: Uuid,
        sub_results: Vec<SubResult>,
    ) -> FinekoResult<Option<BusinessResult>> {
        let patch = ResultPatch {
            sub_results: Some(sub_results),
            ..Default::default()
        };
        self.update(ctx, result_id, patch).await
    }
}
