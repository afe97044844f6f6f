//! Turn-based business audit interview.
//!
//! An audit moves `in_progress -> ai_complete -> finalized`. Every user
//! answer is persisted before the model sees it, so a failed model call
//! never loses input; [`AuditOrchestrator::retry_ai_processing`] picks up
//! from the last persisted state.

use chrono::Utc;
use fineko_core::context::TenantContext;
use fineko_core::error::FinekoError;
use fineko_core::models::audit::{
    Audit, AuditPatch, ConversationTurn, NewAudit, TurnRole, WorkPlan, WorkPlanStep,
};
use fineko_core::service::AuditService;
use fineko_core::store::DocumentStore;
use fineko_core::summary::SummaryValue;
use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::backend::{Content, GenerationRequest, LanguageModel, parse_json};
use crate::error::{AuditError, LlmError};
use crate::prompt;

/// One user answer.
#[derive(Debug, Clone)]
pub enum TurnInput {
    Text(String),
    /// Recorded speech, transcribed before it enters the conversation.
    Audio { mime_type: String, data: Vec<u8> },
}

/// Result of a turn whose user answer was saved.
#[derive(Debug)]
pub enum TurnOutcome {
    /// The model replied; the audit carries the new model turn.
    Processed { audit: Audit },
    /// The answer is saved but the model call failed. Retry with
    /// [`AuditOrchestrator::retry_ai_processing`].
    ProcessingFailed { audit: Audit, reason: LlmError },
}

impl TurnOutcome {
    pub fn audit(&self) -> &Audit {
        match self {
            TurnOutcome::Processed { audit } | TurnOutcome::ProcessingFailed { audit, .. } => audit,
        }
    }

    pub fn into_audit(self) -> Audit {
        match self {
            TurnOutcome::Processed { audit } | TurnOutcome::ProcessingFailed { audit, .. } => audit,
        }
    }

    pub fn is_processed(&self) -> bool {
        matches!(self, TurnOutcome::Processed { .. })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TurnExtraction {
    reply: String,
    #[serde(default)]
    summary: serde_json::Value,
    #[serde(default)]
    is_complete: bool,
}

#[derive(Debug, Deserialize)]
struct PlanDraft {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    steps: Vec<WorkPlanStep>,
}

pub struct AuditOrchestrator<S, M> {
    audits: AuditService<S>,
    model: M,
}

impl<S: DocumentStore, M: LanguageModel> AuditOrchestrator<S, M> {
    pub fn new(store: S, model: M) -> Self {
        Self {
            audits: AuditService::new(store),
            model,
        }
    }

    /// Create an audit seeded with the opening question.
    pub async fn start_audit(&self, ctx: &TenantContext) -> Result<Audit, AuditError> {
        let audit = self
            .audits
            .create(
                ctx,
                NewAudit {
                    created_by: ctx.user_id,
                    conversation: vec![ConversationTurn::model(prompt::OPENING_QUESTION)],
                    summary: SummaryValue::empty_map(),
                    is_ai_complete: false,
                    is_completed: false,
                },
            )
            .await?;
        info!(audit_id = %audit.id, company_id = %ctx.company_id, "Audit started");
        Ok(audit)
    }

    pub async fn get(&self, ctx: &TenantContext, audit_id: Uuid) -> Result<Audit, AuditError> {
        self.audits
            .get(ctx, audit_id)
            .await?
            .ok_or(AuditError::NotFound(audit_id))
    }

    /// Company audits, newest first.
    pub async fn list(&self, ctx: &TenantContext) -> Result<Vec<Audit>, AuditError> {
        let mut audits = self.audits.list(ctx).await?;
        audits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(audits)
    }

    pub async fn delete(&self, ctx: &TenantContext, audit_id: Uuid) -> Result<(), AuditError> {
        if self.audits.remove(ctx, audit_id).await? {
            info!(audit_id = %audit_id, "Audit deleted");
            Ok(())
        } else {
            Err(AuditError::NotFound(audit_id))
        }
    }

    /// Record a user answer and ask the model for the next question.
    ///
    /// Audio is transcribed first; if that fails the call errors and the
    /// audit is left untouched. Once the answer is saved, a model failure
    /// is reported as [`TurnOutcome::ProcessingFailed`] rather than an
    /// error.
    pub async fn submit_turn(
        &self,
        ctx: &TenantContext,
        audit_id: Uuid,
        input: TurnInput,
    ) -> Result<TurnOutcome, AuditError> {
        let mut audit = self.get(ctx, audit_id).await?;
        if audit.is_completed {
            return Err(AuditError::AlreadyFinalized);
        }

        let text = match input {
            TurnInput::Text(text) => text,
            TurnInput::Audio { mime_type, data } => self
                .transcribe(mime_type, data)
                .await
                .inspect_err(|e| warn!(audit_id = %audit_id, error = %e, "Transcription failed"))
                .map_err(AuditError::Transcription)?,
        };
        let text = text.trim();
        if text.is_empty() {
            return Err(FinekoError::validation("answer is empty").into());
        }

        audit.conversation.push(ConversationTurn::user(text));
        let audit = self
            .save(
                ctx,
                audit_id,
                AuditPatch {
                    conversation: Some(audit.conversation),
                    ..Default::default()
                },
            )
            .await?;
        debug!(audit_id = %audit_id, turns = audit.conversation.len(), "User turn saved");

        self.process(ctx, audit).await
    }

    /// Re-run the model over a saved but unanswered user turn.
    pub async fn retry_ai_processing(
        &self,
        ctx: &TenantContext,
        audit_id: Uuid,
    ) -> Result<TurnOutcome, AuditError> {
        let audit = self.get(ctx, audit_id).await?;
        if audit.is_completed {
            return Err(AuditError::AlreadyFinalized);
        }
        if audit.last_turn().map(|t| t.role) != Some(TurnRole::User) {
            return Err(AuditError::NothingToProcess);
        }
        self.process(ctx, audit).await
    }

    /// Generate the work plan and close the audit.
    pub async fn finalize(&self, ctx: &TenantContext, audit_id: Uuid) -> Result<Audit, AuditError> {
        let audit = self.get(ctx, audit_id).await?;
        if audit.is_completed {
            return Err(AuditError::AlreadyFinalized);
        }
        if audit.summary.is_blank() {
            return Err(AuditError::NothingToProcess);
        }
        if !audit.is_ai_complete {
            warn!(audit_id = %audit_id, "Finalizing audit before the interview is complete");
        }

        let request = GenerationRequest::new(prompt::WORK_PLAN_INSTRUCTION)
            .content(Content::user_text(prompt::work_plan_request(
                &audit.summary.render(),
            )))
            .schema(prompt::work_plan_schema());

        let draft: PlanDraft = match self.model.generate(request).await {
            Ok(generation) => parse_json::<PlanDraft>(&generation.text),
            Err(e) => Err(e),
        }
        .inspect_err(|e| warn!(audit_id = %audit_id, error = %e, "Work plan generation failed"))
        .map_err(AuditError::Generation)?;

        let plan = WorkPlan {
            summary: draft.summary,
            steps: draft.steps,
            generated_at: Utc::now(),
        };
        let steps = plan.steps.len();
        let audit = self
            .save(
                ctx,
                audit_id,
                AuditPatch {
                    work_plan: Some(plan),
                    is_completed: Some(true),
                    ..Default::default()
                },
            )
            .await?;
        info!(audit_id = %audit_id, steps, "Audit finalized");
        Ok(audit)
    }

    async fn transcribe(&self, mime_type: String, data: Vec<u8>) -> Result<String, LlmError> {
        let request = GenerationRequest::new(prompt::TRANSCRIPTION_INSTRUCTION)
            .content(Content::user_audio(mime_type, data));
        let text = self.model.generate(request).await?.text;
        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text)
    }

    async fn extract(&self, audit: &Audit) -> Result<TurnExtraction, LlmError> {
        let snapshot = serde_json::to_string(&audit.summary)
            .map_err(|e| LlmError::ParseError(e.to_string()))?;
        let instruction = format!(
            "{}\n\n{}",
            prompt::audit_instruction(),
            prompt::summary_context(&snapshot)
        );
        let history = audit.conversation.iter().map(|turn| match turn.role {
            TurnRole::User => Content::user_text(&turn.text),
            TurnRole::Model => Content::model_text(&turn.text),
        });

        let request = GenerationRequest::new(instruction)
            .contents(history)
            .schema(prompt::audit_turn_schema());
        let extraction: TurnExtraction = parse_json(&self.model.generate(request).await?.text)?;
        if extraction.reply.trim().is_empty() {
            return Err(LlmError::ParseError("reply is empty".into()));
        }
        Ok(extraction)
    }

    async fn process(&self, ctx: &TenantContext, mut audit: Audit) -> Result<TurnOutcome, AuditError> {
        let extraction = match self.extract(&audit).await {
            Ok(extraction) => extraction,
            Err(reason) => {
                warn!(audit_id = %audit.id, error = %reason, "Audit turn processing failed");
                return Ok(TurnOutcome::ProcessingFailed { audit, reason });
            }
        };

        audit
            .conversation
            .push(ConversationTurn::model(extraction.reply.trim()));
        audit.summary.merge(SummaryValue::from(extraction.summary));
        let complete = audit.is_ai_complete || extraction.is_complete;

        let audit_id = audit.id;
        let audit = self
            .save(
                ctx,
                audit_id,
                AuditPatch {
                    conversation: Some(audit.conversation),
                    summary: Some(audit.summary),
                    is_ai_complete: Some(complete),
                    ..Default::default()
                },
            )
            .await?;
        if complete {
            info!(audit_id = %audit_id, "Audit interview complete");
        }
        Ok(TurnOutcome::Processed { audit })
    }

    async fn save(
        &self,
        ctx: &TenantContext,
        audit_id: Uuid,
        patch: AuditPatch,
    ) -> Result<Audit, AuditError> {
        self.audits
            .update(ctx, audit_id, patch)
            .await?
            .ok_or(AuditError::NotFound(audit_id))
    }
}
