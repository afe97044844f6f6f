//! Typed, tenant-scoped entity services over a [`DocumentStore`].
//!
//! Each service is a thin wrapper: it embeds the caller's `companyId` on
//! create, passes it to every read and write by id, and decodes documents
//! into the entity type. Entity-specific operations live in the submodules.

use std::marker::PhantomData;

use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::context::TenantContext;
use crate::error::{FinekoError, FinekoResult};
use crate::models::{
    audit::Audit,
    knowledge::{Instruction, Process},
    org::{Department, Division},
    result::BusinessResult,
    task::Task,
    telegram::{TelegramGroup, TelegramMember, TelegramMessageLog},
    template::Template,
};
use crate::store::{COMPANY_ID_FIELD, Document, DocumentStore, TenantEntity, to_object};

pub mod result;
pub mod task;
pub mod template;

pub type TaskService<S> = EntityService<S, Task>;
pub type ResultService<S> = EntityService<S, BusinessResult>;
pub type TemplateService<S> = EntityService<S, Template>;
pub type AuditService<S> = EntityService<S, Audit>;
pub type InstructionService<S> = EntityService<S, Instruction>;
pub type ProcessService<S> = EntityService<S, Process>;
pub type DivisionService<S> = EntityService<S, Division>;
pub type DepartmentService<S> = EntityService<S, Department>;
pub type TelegramGroupService<S> = EntityService<S, TelegramGroup>;
pub type TelegramMemberService<S> = EntityService<S, TelegramMember>;
pub type TelegramMessageLogService<S> = EntityService<S, TelegramMessageLog>;

pub struct EntityService<S, E> {
    store: S,
    _entity: PhantomData<fn() -> E>,
}

impl<S: Clone, E> Clone for EntityService<S, E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _entity: PhantomData,
        }
    }
}

impl<S: DocumentStore, E: TenantEntity> EntityService<S, E> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// A service for another entity kind sharing the same store.
    pub fn sibling<F: TenantEntity>(&self) -> EntityService<S, F>
    where
        S: Clone,
    {
        EntityService::new(self.store.clone())
    }

    pub async fn list(&self, ctx: &TenantContext) -> FinekoResult<Vec<E>> {
        let docs = self
            .store
            .list_for_company(E::COLLECTION, ctx.company_id)
            .await?;
        decode_all(docs)
    }

    /// Company documents where `field == value`.
    pub async fn list_where(
        &self,
        ctx: &TenantContext,
        field: &str,
        value: Value,
    ) -> FinekoResult<Vec<E>> {
        let docs = self
            .store
            .query_for_company(E::COLLECTION, ctx.company_id, field, value)
            .await?;
        decode_all(docs)
    }

    /// `None` if missing or owned by another company.
    pub async fn get(&self, ctx: &TenantContext, id: Uuid) -> FinekoResult<Option<E>> {
        self.store
            .get_and_validate_tenant(E::COLLECTION, id, ctx.company_id)
            .await?
            .map(Document::into_entity)
            .transpose()
    }

    /// Like [`get`](Self::get), but a miss is a `NotFound` error.
    pub async fn require(&self, ctx: &TenantContext, id: Uuid) -> FinekoResult<E> {
        self.get(ctx, id)
            .await?
            .ok_or_else(|| FinekoError::not_found(E::ENTITY, id))
    }

    pub async fn create(&self, ctx: &TenantContext, input: E::New) -> FinekoResult<E> {
        E::validate_new(&input)?;
        let mut data = to_object(&input)?;
        if data.contains_key(COMPANY_ID_FIELD) {
            return Err(FinekoError::validation(format!(
                "{} payload must not set {COMPANY_ID_FIELD}",
                E::ENTITY
            )));
        }
        data.insert(
            COMPANY_ID_FIELD.into(),
            Value::String(ctx.company_id.to_string()),
        );

        let doc = self.store.create(E::COLLECTION, Value::Object(data)).await?;
        debug!(collection = %E::COLLECTION, id = %doc.id, company_id = %ctx.company_id, "Created document");
        doc.into_entity()
    }

    /// `None` if the document is missing or owned by another company.
    pub async fn update(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        patch: E::Patch,
    ) -> FinekoResult<Option<E>> {
        E::validate_patch(&patch)?;
        let patch = Value::Object(to_object(&patch)?);
        self.store
            .update(E::COLLECTION, id, ctx.company_id, patch)
            .await?
            .map(Document::into_entity)
            .transpose()
    }

    pub async fn remove(&self, ctx: &TenantContext, id: Uuid) -> FinekoResult<bool> {
        self.store.remove(E::COLLECTION, id, ctx.company_id).await
    }
}

fn decode_all<E: TenantEntity>(docs: Vec<Document>) -> FinekoResult<Vec<E>> {
    docs.into_iter().map(Document::into_entity).collect()
}
