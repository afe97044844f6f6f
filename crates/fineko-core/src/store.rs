//! Tenant-safe document store abstraction.
//!
//! Every document lives in a [`Collection`] and carries the id of the
//! company that owns it. Reads and writes by id take the caller's
//! `company_id`; a document owned by another company behaves exactly like
//! a missing one.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{FinekoError, FinekoResult};

/// Document field that holds the owning company id.
pub const COMPANY_ID_FIELD: &str = "companyId";

/// Collections managed by the document store.
///
/// Users, companies, company profiles, employees and sessions are served by
/// typed repositories and are not listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Tasks,
    Results,
    Templates,
    Processes,
    Instructions,
    Audits,
    TelegramGroups,
    TelegramMessageLogs,
    TelegramMembers,
    Divisions,
    Departments,
}

impl Collection {
    pub const ALL: [Collection; 11] = [
        Collection::Tasks,
        Collection::Results,
        Collection::Templates,
        Collection::Processes,
        Collection::Instructions,
        Collection::Audits,
        Collection::TelegramGroups,
        Collection::TelegramMessageLogs,
        Collection::TelegramMembers,
        Collection::Divisions,
        Collection::Departments,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Tasks => "tasks",
            Collection::Results => "results",
            Collection::Templates => "templates",
            Collection::Processes => "processes",
            Collection::Instructions => "instructions",
            Collection::Audits => "audits",
            Collection::TelegramGroups => "telegramGroups",
            Collection::TelegramMessageLogs => "telegramMessageLogs",
            Collection::TelegramMembers => "telegramMembers",
            Collection::Divisions => "divisions",
            Collection::Departments => "departments",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored document: bookkeeping fields plus the free-form body.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: Uuid,
    pub company_id: Uuid,
    /// Body fields, without `id`, `companyId`, `createdAt`, `updatedAt`.
    pub data: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Flatten into a single JSON object with the bookkeeping fields
    /// re-inserted under their document names.
    pub fn to_value(&self) -> Value {
        let mut map = self.data.clone();
        map.insert("id".into(), Value::String(self.id.to_string()));
        map.insert(
            COMPANY_ID_FIELD.into(),
            Value::String(self.company_id.to_string()),
        );
        map.insert(
            "createdAt".into(),
            Value::String(self.created_at.to_rfc3339()),
        );
        map.insert(
            "updatedAt".into(),
            Value::String(self.updated_at.to_rfc3339()),
        );
        Value::Object(map)
    }

    /// Decode into a typed entity.
    pub fn into_entity<T: DeserializeOwned>(self) -> FinekoResult<T> {
        serde_json::from_value(self.to_value()).map_err(|e| {
            FinekoError::Serialization(format!("document {} is malformed: {e}", self.id))
        })
    }
}

/// A typed, tenant-scoped document.
pub trait TenantEntity: DeserializeOwned + Send + Sync {
    const COLLECTION: Collection;
    /// Human-readable name used in `NotFound` errors.
    const ENTITY: &'static str;

    /// Payload for creation. Must not contain `companyId`; the service
    /// embeds it from the caller's context.
    type New: Serialize + Send + Sync;
    /// Partial update. Absent fields are left untouched.
    type Patch: Serialize + Send + Sync;

    /// Entity-specific checks run before a create is written.
    fn validate_new(_input: &Self::New) -> FinekoResult<()> {
        Ok(())
    }

    /// Entity-specific checks run before a patch is written.
    fn validate_patch(_patch: &Self::Patch) -> FinekoResult<()> {
        Ok(())
    }
}

/// Whether `field` can be used as a query field name.
pub fn is_valid_field_name(field: &str) -> bool {
    let mut chars = field.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Serialize a value into a JSON object, rejecting anything else.
pub fn to_object<T: Serialize>(value: &T) -> FinekoResult<Map<String, Value>> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(FinekoError::Serialization(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

pub trait DocumentStore: Send + Sync {
    /// All documents where `field == value`. A collection that does not
    /// exist yet yields an empty list.
    fn get_by_query(
        &self,
        collection: Collection,
        field: &str,
        value: Value,
    ) -> impl Future<Output = FinekoResult<Vec<Document>>> + Send;

    /// Fetch by id. `None` if the document is missing or belongs to a
    /// different company.
    fn get_and_validate_tenant(
        &self,
        collection: Collection,
        id: Uuid,
        company_id: Uuid,
    ) -> impl Future<Output = FinekoResult<Option<Document>>> + Send;

    /// Insert a new document. `data` must already contain `companyId`.
    fn create(
        &self,
        collection: Collection,
        data: Value,
    ) -> impl Future<Output = FinekoResult<Document>> + Send;

    /// Validate ownership, then replace the top-level fields present in
    /// `patch`. `None` if validation failed.
    fn update(
        &self,
        collection: Collection,
        id: Uuid,
        company_id: Uuid,
        patch: Value,
    ) -> impl Future<Output = FinekoResult<Option<Document>>> + Send;

    /// Validate ownership, then delete. `false` if nothing was deleted.
    fn remove(
        &self,
        collection: Collection,
        id: Uuid,
        company_id: Uuid,
    ) -> impl Future<Output = FinekoResult<bool>> + Send;

    /// All documents owned by `company_id`.
    fn list_for_company(
        &self,
        collection: Collection,
        company_id: Uuid,
    ) -> impl Future<Output = FinekoResult<Vec<Document>>> + Send {
        self.get_by_query(
            collection,
            COMPANY_ID_FIELD,
            Value::String(company_id.to_string()),
        )
    }

    /// Documents where `field == value`, restricted to `company_id`.
    fn query_for_company(
        &self,
        collection: Collection,
        company_id: Uuid,
        field: &str,
        value: Value,
    ) -> impl Future<Output = FinekoResult<Vec<Document>>> + Send {
        async move {
            let docs = self.get_by_query(collection, field, value).await?;
            Ok(docs
                .into_iter()
                .filter(|doc| doc.company_id == company_id)
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_are_identifiers() {
        assert!(is_valid_field_name("companyId"));
        assert!(is_valid_field_name("_private"));
        assert!(is_valid_field_name("result_id2"));
        assert!(!is_valid_field_name(""));
        assert!(!is_valid_field_name("2fast"));
        assert!(!is_valid_field_name("a.b"));
        assert!(!is_valid_field_name("x = 1 OR true"));
    }

    #[test]
    fn document_value_carries_bookkeeping_fields() {
        let mut data = Map::new();
        data.insert("title".into(), Value::String("Call supplier".into()));
        let doc = Document {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            data,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = doc.to_value();
        assert_eq!(value["title"], "Call supplier");
        assert_eq!(value["id"], doc.id.to_string());
        assert_eq!(value[COMPANY_ID_FIELD], doc.company_id.to_string());
        assert!(value["createdAt"].is_string());
    }

    #[test]
    fn to_object_rejects_scalars() {
        assert!(to_object(&42).is_err());
        assert!(to_object(&serde_json::json!({"a": 1})).is_ok());
    }
}
