//! SurrealDB implementation of [`DocumentStore`].
//!
//! Each collection is its own table. The owning company lives in an
//! indexed `company_id` column; the document body lives in `data`.
//! Database failures are logged here with their full detail and surfaced
//! to callers as a generic [`FinekoError::Database`].

use chrono::{DateTime, Utc};
use fineko_core::error::{FinekoError, FinekoResult};
use fineko_core::store::{
    COMPANY_ID_FIELD, Collection, Document, DocumentStore, is_valid_field_name,
};
use serde_json::{Map, Value};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, error};
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};

/// Keys that belong to the record itself rather than to the body.
const RESERVED_KEYS: [&str; 4] = ["id", COMPANY_ID_FIELD, "createdAt", "updatedAt"];

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct DocumentRow {
    company_id: String,
    data: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct DocumentRowWithId {
    record_id: String,
    company_id: String,
    data: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn body(data: Value) -> Result<Map<String, Value>, DbError> {
    match data {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(DbError::Decode(format!("document body is not an object: {other}"))),
    }
}

impl DocumentRow {
    fn into_document(self, id: Uuid) -> Result<Document, DbError> {
        Ok(Document {
            id,
            company_id: parse_uuid(&self.company_id, "company")?,
            data: body(self.data)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl DocumentRowWithId {
    fn try_into_document(self) -> Result<Document, DbError> {
        Ok(Document {
            id: parse_uuid(&self.record_id, "document")?,
            company_id: parse_uuid(&self.company_id, "company")?,
            data: body(self.data)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Log a storage failure and replace it with a detail-free error.
fn storage_failure(collection: Collection, operation: &str, err: DbError) -> FinekoError {
    error!(
        %collection,
        operation,
        error = %err,
        "Document store operation failed"
    );
    FinekoError::Database(format!("could not {operation} {collection}"))
}

/// SurrealDB implementation of the document store.
#[derive(Clone)]
pub struct SurrealDocumentStore<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealDocumentStore<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn select_by_id(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> Result<Option<Document>, DbError> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record($table, $id)")
            .bind(("table", collection.as_str()))
            .bind(("id", id.to_string()))
            .await?;

        let rows: Vec<DocumentRow> = result.take(0)?;
        rows.into_iter()
            .next()
            .map(|row| row.into_document(id))
            .transpose()
    }
}

impl<C: Connection> DocumentStore for SurrealDocumentStore<C> {
    async fn get_by_query(
        &self,
        collection: Collection,
        field: &str,
        value: Value,
    ) -> FinekoResult<Vec<Document>> {
        if !is_valid_field_name(field) {
            return Err(FinekoError::validation(format!(
                "invalid query field name: {field:?}"
            )));
        }

        // The field name is a validated identifier, so it is safe to embed.
        let column = if field == COMPANY_ID_FIELD {
            "company_id".to_string()
        } else {
            format!("data.{field}")
        };
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM type::table($table) \
             WHERE {column} = $value \
             ORDER BY created_at ASC"
        );

        let fetched: Result<Vec<DocumentRowWithId>, DbError> = async {
            let mut result = self
                .db
                .query(query)
                .bind(("table", collection.as_str()))
                .bind(("value", value))
                .await?;
            Ok(result.take(0)?)
        }
        .await;

        match fetched {
            Ok(rows) => rows
                .into_iter()
                .map(DocumentRowWithId::try_into_document)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| storage_failure(collection, "query", e)),
            Err(e) if e.is_missing_collection() => {
                debug!(%collection, "Collection does not exist yet; returning no documents");
                Ok(Vec::new())
            }
            Err(e) => Err(storage_failure(collection, "query", e)),
        }
    }

    async fn get_and_validate_tenant(
        &self,
        collection: Collection,
        id: Uuid,
        company_id: Uuid,
    ) -> FinekoResult<Option<Document>> {
        match self.select_by_id(collection, id).await {
            Ok(Some(doc)) if doc.company_id == company_id => Ok(Some(doc)),
            Ok(Some(_)) => {
                debug!(%collection, %id, %company_id, "Document belongs to another company");
                Ok(None)
            }
            Ok(None) => Ok(None),
            Err(e) if e.is_missing_collection() => Ok(None),
            Err(e) => Err(storage_failure(collection, "read", e)),
        }
    }

    async fn create(&self, collection: Collection, data: Value) -> FinekoResult<Document> {
        let Value::Object(mut data) = data else {
            return Err(FinekoError::validation("document data must be a JSON object"));
        };
        let company_id = data
            .get(COMPANY_ID_FIELD)
            .and_then(Value::as_str)
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .ok_or_else(|| {
                FinekoError::validation(format!(
                    "{collection} document must carry a valid {COMPANY_ID_FIELD}"
                ))
            })?;
        for key in RESERVED_KEYS {
            data.remove(key);
        }

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let created: Result<Document, DbError> = async {
            let result = self
                .db
                .query(
                    "CREATE type::record($table, $id) SET \
                     company_id = $company_id, \
                     data = $data",
                )
                .bind(("table", collection.as_str()))
                .bind(("id", id_str.clone()))
                .bind(("company_id", company_id.to_string()))
                .bind(("data", Value::Object(data)))
                .await?;

            let mut result = result
                .check()
                .map_err(|e| DbError::Query(e.to_string()))?;

            let rows: Vec<DocumentRow> = result.take(0)?;
            let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
                entity: collection.as_str().into(),
                id: id_str,
            })?;
            row.into_document(id)
        }
        .await;

        created.map_err(|e| storage_failure(collection, "create", e))
    }

    async fn update(
        &self,
        collection: Collection,
        id: Uuid,
        company_id: Uuid,
        patch: Value,
    ) -> FinekoResult<Option<Document>> {
        let Value::Object(patch) = patch else {
            return Err(FinekoError::validation("patch must be a JSON object"));
        };
        let Some(existing) = self
            .get_and_validate_tenant(collection, id, company_id)
            .await?
        else {
            return Ok(None);
        };

        let mut data = existing.data;
        for (key, value) in patch {
            if !RESERVED_KEYS.contains(&key.as_str()) {
                data.insert(key, value);
            }
        }

        let updated: Result<Option<Document>, DbError> = async {
            let result = self
                .db
                .query(
                    "UPDATE type::record($table, $id) SET \
                     data = $data, updated_at = time::now() \
                     WHERE company_id = $company_id",
                )
                .bind(("table", collection.as_str()))
                .bind(("id", id.to_string()))
                .bind(("company_id", company_id.to_string()))
                .bind(("data", Value::Object(data)))
                .await?;

            let mut result = result
                .check()
                .map_err(|e| DbError::Query(e.to_string()))?;

            let rows: Vec<DocumentRow> = result.take(0)?;
            rows.into_iter()
                .next()
                .map(|row| row.into_document(id))
                .transpose()
        }
        .await;

        updated.map_err(|e| storage_failure(collection, "update", e))
    }

    async fn remove(&self, collection: Collection, id: Uuid, company_id: Uuid) -> FinekoResult<bool> {
        if self
            .get_and_validate_tenant(collection, id, company_id)
            .await?
            .is_none()
        {
            return Ok(false);
        }

        let deleted: Result<(), DbError> = async {
            self.db
                .query(
                    "DELETE type::record($table, $id) \
                     WHERE company_id = $company_id",
                )
                .bind(("table", collection.as_str()))
                .bind(("id", id.to_string()))
                .bind(("company_id", company_id.to_string()))
                .await?
                .check()
                .map_err(|e| DbError::Query(e.to_string()))?;
            Ok(())
        }
        .await;

        deleted
            .map(|()| true)
            .map_err(|e| storage_failure(collection, "delete", e))
    }
}
