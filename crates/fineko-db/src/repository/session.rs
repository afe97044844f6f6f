//! SurrealDB implementation of [`SessionRepository`].

use chrono::{DateTime, Utc};
use fineko_core::error::FinekoResult;
use fineko_core::models::session::{CreateSession, Session, SessionKind};
use fineko_core::repository::SessionRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::{RecordId, RecordIdKey, SurrealValue};
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};

#[derive(Debug, SurrealValue)]
struct SessionRow {
    user_id: String,
    company_id: Option<String>,
    kind: String,
    token_hash: Option<String>,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct SessionRowWithId {
    record_id: String,
    user_id: String,
    company_id: Option<String>,
    kind: String,
    token_hash: Option<String>,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

fn parse_kind(s: &str) -> Result<SessionKind, DbError> {
    SessionKind::parse(s).ok_or_else(|| DbError::Decode(format!("unknown session kind: {s}")))
}

fn row_to_session(row: SessionRow, id: Uuid) -> Result<Session, DbError> {
    Ok(Session {
        id,
        user_id: parse_uuid(&row.user_id, "user")?,
        company_id: row
            .company_id
            .as_deref()
            .map(|c| parse_uuid(c, "company"))
            .transpose()?,
        kind: parse_kind(&row.kind)?,
        token_hash: row.token_hash,
        expires_at: row.expires_at,
        created_at: row.created_at,
    })
}

impl SessionRowWithId {
    fn try_into_session(self) -> Result<Session, DbError> {
        let id = parse_uuid(&self.record_id, "session")?;
        row_to_session(
            SessionRow {
                user_id: self.user_id,
                company_id: self.company_id,
                kind: self.kind,
                token_hash: self.token_hash,
                expires_at: self.expires_at,
                created_at: self.created_at,
            },
            id,
        )
    }
}

#[derive(Debug, SurrealValue)]
struct ConsumedSessionRow {
    id: RecordId,
    user_id: String,
    company_id: Option<String>,
    kind: String,
    token_hash: Option<String>,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl ConsumedSessionRow {
    fn try_into_session(self) -> Result<Session, DbError> {
        let id = match &self.id.key {
            RecordIdKey::String(s) => parse_uuid(s, "session")?,
            RecordIdKey::Uuid(u) => Uuid::from(*u),
            other => return Err(DbError::Decode(format!("unexpected session key: {other:?}"))),
        };
        row_to_session(
            SessionRow {
                user_id: self.user_id,
                company_id: self.company_id,
                kind: self.kind,
                token_hash: self.token_hash,
                expires_at: self.expires_at,
                created_at: self.created_at,
            },
            id,
        )
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Session repository.
#[derive(Clone)]
pub struct SurrealSessionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSessionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SessionRepository for SurrealSessionRepository<C> {
    async fn create(&self, input: CreateSession) -> FinekoResult<Session> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('sessions', $id) SET \
                 user_id = $user_id, \
                 company_id = $company_id, \
                 kind = $kind, \
                 token_hash = $token_hash, \
                 expires_at = $expires_at",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("company_id", input.company_id.map(|c| c.to_string())))
            .bind(("kind", input.kind.as_str()))
            .bind(("token_hash", input.token_hash))
            .bind(("expires_at", input.expires_at))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "session".into(),
            id: id_str,
        })?;

        row_to_session(row, id).map_err(Into::into)
    }

    async fn get_by_id(&self, id: Uuid) -> FinekoResult<Session> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('sessions', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "session".into(),
            id: id_str,
        })?;

        row_to_session(row, id).map_err(Into::into)
    }

    async fn get_by_token_hash(&self, token_hash: &str) -> FinekoResult<Session> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM sessions \
                 WHERE token_hash = $token_hash",
            )
            .bind(("token_hash", token_hash.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SessionRowWithId> = result.take(0).map_err(DbError::from)?;
        // The hash is never logged or echoed back.
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "session".into(),
            id: "token".into(),
        })?;

        row.try_into_session().map_err(Into::into)
    }

    async fn invalidate(&self, id: Uuid) -> FinekoResult<()> {
        self.db
            .query("DELETE type::record('sessions', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn consume_temp(&self, token_hash: &str) -> FinekoResult<Option<Session>> {
        let result = self
            .db
            .query(
                "DELETE sessions WHERE token_hash = $token_hash AND kind = $kind \
                 RETURN BEFORE",
            )
            .bind(("token_hash", token_hash.to_string()))
            .bind(("kind", SessionKind::Temp.as_str()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        // RETURN BEFORE carries the full record id, not the bare uuid.
        let rows: Vec<ConsumedSessionRow> = result.take(0).map_err(DbError::from)?;
        let mut rows = rows.into_iter();
        let Some(row) = rows.next() else {
            return Ok(None);
        };
        if rows.next().is_some() {
            return Err(DbError::Decode("token hash matched more than one session".into()).into());
        }

        row.try_into_session().map(Some).map_err(Into::into)
    }

    async fn invalidate_user_sessions(&self, user_id: Uuid, company_id: Uuid) -> FinekoResult<()> {
        self.db
            .query("DELETE sessions WHERE user_id = $user_id AND company_id = $company_id")
            .bind(("user_id", user_id.to_string()))
            .bind(("company_id", company_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn cleanup_expired(&self, now: DateTime<Utc>) -> FinekoResult<u64> {
        // Count expired sessions first, then delete.
        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM sessions \
                 WHERE expires_at <= $now GROUP ALL",
            )
            .bind(("now", now))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        self.db
            .query("DELETE sessions WHERE expires_at <= $now")
            .bind(("now", now))
            .await
            .map_err(DbError::from)?;

        Ok(total)
    }
}
