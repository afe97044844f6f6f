//! SurrealDB implementation of [`UserRepository`].

use chrono::{DateTime, Utc};
use fineko_core::error::FinekoResult;
use fineko_core::models::user::{CreateUser, UpdateUser, User};
use fineko_core::repository::UserRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    telegram_id: i64,
    username: Option<String>,
    display_name: String,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    telegram_id: i64,
    username: Option<String>,
    display_name: String,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, id: Uuid) -> User {
        User {
            id,
            telegram_id: self.telegram_id,
            username: self.username,
            display_name: self.display_name,
            avatar_url: self.avatar_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        Ok(User {
            id: parse_uuid(&self.record_id, "user")?,
            telegram_id: self.telegram_id,
            username: self.username,
            display_name: self.display_name,
            avatar_url: self.avatar_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> FinekoResult<User> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('users', $id) SET \
                 telegram_id = $telegram_id, \
                 username = $username, \
                 display_name = $display_name, \
                 avatar_url = $avatar_url",
            )
            .bind(("id", id_str.clone()))
            .bind(("telegram_id", input.telegram_id))
            .bind(("username", input.username))
            .bind(("display_name", input.display_name))
            .bind(("avatar_url", input.avatar_url))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id))
    }

    async fn get_by_id(&self, id: Uuid) -> FinekoResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('users', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id))
    }

    async fn get_by_telegram_id(&self, telegram_id: i64) -> FinekoResult<User> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM users \
                 WHERE telegram_id = $telegram_id",
            )
            .bind(("telegram_id", telegram_id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: format!("telegram_id={telegram_id}"),
        })?;

        Ok(row.try_into_user()?)
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> FinekoResult<User> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.display_name.is_some() {
            sets.push("display_name = $display_name");
        }
        if input.avatar_url.is_some() {
            sets.push("avatar_url = $avatar_url");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('users', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(display_name) = input.display_name {
            builder = builder.bind(("display_name", display_name));
        }
        if let Some(avatar_url) = input.avatar_url {
            // Some(None) clears the avatar.
            builder = builder.bind(("avatar_url", avatar_url));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id))
    }
}
