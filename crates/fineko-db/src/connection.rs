//! SurrealDB connection management.
//!
//! The engine is picked from the endpoint scheme: `ws://`/`wss://` for a
//! remote server, `mem://` for an embedded in-memory store (tests and local
//! tooling). Every fresh connection is migrated before it is handed out.

use surrealdb::Surreal;
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;
use crate::schema;

/// Configuration for connecting to SurrealDB.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Endpoint (e.g. `ws://127.0.0.1:8000` or `mem://`). A bare
    /// `host:port` is treated as a WebSocket address.
    pub url: String,
    pub namespace: String,
    pub database: String,
    /// Root username; ignored by embedded engines.
    pub username: String,
    /// Root password; ignored by embedded engines.
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8000".into(),
            namespace: "fineko".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

impl DbConfig {
    /// The endpoint with an explicit scheme.
    pub fn endpoint(&self) -> String {
        let url = self.url.trim();
        if url.contains("://") || url == "memory" {
            url.to_string()
        } else {
            format!("ws://{url}")
        }
    }

    /// Embedded engines run in-process and have no root user to sign in as.
    pub fn is_embedded(&self) -> bool {
        let endpoint = self.endpoint();
        endpoint == "memory" || endpoint.starts_with("mem://")
    }
}

/// Manages a migrated connection to SurrealDB.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Any>,
}

impl DbManager {
    /// Connect, authenticate as root for remote engines, select the
    /// configured namespace and database, then apply pending migrations.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        let endpoint = config.endpoint();
        info!(
            endpoint = %endpoint,
            namespace = %config.namespace,
            database = %config.database,
            "Connecting to SurrealDB"
        );

        let db = any::connect(endpoint).await?;

        if !config.is_embedded() {
            db.signin(Root {
                username: config.username.clone(),
                password: config.password.clone(),
            })
            .await?;
        }

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        schema::run_migrations(&db).await?;

        info!(
            schema_version = schema::latest_version(),
            "Successfully connected to SurrealDB"
        );

        Ok(Self { db })
    }

    /// Returns a reference to the underlying SurrealDB client.
    pub fn client(&self) -> &Surreal<Any> {
        &self.db
    }
}
