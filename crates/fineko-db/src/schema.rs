//! Schema definitions and migration runner for SurrealDB.
//!
//! Global records (users, companies, employees, sessions) use SCHEMAFULL
//! tables with one column per field. Document collections share one shape:
//! an indexed `company_id` column plus a FLEXIBLE `data` object holding the
//! document body. UUIDs are stored as strings; enums as strings with ASSERT
//! constraints.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "global_records",
        sql: SCHEMA_V1,
    },
    Migration {
        version: 2,
        name: "document_collections",
        sql: SCHEMA_V2,
    },
];

// -----------------------------------------------------------------------
// Schema v1: users, companies, memberships, sessions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users (global scope)
-- =======================================================================
DEFINE TABLE users SCHEMAFULL;
DEFINE FIELD telegram_id ON TABLE users TYPE int;
DEFINE FIELD username ON TABLE users TYPE option<string>;
DEFINE FIELD display_name ON TABLE users TYPE string;
DEFINE FIELD avatar_url ON TABLE users TYPE option<string>;
DEFINE FIELD created_at ON TABLE users TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE users TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_users_telegram_id ON TABLE users \
    COLUMNS telegram_id UNIQUE;

-- =======================================================================
-- Companies (global scope)
-- =======================================================================
DEFINE TABLE companies SCHEMAFULL;
DEFINE FIELD name ON TABLE companies TYPE string;
DEFINE FIELD owner_id ON TABLE companies TYPE string;
DEFINE FIELD tier ON TABLE companies TYPE string \
    ASSERT $value IN ['Trial', 'Basic', 'Pro', 'Enterprise'];
DEFINE FIELD trial_ends ON TABLE companies TYPE datetime;
DEFINE FIELD expires_at ON TABLE companies TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE companies TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE companies TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Company profiles (one per company)
-- =======================================================================
DEFINE TABLE company_profiles SCHEMAFULL;
DEFINE FIELD company_id ON TABLE company_profiles TYPE string;
DEFINE FIELD description ON TABLE company_profiles TYPE option<string>;
DEFINE FIELD industry ON TABLE company_profiles TYPE option<string>;
DEFINE FIELD employee_count ON TABLE company_profiles TYPE option<int>;
DEFINE FIELD trial_ends ON TABLE company_profiles TYPE datetime;
DEFINE FIELD created_at ON TABLE company_profiles TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE company_profiles TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_company_profiles_company ON TABLE company_profiles \
    COLUMNS company_id UNIQUE;

-- =======================================================================
-- Employees (company membership)
-- =======================================================================
DEFINE TABLE employees SCHEMAFULL;
DEFINE FIELD company_id ON TABLE employees TYPE string;
DEFINE FIELD user_id ON TABLE employees TYPE string;
DEFINE FIELD role ON TABLE employees TYPE string \
    ASSERT $value IN ['Owner', 'Admin', 'Member'];
DEFINE FIELD position ON TABLE employees TYPE option<string>;
DEFINE FIELD permissions ON TABLE employees TYPE array<string> \
    DEFAULT [];
DEFINE FIELD created_at ON TABLE employees TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE employees TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_employees_company_user ON TABLE employees \
    COLUMNS company_id, user_id UNIQUE;
DEFINE INDEX idx_employees_user ON TABLE employees COLUMNS user_id;

-- =======================================================================
-- Sessions (temp: no company; permanent: bound to one company)
-- =======================================================================
DEFINE TABLE sessions SCHEMAFULL;
DEFINE FIELD user_id ON TABLE sessions TYPE string;
DEFINE FIELD company_id ON TABLE sessions TYPE option<string>;
DEFINE FIELD kind ON TABLE sessions TYPE string \
    ASSERT $value IN ['Temp', 'Permanent'];
DEFINE FIELD token_hash ON TABLE sessions TYPE option<string>;
DEFINE FIELD expires_at ON TABLE sessions TYPE datetime;
DEFINE FIELD created_at ON TABLE sessions TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_sessions_token_hash ON TABLE sessions \
    COLUMNS token_hash;
DEFINE INDEX idx_sessions_user ON TABLE sessions COLUMNS user_id;
";

// -----------------------------------------------------------------------
// Schema v2: tenant-scoped document collections
// -----------------------------------------------------------------------

const SCHEMA_V2: &str = "\
-- tasks
DEFINE TABLE tasks SCHEMAFULL;
DEFINE FIELD company_id ON TABLE tasks TYPE string;
DEFINE FIELD data ON TABLE tasks TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE tasks TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE tasks TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tasks_company ON TABLE tasks COLUMNS company_id;

-- results
DEFINE TABLE results SCHEMAFULL;
DEFINE FIELD company_id ON TABLE results TYPE string;
DEFINE FIELD data ON TABLE results TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE results TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE results TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_results_company ON TABLE results COLUMNS company_id;

-- templates
DEFINE TABLE templates SCHEMAFULL;
DEFINE FIELD company_id ON TABLE templates TYPE string;
DEFINE FIELD data ON TABLE templates TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE templates TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE templates TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_templates_company ON TABLE templates COLUMNS company_id;

-- processes
DEFINE TABLE processes SCHEMAFULL;
DEFINE FIELD company_id ON TABLE processes TYPE string;
DEFINE FIELD data ON TABLE processes TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE processes TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE processes TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_processes_company ON TABLE processes COLUMNS company_id;

-- instructions
DEFINE TABLE instructions SCHEMAFULL;
DEFINE FIELD company_id ON TABLE instructions TYPE string;
DEFINE FIELD data ON TABLE instructions TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE instructions TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE instructions TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_instructions_company ON TABLE instructions COLUMNS company_id;

-- audits
DEFINE TABLE audits SCHEMAFULL;
DEFINE FIELD company_id ON TABLE audits TYPE string;
DEFINE FIELD data ON TABLE audits TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE audits TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE audits TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_audits_company ON TABLE audits COLUMNS company_id;

-- telegramGroups
DEFINE TABLE telegramGroups SCHEMAFULL;
DEFINE FIELD company_id ON TABLE telegramGroups TYPE string;
DEFINE FIELD data ON TABLE telegramGroups TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE telegramGroups TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE telegramGroups TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_telegramGroups_company ON TABLE telegramGroups COLUMNS company_id;

-- telegramMessageLogs
DEFINE TABLE telegramMessageLogs SCHEMAFULL;
DEFINE FIELD company_id ON TABLE telegramMessageLogs TYPE string;
DEFINE FIELD data ON TABLE telegramMessageLogs TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE telegramMessageLogs TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE telegramMessageLogs TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_telegramMessageLogs_company ON TABLE telegramMessageLogs COLUMNS company_id;

-- telegramMembers
DEFINE TABLE telegramMembers SCHEMAFULL;
DEFINE FIELD company_id ON TABLE telegramMembers TYPE string;
DEFINE FIELD data ON TABLE telegramMembers TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE telegramMembers TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE telegramMembers TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_telegramMembers_company ON TABLE telegramMembers COLUMNS company_id;

-- divisions
DEFINE TABLE divisions SCHEMAFULL;
DEFINE FIELD company_id ON TABLE divisions TYPE string;
DEFINE FIELD data ON TABLE divisions TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE divisions TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE divisions TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_divisions_company ON TABLE divisions COLUMNS company_id;

-- departments
DEFINE TABLE departments SCHEMAFULL;
DEFINE FIELD company_id ON TABLE departments TYPE string;
DEFINE FIELD data ON TABLE departments TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE departments TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE departments TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_departments_company ON TABLE departments COLUMNS company_id;
";

/// Run all pending migrations against the connected database.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Latest schema version known to this build.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fineko_core::store::Collection;

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }

    #[test]
    fn every_collection_has_a_table() {
        for collection in Collection::ALL {
            let ddl = format!("DEFINE TABLE {} SCHEMAFULL;", collection.as_str());
            assert!(SCHEMA_V2.contains(&ddl), "missing table for {collection}");
        }
    }
}
