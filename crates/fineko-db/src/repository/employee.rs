//! SurrealDB implementation of [`EmployeeRepository`].

use chrono::{DateTime, Utc};
use fineko_core::error::FinekoResult;
use fineko_core::models::employee::{CreateEmployee, Employee, EmployeeRole, UpdateEmployee};
use fineko_core::repository::EmployeeRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct EmployeeRow {
    company_id: String,
    user_id: String,
    role: String,
    position: Option<String>,
    permissions: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct EmployeeRowWithId {
    record_id: String,
    company_id: String,
    user_id: String,
    role: String,
    position: Option<String>,
    permissions: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_role(s: &str) -> Result<EmployeeRole, DbError> {
    EmployeeRole::parse(s).ok_or_else(|| DbError::Decode(format!("unknown employee role: {s}")))
}

impl EmployeeRow {
    fn into_employee(self, id: Uuid) -> Result<Employee, DbError> {
        Ok(Employee {
            id,
            company_id: parse_uuid(&self.company_id, "company")?,
            user_id: parse_uuid(&self.user_id, "user")?,
            role: parse_role(&self.role)?,
            position: self.position,
            permissions: self.permissions,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl EmployeeRowWithId {
    fn try_into_employee(self) -> Result<Employee, DbError> {
        Ok(Employee {
            id: parse_uuid(&self.record_id, "employee")?,
            company_id: parse_uuid(&self.company_id, "company")?,
            user_id: parse_uuid(&self.user_id, "user")?,
            role: parse_role(&self.role)?,
            position: self.position,
            permissions: self.permissions,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Employee repository.
#[derive(Clone)]
pub struct SurrealEmployeeRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealEmployeeRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> EmployeeRepository for SurrealEmployeeRepository<C> {
    async fn create(&self, input: CreateEmployee) -> FinekoResult<Employee> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('employees', $id) SET \
                 company_id = $company_id, \
                 user_id = $user_id, \
                 role = $role, \
                 position = $position, \
                 permissions = $permissions",
            )
            .bind(("id", id_str.clone()))
            .bind(("company_id", input.company_id.to_string()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("role", input.role.as_str()))
            .bind(("position", input.position))
            .bind(("permissions", input.permissions))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<EmployeeRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "employee".into(),
            id: id_str,
        })?;

        Ok(row.into_employee(id)?)
    }

    async fn get_by_id(&self, company_id: Uuid, id: Uuid) -> FinekoResult<Employee> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('employees', $id) \
                 WHERE company_id = $company_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("company_id", company_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EmployeeRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "employee".into(),
            id: id_str,
        })?;

        Ok(row.into_employee(id)?)
    }

    async fn get_by_user(&self, company_id: Uuid, user_id: Uuid) -> FinekoResult<Employee> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM employees \
                 WHERE company_id = $company_id AND user_id = $user_id",
            )
            .bind(("company_id", company_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EmployeeRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "employee".into(),
            id: format!("user_id={user_id}"),
        })?;

        Ok(row.try_into_employee()?)
    }

    async fn list_by_company(&self, company_id: Uuid) -> FinekoResult<Vec<Employee>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM employees \
                 WHERE company_id = $company_id \
                 ORDER BY created_at ASC",
            )
            .bind(("company_id", company_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EmployeeRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_employee())
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(items)
    }

    async fn list_by_user(&self, user_id: Uuid) -> FinekoResult<Vec<Employee>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM employees \
                 WHERE user_id = $user_id \
                 ORDER BY created_at ASC",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EmployeeRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_employee())
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(items)
    }

    async fn update(
        &self,
        company_id: Uuid,
        id: Uuid,
        input: UpdateEmployee,
    ) -> FinekoResult<Employee> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.role.is_some() {
            sets.push("role = $role");
        }
        if input.position.is_some() {
            sets.push("position = $position");
        }
        if input.permissions.is_some() {
            sets.push("permissions = $permissions");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('employees', $id) SET {} \
             WHERE company_id = $company_id",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("company_id", company_id.to_string()));

        if let Some(role) = input.role {
            builder = builder.bind(("role", role.as_str()));
        }
        if let Some(position) = input.position {
            builder = builder.bind(("position", position));
        }
        if let Some(permissions) = input.permissions {
            builder = builder.bind(("permissions", permissions));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<EmployeeRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "employee".into(),
            id: id_str,
        })?;

        Ok(row.into_employee(id)?)
    }

    async fn delete(&self, company_id: Uuid, id: Uuid) -> FinekoResult<()> {
        self.db
            .query(
                "DELETE type::record('employees', $id) \
                 WHERE company_id = $company_id",
            )
            .bind(("id", id.to_string()))
            .bind(("company_id", company_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }
}
