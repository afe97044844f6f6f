//! SurrealDB implementation of [`CompanyRepository`].

use chrono::{DateTime, Utc};
use fineko_core::error::FinekoResult;
use fineko_core::models::company::{
    Company, CompanyProfile, CreateCompany, CreatedCompany, SubscriptionTier, UpdateCompany,
    UpdateCompanyProfile,
};
use fineko_core::models::employee::EmployeeRole;
use fineko_core::repository::{CompanyRepository, EmployeeRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;
use uuid::Uuid;

use super::employee::SurrealEmployeeRepository;
use crate::error::{DbError, parse_uuid};

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct CompanyRow {
    name: String,
    owner_id: String,
    tier: String,
    trial_ends: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct CompanyRowWithId {
    record_id: String,
    name: String,
    owner_id: String,
    tier: String,
    trial_ends: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ProfileRowWithId {
    record_id: String,
    company_id: String,
    description: Option<String>,
    industry: Option<String>,
    employee_count: Option<u32>,
    trial_ends: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_tier(s: &str) -> Result<SubscriptionTier, DbError> {
    SubscriptionTier::parse(s)
        .ok_or_else(|| DbError::Decode(format!("unknown subscription tier: {s}")))
}

impl CompanyRow {
    fn into_company(self, id: Uuid) -> Result<Company, DbError> {
        Ok(Company {
            id,
            name: self.name,
            owner_id: parse_uuid(&self.owner_id, "owner")?,
            tier: parse_tier(&self.tier)?,
            trial_ends: self.trial_ends,
            expires_at: self.expires_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl CompanyRowWithId {
    fn try_into_company(self) -> Result<Company, DbError> {
        Ok(Company {
            id: parse_uuid(&self.record_id, "company")?,
            name: self.name,
            owner_id: parse_uuid(&self.owner_id, "owner")?,
            tier: parse_tier(&self.tier)?,
            trial_ends: self.trial_ends,
            expires_at: self.expires_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl ProfileRowWithId {
    fn try_into_profile(self) -> Result<CompanyProfile, DbError> {
        Ok(CompanyProfile {
            id: parse_uuid(&self.record_id, "profile")?,
            company_id: parse_uuid(&self.company_id, "company")?,
            description: self.description,
            industry: self.industry,
            employee_count: self.employee_count,
            trial_ends: self.trial_ends,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Company repository.
#[derive(Clone)]
pub struct SurrealCompanyRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCompanyRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CompanyRepository for SurrealCompanyRepository<C> {
    async fn create_with_owner(&self, input: CreateCompany) -> FinekoResult<CreatedCompany> {
        let company_id = Uuid::new_v4();
        let employee_id = Uuid::new_v4();
        let profile_id = Uuid::new_v4();

        // All three records or none.
        self.db
            .query(
                "BEGIN TRANSACTION; \
                 CREATE type::record('companies', $company_id) SET \
                     name = $name, \
                     owner_id = $owner_id, \
                     tier = $tier, \
                     trial_ends = $trial_ends, \
                     expires_at = NONE; \
                 CREATE type::record('employees', $employee_id) SET \
                     company_id = $company_id, \
                     user_id = $owner_id, \
                     role = $role, \
                     position = $position, \
                     permissions = []; \
                 CREATE type::record('company_profiles', $profile_id) SET \
                     company_id = $company_id, \
                     trial_ends = $trial_ends; \
                 COMMIT TRANSACTION;",
            )
            .bind(("company_id", company_id.to_string()))
            .bind(("employee_id", employee_id.to_string()))
            .bind(("profile_id", profile_id.to_string()))
            .bind(("name", input.name))
            .bind(("owner_id", input.owner_id.to_string()))
            .bind(("tier", SubscriptionTier::Trial.as_str()))
            .bind(("trial_ends", input.trial_ends))
            .bind(("role", EmployeeRole::Owner.as_str()))
            .bind(("position", input.owner_position))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        info!(%company_id, owner_id = %input.owner_id, "Company created");

        let company = self.get_by_id(company_id).await?;
        let owner = SurrealEmployeeRepository::new(self.db.clone())
            .get_by_id(company_id, employee_id)
            .await?;
        let profile = self.get_profile(company_id).await?;

        Ok(CreatedCompany {
            company,
            owner,
            profile,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> FinekoResult<Company> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('companies', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CompanyRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "company".into(),
            id: id_str,
        })?;

        Ok(row.into_company(id)?)
    }

    async fn get_many(&self, ids: &[Uuid]) -> FinekoResult<Vec<Company>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = ids.iter().map(Uuid::to_string).collect();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM companies \
                 WHERE meta::id(id) INSIDE $ids \
                 ORDER BY created_at ASC",
            )
            .bind(("ids", ids))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CompanyRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_company())
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(items)
    }

    async fn update(&self, id: Uuid, input: UpdateCompany) -> FinekoResult<Company> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.tier.is_some() {
            sets.push("tier = $tier");
        }
        if input.expires_at.is_some() {
            sets.push("expires_at = $expires_at");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('companies', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(tier) = input.tier {
            builder = builder.bind(("tier", tier.as_str()));
        }
        if let Some(expires_at) = input.expires_at {
            builder = builder.bind(("expires_at", expires_at));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<CompanyRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "company".into(),
            id: id_str,
        })?;

        Ok(row.into_company(id)?)
    }

    async fn get_profile(&self, company_id: Uuid) -> FinekoResult<CompanyProfile> {
        let company_id_str = company_id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM company_profiles \
                 WHERE company_id = $company_id",
            )
            .bind(("company_id", company_id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProfileRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "company profile".into(),
            id: company_id_str,
        })?;

        Ok(row.try_into_profile()?)
    }

    async fn update_profile(
        &self,
        company_id: Uuid,
        input: UpdateCompanyProfile,
    ) -> FinekoResult<CompanyProfile> {
        let mut sets = Vec::new();
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.industry.is_some() {
            sets.push("industry = $industry");
        }
        if input.employee_count.is_some() {
            sets.push("employee_count = $employee_count");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE company_profiles SET {} WHERE company_id = $company_id",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("company_id", company_id.to_string()));

        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(industry) = input.industry {
            builder = builder.bind(("industry", industry));
        }
        if let Some(employee_count) = input.employee_count {
            builder = builder.bind(("employee_count", employee_count));
        }

        builder
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        self.get_profile(company_id).await
    }
}
