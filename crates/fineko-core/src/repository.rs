//! Repository trait definitions for the global records.
//!
//! Users, companies, employees and sessions have fixed shapes and
//! cross-tenant lookups (a user's companies, a session by token), so they
//! get typed repositories instead of going through the document store.
//! All operations are async.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::FinekoResult;
use crate::models::{
    company::{Company, CompanyProfile, CreateCompany, CreatedCompany, UpdateCompany, UpdateCompanyProfile},
    employee::{CreateEmployee, Employee, UpdateEmployee},
    session::{CreateSession, Session},
    user::{CreateUser, UpdateUser, User},
};

// ---------------------------------------------------------------------------
// Users (global scope)
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = FinekoResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = FinekoResult<User>> + Send;
    fn get_by_telegram_id(
        &self,
        telegram_id: i64,
    ) -> impl Future<Output = FinekoResult<User>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = FinekoResult<User>> + Send;
}

// ---------------------------------------------------------------------------
// Companies (global scope)
// ---------------------------------------------------------------------------

pub trait CompanyRepository: Send + Sync {
    /// Create the company, its owner employee link and its profile as one
    /// atomic batch. Either all three exist afterwards or none do.
    fn create_with_owner(
        &self,
        input: CreateCompany,
    ) -> impl Future<Output = FinekoResult<CreatedCompany>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = FinekoResult<Company>> + Send;
    fn get_many(&self, ids: &[Uuid]) -> impl Future<Output = FinekoResult<Vec<Company>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateCompany,
    ) -> impl Future<Output = FinekoResult<Company>> + Send;
    fn get_profile(
        &self,
        company_id: Uuid,
    ) -> impl Future<Output = FinekoResult<CompanyProfile>> + Send;
    fn update_profile(
        &self,
        company_id: Uuid,
        input: UpdateCompanyProfile,
    ) -> impl Future<Output = FinekoResult<CompanyProfile>> + Send;
}

// ---------------------------------------------------------------------------
// Employees (tenant scope, with a cross-tenant lookup by user)
// ---------------------------------------------------------------------------

pub trait EmployeeRepository: Send + Sync {
    fn create(&self, input: CreateEmployee) -> impl Future<Output = FinekoResult<Employee>> + Send;
    fn get_by_id(
        &self,
        company_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = FinekoResult<Employee>> + Send;
    /// The membership of `user_id` in `company_id`.
    fn get_by_user(
        &self,
        company_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = FinekoResult<Employee>> + Send;
    fn list_by_company(
        &self,
        company_id: Uuid,
    ) -> impl Future<Output = FinekoResult<Vec<Employee>>> + Send;
    /// Every membership of a user, across companies.
    fn list_by_user(&self, user_id: Uuid) -> impl Future<Output = FinekoResult<Vec<Employee>>> + Send;
    fn update(
        &self,
        company_id: Uuid,
        id: Uuid,
        input: UpdateEmployee,
    ) -> impl Future<Output = FinekoResult<Employee>> + Send;
    fn delete(&self, company_id: Uuid, id: Uuid) -> impl Future<Output = FinekoResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

pub trait SessionRepository: Send + Sync {
    fn create(&self, input: CreateSession) -> impl Future<Output = FinekoResult<Session>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = FinekoResult<Session>> + Send;
    fn get_by_token_hash(
        &self,
        token_hash: &str,
    ) -> impl Future<Output = FinekoResult<Session>> + Send;
    fn invalidate(&self, id: Uuid) -> impl Future<Output = FinekoResult<()>> + Send;
    /// Atomically delete the temp session with `token_hash`, returning it.
    /// `None` when no such session remains, e.g. a concurrent caller
    /// consumed it first.
    fn consume_temp(
        &self,
        token_hash: &str,
    ) -> impl Future<Output = FinekoResult<Option<Session>>> + Send;
    /// Drop every session of a user bound to `company_id`.
    fn invalidate_user_sessions(
        &self,
        user_id: Uuid,
        company_id: Uuid,
    ) -> impl Future<Output = FinekoResult<()>> + Send;
    /// Delete sessions that expired before `now`; returns how many.
    fn cleanup_expired(&self, now: DateTime<Utc>) -> impl Future<Output = FinekoResult<u64>> + Send;
}
