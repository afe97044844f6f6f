//! Integration tests for the company and employee repositories using
//! in-memory SurrealDB.

use chrono::{Duration, Utc};
use fineko_core::FinekoError;
use fineko_core::models::company::{CreateCompany, SubscriptionTier, UpdateCompany, UpdateCompanyProfile};
use fineko_core::models::employee::{CreateEmployee, EmployeeRole, UpdateEmployee};
use fineko_core::models::user::CreateUser;
use fineko_core::repository::{CompanyRepository, EmployeeRepository, UserRepository};
use fineko_db::repository::{
    SurrealCompanyRepository, SurrealEmployeeRepository, SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

/// Helper: spin up in-memory DB, run migrations, create two users.
async fn setup() -> (Surreal<Db>, Uuid, Uuid) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    fineko_db::run_migrations(&db).await.unwrap();

    let users = SurrealUserRepository::new(db.clone());
    let owner = users
        .create(CreateUser {
            telegram_id: 1001,
            username: Some("olena".into()),
            display_name: "Olena Kovalenko".into(),
            avatar_url: None,
        })
        .await
        .unwrap();
    let member = users
        .create(CreateUser {
            telegram_id: 1002,
            username: None,
            display_name: "Taras".into(),
            avatar_url: None,
        })
        .await
        .unwrap();

    (db, owner.id, member.id)
}

fn new_company(owner_id: Uuid) -> CreateCompany {
    CreateCompany {
        name: "Меблі Плюс".into(),
        owner_id,
        owner_position: Some("CEO".into()),
        trial_ends: Utc::now() + Duration::days(30),
    }
}

#[tokio::test]
async fn company_creation_writes_owner_and_profile() {
    let (db, owner_id, _) = setup().await;
    let companies = SurrealCompanyRepository::new(db.clone());
    let employees = SurrealEmployeeRepository::new(db);

    let created = companies.create_with_owner(new_company(owner_id)).await.unwrap();

    assert_eq!(created.company.owner_id, owner_id);
    assert_eq!(created.company.tier, SubscriptionTier::Trial);
    assert_eq!(created.owner.role, EmployeeRole::Owner);
    assert_eq!(created.owner.user_id, owner_id);
    assert_eq!(created.owner.position.as_deref(), Some("CEO"));
    assert_eq!(created.profile.company_id, created.company.id);

    let trial = created.profile.trial_ends - Utc::now();
    assert!(trial > Duration::days(29) && trial <= Duration::days(30));

    let staff = employees.list_by_company(created.company.id).await.unwrap();
    assert_eq!(staff.len(), 1);
    assert!(staff[0].is_owner());
}

#[tokio::test]
async fn failed_company_batch_leaves_nothing_behind() {
    let (db, owner_id, _) = setup().await;
    db.query(
        "DEFINE FIELD OVERWRITE position ON employees TYPE option<string> \
         ASSERT $value != 'boom'",
    )
    .await
    .unwrap()
    .check()
    .unwrap();
    let companies = SurrealCompanyRepository::new(db.clone());

    let err = companies
        .create_with_owner(CreateCompany {
            owner_position: Some("boom".into()),
            ..new_company(owner_id)
        })
        .await
        .unwrap_err();
    assert!(matches!(err, FinekoError::Database(_)));

    for table in ["companies", "employees", "company_profiles"] {
        let mut result = db
            .query(format!("SELECT * FROM {table}"))
            .await
            .unwrap();
        let rows: Vec<surrealdb_types::Value> = result.take(0).unwrap();
        assert!(rows.is_empty(), "{table} kept rows from the failed batch");
    }
}

#[tokio::test]
async fn memberships_are_listed_per_user() {
    let (db, owner_id, member_id) = setup().await;
    let companies = SurrealCompanyRepository::new(db.clone());
    let employees = SurrealEmployeeRepository::new(db);

    let first = companies.create_with_owner(new_company(owner_id)).await.unwrap();
    let second = companies.create_with_owner(new_company(owner_id)).await.unwrap();
    employees
        .create(CreateEmployee {
            company_id: second.company.id,
            user_id: member_id,
            role: EmployeeRole::Member,
            position: None,
            permissions: vec!["tasks.create".into()],
        })
        .await
        .unwrap();

    let owned = employees.list_by_user(owner_id).await.unwrap();
    assert_eq!(owned.len(), 2);

    let joined = employees.list_by_user(member_id).await.unwrap();
    assert_eq!(joined.len(), 1);
    assert_eq!(joined[0].company_id, second.company.id);

    let ids: Vec<Uuid> = owned.iter().map(|e| e.company_id).collect();
    let listed = companies.get_many(&ids).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().any(|c| c.id == first.company.id));
}

#[tokio::test]
async fn duplicate_membership_is_rejected() {
    let (db, owner_id, _) = setup().await;
    let companies = SurrealCompanyRepository::new(db.clone());
    let employees = SurrealEmployeeRepository::new(db);

    let created = companies.create_with_owner(new_company(owner_id)).await.unwrap();
    let again = employees
        .create(CreateEmployee {
            company_id: created.company.id,
            user_id: owner_id,
            role: EmployeeRole::Member,
            position: None,
            permissions: vec![],
        })
        .await;
    assert!(again.is_err());
}

#[tokio::test]
async fn employee_lookup_is_company_scoped() {
    let (db, owner_id, member_id) = setup().await;
    let companies = SurrealCompanyRepository::new(db.clone());
    let employees = SurrealEmployeeRepository::new(db);

    let a = companies.create_with_owner(new_company(owner_id)).await.unwrap();
    let b = companies.create_with_owner(new_company(member_id)).await.unwrap();

    let err = employees.get_by_id(b.company.id, a.owner.id).await.unwrap_err();
    assert!(matches!(err, FinekoError::NotFound { .. }));

    let err = employees.get_by_user(a.company.id, member_id).await.unwrap_err();
    assert!(matches!(err, FinekoError::NotFound { .. }));
}

#[tokio::test]
async fn employee_update_and_delete() {
    let (db, owner_id, member_id) = setup().await;
    let companies = SurrealCompanyRepository::new(db.clone());
    let employees = SurrealEmployeeRepository::new(db);

    let created = companies.create_with_owner(new_company(owner_id)).await.unwrap();
    let member = employees
        .create(CreateEmployee {
            company_id: created.company.id,
            user_id: member_id,
            role: EmployeeRole::Member,
            position: Some("Sales".into()),
            permissions: vec![],
        })
        .await
        .unwrap();

    let promoted = employees
        .update(
            created.company.id,
            member.id,
            UpdateEmployee {
                role: Some(EmployeeRole::Admin),
                position: Some(None),
                permissions: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(promoted.role, EmployeeRole::Admin);
    assert_eq!(promoted.position, None);

    employees.delete(created.company.id, member.id).await.unwrap();
    assert!(
        employees
            .get_by_user(created.company.id, member_id)
            .await
            .is_err()
    );
}

#[tokio::test]
async fn company_and_profile_updates() {
    let (db, owner_id, _) = setup().await;
    let companies = SurrealCompanyRepository::new(db);

    let created = companies.create_with_owner(new_company(owner_id)).await.unwrap();
    let expires = Utc::now() + Duration::days(365);

    let upgraded = companies
        .update(
            created.company.id,
            UpdateCompany {
                name: None,
                tier: Some(SubscriptionTier::Pro),
                expires_at: Some(Some(expires)),
            },
        )
        .await
        .unwrap();
    assert_eq!(upgraded.tier, SubscriptionTier::Pro);
    assert!(upgraded.is_active(Utc::now()));

    let profile = companies
        .update_profile(
            created.company.id,
            UpdateCompanyProfile {
                description: Some("Виробництво меблів".into()),
                industry: Some("furniture".into()),
                employee_count: Some(12),
            },
        )
        .await
        .unwrap();
    assert_eq!(profile.industry.as_deref(), Some("furniture"));
    assert_eq!(profile.employee_count, Some(12));
}

#[tokio::test]
async fn missing_company_is_not_found() {
    let (db, _, _) = setup().await;
    let companies = SurrealCompanyRepository::new(db);

    let err = companies.get_by_id(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, FinekoError::NotFound { .. }));
    assert!(companies.get_many(&[]).await.unwrap().is_empty());
}
