//! Integration tests for the user and session repositories using
//! in-memory SurrealDB.

use chrono::{Duration, Utc};
use fineko_core::FinekoError;
use fineko_core::models::session::{CreateSession, SessionKind};
use fineko_core::models::user::{CreateUser, TelegramIdentity, UpdateUser};
use fineko_core::repository::{SessionRepository, UserRepository};
use fineko_db::repository::{SurrealSessionRepository, SurrealUserRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    fineko_db::run_migrations(&db).await.unwrap();
    db
}

fn identity() -> TelegramIdentity {
    TelegramIdentity {
        id: 424242,
        first_name: "Olena".into(),
        last_name: Some("Kovalenko".into()),
        username: Some("olena_k".into()),
        photo_url: Some("https://t.me/i/olena.jpg".into()),
    }
}

#[tokio::test]
async fn create_and_find_by_telegram_id() {
    let repo = SurrealUserRepository::new(setup().await);

    let user = repo.create(CreateUser::from(&identity())).await.unwrap();
    assert_eq!(user.display_name, "Olena Kovalenko");

    let found = repo.get_by_telegram_id(424242).await.unwrap();
    assert_eq!(found.id, user.id);
    assert_eq!(found.username.as_deref(), Some("olena_k"));

    let by_id = repo.get_by_id(user.id).await.unwrap();
    assert_eq!(by_id.telegram_id, 424242);
}

#[tokio::test]
async fn telegram_id_is_unique() {
    let repo = SurrealUserRepository::new(setup().await);

    repo.create(CreateUser::from(&identity())).await.unwrap();
    assert!(repo.create(CreateUser::from(&identity())).await.is_err());
}

#[tokio::test]
async fn unknown_telegram_id_is_not_found() {
    let repo = SurrealUserRepository::new(setup().await);

    let err = repo.get_by_telegram_id(7).await.unwrap_err();
    assert!(matches!(err, FinekoError::NotFound { .. }));
}

#[tokio::test]
async fn update_changes_profile_only() {
    let repo = SurrealUserRepository::new(setup().await);
    let user = repo.create(CreateUser::from(&identity())).await.unwrap();

    let updated = repo
        .update(
            user.id,
            UpdateUser {
                display_name: Some("Olena K.".into()),
                avatar_url: Some(None),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.display_name, "Olena K.");
    assert_eq!(updated.avatar_url, None);
    assert_eq!(updated.telegram_id, user.telegram_id);
    assert_eq!(updated.username, user.username);
}

#[tokio::test]
async fn session_lookup_by_hash_and_id() {
    let repo = SurrealSessionRepository::new(setup().await);
    let user_id = Uuid::new_v4();

    let temp = repo
        .create(CreateSession {
            user_id,
            company_id: None,
            kind: SessionKind::Temp,
            token_hash: Some("abc123".into()),
            expires_at: Utc::now() + Duration::minutes(5),
        })
        .await
        .unwrap();
    assert_eq!(temp.kind, SessionKind::Temp);
    assert!(temp.company_id.is_none());

    let found = repo.get_by_token_hash("abc123").await.unwrap();
    assert_eq!(found.id, temp.id);

    repo.invalidate(temp.id).await.unwrap();
    let err = repo.get_by_id(temp.id).await.unwrap_err();
    assert!(matches!(err, FinekoError::NotFound { .. }));
}

#[tokio::test]
async fn consume_temp_returns_the_session_once() {
    let repo = SurrealSessionRepository::new(setup().await);
    let user_id = Uuid::new_v4();

    let temp = repo
        .create(CreateSession {
            user_id,
            company_id: None,
            kind: SessionKind::Temp,
            token_hash: Some("once".into()),
            expires_at: Utc::now() + Duration::minutes(5),
        })
        .await
        .unwrap();

    let consumed = repo.consume_temp("once").await.unwrap().unwrap();
    assert_eq!(consumed.id, temp.id);
    assert_eq!(consumed.user_id, user_id);
    assert!(repo.consume_temp("once").await.unwrap().is_none());
    assert!(repo.get_by_id(temp.id).await.is_err());
}

#[tokio::test]
async fn invalidate_user_sessions_is_company_scoped() {
    let repo = SurrealSessionRepository::new(setup().await);
    let user_id = Uuid::new_v4();
    let company_a = Uuid::new_v4();
    let company_b = Uuid::new_v4();

    let mut ids = Vec::new();
    for company in [company_a, company_a, company_b] {
        let s = repo
            .create(CreateSession {
                user_id,
                company_id: Some(company),
                kind: SessionKind::Permanent,
                token_hash: None,
                expires_at: Utc::now() + Duration::days(30),
            })
            .await
            .unwrap();
        ids.push(s.id);
    }

    repo.invalidate_user_sessions(user_id, company_a).await.unwrap();

    assert!(repo.get_by_id(ids[0]).await.is_err());
    assert!(repo.get_by_id(ids[1]).await.is_err());
    let kept = repo.get_by_id(ids[2]).await.unwrap();
    assert_eq!(kept.company_id, Some(company_b));
}

#[tokio::test]
async fn cleanup_removes_only_expired() {
    let repo = SurrealSessionRepository::new(setup().await);
    let user_id = Uuid::new_v4();
    let now = Utc::now();

    for offset in [-10, -1, 60] {
        repo.create(CreateSession {
            user_id,
            company_id: None,
            kind: SessionKind::Temp,
            token_hash: None,
            expires_at: now + Duration::minutes(offset),
        })
        .await
        .unwrap();
    }

    assert_eq!(repo.cleanup_expired(now).await.unwrap(), 2);
    assert_eq!(repo.cleanup_expired(now).await.unwrap(), 0);
}
