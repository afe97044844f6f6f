//! Integration tests for the tenant-safe document store using in-memory
//! SurrealDB.

use fineko_core::FinekoError;
use fineko_core::store::{Collection, DocumentStore};
use fineko_db::SurrealDocumentStore;
use serde_json::json;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> SurrealDocumentStore<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    fineko_db::run_migrations(&db).await.unwrap();
    SurrealDocumentStore::new(db)
}

#[tokio::test]
async fn create_and_read_back() {
    let store = setup().await;
    let company = Uuid::new_v4();

    let doc = store
        .create(
            Collection::Tasks,
            json!({ "companyId": company.to_string(), "title": "Call supplier", "quadrant": null }),
        )
        .await
        .unwrap();
    assert_eq!(doc.company_id, company);
    assert_eq!(doc.data["title"], "Call supplier");
    assert!(!doc.data.contains_key("companyId"));

    let fetched = store
        .get_and_validate_tenant(Collection::Tasks, doc.id, company)
        .await
        .unwrap()
        .expect("document should be visible to its owner");
    assert_eq!(fetched.id, doc.id);
    assert_eq!(fetched.to_value()["companyId"], company.to_string());
}

#[tokio::test]
async fn create_without_company_is_rejected() {
    let store = setup().await;

    let err = store
        .create(Collection::Tasks, json!({ "title": "orphan" }))
        .await
        .unwrap_err();
    assert!(matches!(err, FinekoError::Validation { .. }));
}

#[tokio::test]
async fn other_tenant_cannot_read() {
    let store = setup().await;
    let owner = Uuid::new_v4();
    let intruder = Uuid::new_v4();

    let doc = store
        .create(Collection::Results, json!({ "companyId": owner.to_string(), "title": "Q4" }))
        .await
        .unwrap();

    let seen = store
        .get_and_validate_tenant(Collection::Results, doc.id, intruder)
        .await
        .unwrap();
    assert!(seen.is_none());
}

#[tokio::test]
async fn other_tenant_update_is_a_no_op() {
    let store = setup().await;
    let owner = Uuid::new_v4();
    let intruder = Uuid::new_v4();

    let doc = store
        .create(Collection::Tasks, json!({ "companyId": owner.to_string(), "title": "original" }))
        .await
        .unwrap();

    let updated = store
        .update(Collection::Tasks, doc.id, intruder, json!({ "title": "hijacked" }))
        .await
        .unwrap();
    assert!(updated.is_none());

    let unchanged = store
        .get_and_validate_tenant(Collection::Tasks, doc.id, owner)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.data["title"], "original");
}

#[tokio::test]
async fn update_merges_and_keeps_ownership() {
    let store = setup().await;
    let owner = Uuid::new_v4();

    let doc = store
        .create(
            Collection::Tasks,
            json!({ "companyId": owner.to_string(), "title": "draft", "status": "todo" }),
        )
        .await
        .unwrap();

    let updated = store
        .update(
            Collection::Tasks,
            doc.id,
            owner,
            json!({ "status": "done", "companyId": Uuid::new_v4().to_string() }),
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.company_id, owner);
    assert_eq!(updated.data["title"], "draft");
    assert_eq!(updated.data["status"], "done");
    assert!(updated.updated_at >= doc.updated_at);
}

#[tokio::test]
async fn remove_respects_tenant() {
    let store = setup().await;
    let owner = Uuid::new_v4();
    let intruder = Uuid::new_v4();

    let doc = store
        .create(Collection::Audits, json!({ "companyId": owner.to_string() }))
        .await
        .unwrap();

    assert!(!store.remove(Collection::Audits, doc.id, intruder).await.unwrap());
    assert!(store.remove(Collection::Audits, doc.id, owner).await.unwrap());
    assert!(
        store
            .get_and_validate_tenant(Collection::Audits, doc.id, owner)
            .await
            .unwrap()
            .is_none()
    );
    assert!(!store.remove(Collection::Audits, doc.id, owner).await.unwrap());
}

#[tokio::test]
async fn fresh_company_lists_nothing() {
    let store = setup().await;

    for collection in Collection::ALL {
        let docs = store
            .list_for_company(collection, Uuid::new_v4())
            .await
            .unwrap();
        assert!(docs.is_empty(), "{collection} should be empty");
    }
}

#[tokio::test]
async fn query_filters_by_field_and_tenant() {
    let store = setup().await;
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();

    for (company, day) in [(a, "2026-10-14"), (a, "2026-10-15"), (b, "2026-10-14")] {
        store
            .create(
                Collection::Tasks,
                json!({ "companyId": company.to_string(), "dueDate": day }),
            )
            .await
            .unwrap();
    }

    let mine = store
        .query_for_company(Collection::Tasks, a, "dueDate", json!("2026-10-14"))
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].company_id, a);

    let all_for_a = store.list_for_company(Collection::Tasks, a).await.unwrap();
    assert_eq!(all_for_a.len(), 2);
}

#[tokio::test]
async fn query_rejects_unsafe_field_names() {
    let store = setup().await;

    let err = store
        .get_by_query(Collection::Tasks, "title = '' OR true --", json!("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, FinekoError::Validation { .. }));
}
