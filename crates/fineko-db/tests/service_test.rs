//! Entity services running over the SurrealDB document store.

use chrono::NaiveDate;
use fineko_core::TenantContext;
use fineko_core::FinekoError;
use fineko_core::models::result::{MAX_SUB_RESULT_DEPTH, NewResult, ResultStatus, SubResult};
use fineko_core::models::task::{NewTask, TaskPatch, TaskStatus};
use fineko_core::models::template::{NewTemplate, Recurrence};
use fineko_core::service::{ResultService, TaskService, TemplateService};
use fineko_db::SurrealDocumentStore;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> SurrealDocumentStore<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    fineko_db::run_migrations(&db).await.unwrap();
    SurrealDocumentStore::new(db)
}

fn ctx() -> TenantContext {
    TenantContext {
        company_id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        employee_id: Uuid::new_v4(),
        session_id: Uuid::new_v4(),
    }
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn tasks_are_isolated_between_companies() {
    let tasks = TaskService::new(setup().await);
    let alpha = ctx();
    let beta = ctx();

    let task = tasks
        .create(
            &alpha,
            NewTask::new("Call supplier", alpha.employee_id, alpha.employee_id, day(2026, 10, 14)),
        )
        .await
        .unwrap();
    assert_eq!(task.company_id, alpha.company_id);

    assert!(tasks.get(&beta, task.id).await.unwrap().is_none());
    assert!(tasks.list(&beta).await.unwrap().is_empty());
    let hijack = TaskPatch {
        title: Some("mine now".into()),
        ..Default::default()
    };
    assert!(tasks.update(&beta, task.id, hijack).await.unwrap().is_none());
    assert!(!tasks.remove(&beta, task.id).await.unwrap());

    let err = tasks.require(&beta, task.id).await.unwrap_err();
    assert!(matches!(err, FinekoError::NotFound { .. }));

    let still = tasks.require(&alpha, task.id).await.unwrap();
    assert_eq!(still.title, "Call supplier");
}

#[tokio::test]
async fn task_day_view_and_completion() {
    let tasks = TaskService::new(setup().await);
    let c = ctx();
    let today = day(2026, 10, 14);

    let first = tasks
        .create(&c, NewTask::new("Invoice", c.employee_id, c.employee_id, today))
        .await
        .unwrap();
    tasks
        .create(&c, NewTask::new("Tomorrow", c.employee_id, c.employee_id, day(2026, 10, 15)))
        .await
        .unwrap();

    let due = tasks.list_for_day(&c, today).await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, first.id);

    let done = tasks
        .set_status(&c, first.id, TaskStatus::Done, Some(45))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(done.status, TaskStatus::Done);
    assert_eq!(done.actual_time, Some(45));
    assert_eq!(done.title, "Invoice");
}

#[tokio::test]
async fn result_keeps_its_sub_result_tree() {
    let results = ResultService::new(setup().await);
    let c = ctx();

    let mut parent = SubResult::new("Launch site");
    parent.sub_results.push(SubResult::new("Design"));
    parent.sub_results.push(SubResult::new("Copy"));
    let created = results
        .create(
            &c,
            NewResult {
                title: "New website".into(),
                description: None,
                deadline: day(2026, 12, 1),
                assignee_id: c.employee_id,
                reporter_id: c.employee_id,
                status: ResultStatus::Active,
                sub_results: vec![parent, SubResult::new("Announce")],
                comments: vec![],
            },
        )
        .await
        .unwrap();

    let fetched = results.require(&c, created.id).await.unwrap();
    assert_eq!(fetched.sub_results.len(), 2);
    assert_eq!(fetched.sub_results[0].sub_results.len(), 2);
    assert_eq!(fetched.progress(), 0.0);

    let design = fetched.sub_results[0].sub_results[0].id;
    let updated = results
        .set_sub_result_completed(&c, created.id, design, true)
        .await
        .unwrap()
        .unwrap();
    assert!((updated.progress() - 1.0 / 3.0).abs() < 1e-9);

    let commented = results
        .add_comment(&c, created.id, "Дизайн погоджено")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(commented.comments.len(), 1);
    assert_eq!(commented.comments[0].author_id, c.employee_id);
}

#[tokio::test]
async fn sub_result_nesting_is_capped() {
    let results = ResultService::new(setup().await);
    let c = ctx();

    let created = results
        .create(
            &c,
            NewResult {
                title: "Deep".into(),
                description: None,
                deadline: day(2026, 12, 1),
                assignee_id: c.employee_id,
                reporter_id: c.employee_id,
                status: ResultStatus::Active,
                sub_results: vec![],
                comments: vec![],
            },
        )
        .await
        .unwrap();

    let mut parent = None;
    for level in 1..=MAX_SUB_RESULT_DEPTH {
        let sub = SubResult::new(format!("level {level}"));
        let sub_id = sub.id;
        results
            .add_sub_result(&c, created.id, parent, sub)
            .await
            .unwrap()
            .unwrap();
        parent = Some(sub_id);
    }

    let err = results
        .add_sub_result(&c, created.id, parent, SubResult::new("too deep"))
        .await
        .unwrap_err();
    assert!(matches!(err, FinekoError::Validation { .. }));
}

fn nested_chain(levels: usize) -> SubResult {
    let mut node = SubResult::new(format!("level {levels}"));
    for level in (1..levels).rev() {
        let mut parent = SubResult::new(format!("level {level}"));
        parent.sub_results.push(node);
        node = parent;
    }
    node
}

fn new_result(c: &TenantContext, sub_results: Vec<SubResult>) -> NewResult {
    NewResult {
        title: "Deep".into(),
        description: None,
        deadline: day(2026, 12, 1),
        assignee_id: c.employee_id,
        reporter_id: c.employee_id,
        status: ResultStatus::Active,
        sub_results,
        comments: vec![],
    }
}

#[tokio::test]
async fn prebuilt_subtree_cannot_exceed_nesting_cap() {
    let results = ResultService::new(setup().await);
    let c = ctx();
    let created = results.create(&c, new_result(&c, vec![])).await.unwrap();

    let err = results
        .add_sub_result(&c, created.id, None, nested_chain(8))
        .await
        .unwrap_err();
    assert!(matches!(err, FinekoError::Validation { .. }));

    // Fits at the top level, but not one level down.
    let top = results
        .add_sub_result(&c, created.id, None, nested_chain(MAX_SUB_RESULT_DEPTH - 1))
        .await
        .unwrap()
        .unwrap();
    let root_id = top.sub_results[0].id;
    let err = results
        .add_sub_result(&c, created.id, Some(root_id), nested_chain(MAX_SUB_RESULT_DEPTH))
        .await
        .unwrap_err();
    assert!(matches!(err, FinekoError::Validation { .. }));

    let stored = results.get(&c, created.id).await.unwrap().unwrap();
    assert_eq!(stored.sub_results.len(), 1);
}

#[tokio::test]
async fn create_rejects_overly_deep_tree() {
    let results = ResultService::new(setup().await);
    let c = ctx();

    let err = results
        .create(&c, new_result(&c, vec![nested_chain(8)]))
        .await
        .unwrap_err();
    assert!(matches!(err, FinekoError::Validation { .. }));
    assert!(results.list(&c).await.unwrap().is_empty());

    let created = results
        .create(&c, new_result(&c, vec![nested_chain(MAX_SUB_RESULT_DEPTH)]))
        .await
        .unwrap();
    assert_eq!(created.sub_results.len(), 1);
}

#[tokio::test]
async fn template_generation_runs_once_per_day() {
    let store = setup().await;
    let templates = TemplateService::new(store.clone());
    let tasks = TaskService::new(store);
    let c = ctx();
    let monday = day(2026, 10, 12);

    for (title, recurrence, is_active) in [
        ("Standup", Recurrence::Daily, true),
        ("Weekly report", Recurrence::Weekly { days: vec![1] }, true),
        ("Friday review", Recurrence::Weekly { days: vec![5] }, true),
        ("Paused", Recurrence::Daily, false),
    ] {
        templates
            .create(
                &c,
                NewTemplate {
                    title: title.into(),
                    description: None,
                    assignee_id: c.employee_id,
                    reporter_id: c.employee_id,
                    recurrence,
                    start_date: day(2026, 10, 1),
                    is_active,
                    expected_time: Some(15),
                    result_id: None,
                    history: vec![],
                },
            )
            .await
            .unwrap();
    }

    let generated = templates.generate_due_tasks(&c, monday).await.unwrap();
    let mut titles: Vec<_> = generated.iter().map(|t| t.title.as_str()).collect();
    titles.sort_unstable();
    assert_eq!(titles, ["Standup", "Weekly report"]);
    assert!(generated.iter().all(|t| t.template_id.is_some() && t.due_date == monday));

    let again = templates.generate_due_tasks(&c, monday).await.unwrap();
    assert!(again.is_empty());
    assert_eq!(tasks.list_for_day(&c, monday).await.unwrap().len(), 2);
}
