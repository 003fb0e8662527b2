// tests/unit/reassignment_tests.rs
use kpi_backend::api::dto::kpi_dto::ReassignKpiDto;
use kpi_backend::api::dto::task_dto::{SyncAssigneesDto, UpdateAssigneeProgressDto};
use kpi_backend::domain::permission::Role;
use kpi_backend::domain::task_model;
use kpi_backend::domain::task_status::TaskStatus;
use kpi_backend::error::AppError;
use kpi_backend::repository::task_repository::TaskRepository;
use kpi_backend::service::assignment_service::AssignmentService;
use kpi_backend::service::kpi_service::KpiService;
use kpi_backend::service::reassignment_service::ReassignmentService;
use kpi_backend::service::task_service::TaskService;
use sea_orm::{ActiveModelBehavior, Set};
use std::sync::Arc;
use uuid::Uuid;

use crate::common::{self, test_data};
use test_data::RecordingNotifier;

#[tokio::test]
async fn test_reassign_task_always_resets_status() {
    common::init_test_env();
    let db = common::db::TestDatabase::new().await;
    let tasks = TaskService::new(db.connection.clone());
    let assignments = AssignmentService::new(db.connection.clone());
    let notifier: Arc<RecordingNotifier> = Arc::new(RecordingNotifier::default());
    let reassignment = ReassignmentService::new(db.connection.clone(), notifier);

    let manager = test_data::create_user(&db.connection, "Manager", Role::Manager).await;
    let alice = test_data::create_user(&db.connection, "Alice", Role::Member).await;
    let principal = test_data::principal_for(&manager);

    let task = tasks
        .create_task(
            &principal,
            test_data::create_task_dto("Handover", test_data::date(2025, 6, 10), vec![alice.id]),
        )
        .await
        .unwrap();
    let task = assignments
        .update_progress(
            &test_data::principal_for(&alice),
            task.id,
            alice.id,
            UpdateAssigneeProgressDto {
                status: "done".to_string(),
                progress: 100,
            },
        )
        .await
        .unwrap();
    assert_eq!(task.status, "done");

    // 担当者自体は完了状態のままでも、引き継ぎはレビューをやり直す
    let task = reassignment
        .reassign_task(
            &principal,
            task.id,
            SyncAssigneesDto {
                user_ids: vec![alice.id],
            },
        )
        .await
        .unwrap();
    assert_eq!(task.status, "not_started");
    assert_eq!(task.assignees[0].status, "done");
}

#[tokio::test]
async fn test_reassign_task_replaces_set_wholesale() {
    common::init_test_env();
    let db = common::db::TestDatabase::new().await;
    let tasks = TaskService::new(db.connection.clone());
    let notifier: Arc<RecordingNotifier> = Arc::new(RecordingNotifier::default());
    let reassignment = ReassignmentService::new(db.connection.clone(), notifier);

    let manager = test_data::create_user(&db.connection, "Manager", Role::Manager).await;
    let alice = test_data::create_user(&db.connection, "Alice", Role::Member).await;
    let bob = test_data::create_user(&db.connection, "Bob", Role::Member).await;
    let principal = test_data::principal_for(&manager);

    let task = tasks
        .create_task(
            &principal,
            test_data::create_task_dto("Rotation", test_data::date(2025, 6, 10), vec![alice.id]),
        )
        .await
        .unwrap();

    // マージではなく総入れ替え
    let task = reassignment
        .reassign_task(
            &principal,
            task.id,
            SyncAssigneesDto {
                user_ids: vec![bob.id],
            },
        )
        .await
        .unwrap();
    assert_eq!(task.total_count, 1);
    assert_eq!(task.assignees[0].user_id, bob.id);
}

#[tokio::test]
async fn test_member_cannot_reassign() {
    common::init_test_env();
    let db = common::db::TestDatabase::new().await;
    let tasks = TaskService::new(db.connection.clone());
    let notifier: Arc<RecordingNotifier> = Arc::new(RecordingNotifier::default());
    let reassignment = ReassignmentService::new(db.connection.clone(), notifier);

    let manager = test_data::create_user(&db.connection, "Manager", Role::Manager).await;
    let alice = test_data::create_user(&db.connection, "Alice", Role::Member).await;

    let task = tasks
        .create_task(
            &test_data::principal_for(&manager),
            test_data::create_task_dto("Locked", test_data::date(2025, 6, 10), vec![alice.id]),
        )
        .await
        .unwrap();

    let err = reassignment
        .reassign_task(
            &test_data::principal_for(&alice),
            task.id,
            SyncAssigneesDto {
                user_ids: vec![alice.id],
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_reassign_kpi_changes_owner_and_recalculates() {
    common::init_test_env();
    let db = common::db::TestDatabase::new().await;
    let tasks = TaskService::new(db.connection.clone());
    let assignments = AssignmentService::new(db.connection.clone());
    let kpis = KpiService::new(db.connection.clone());
    let notifier: Arc<RecordingNotifier> = Arc::new(RecordingNotifier::default());
    let reassignment = ReassignmentService::new(db.connection.clone(), notifier);

    let manager = test_data::create_user(&db.connection, "Manager", Role::Manager).await;
    let alice = test_data::create_user(&db.connection, "Alice", Role::Member).await;
    let bob = test_data::create_user(&db.connection, "Bob", Role::Member).await;
    let principal = test_data::principal_for(&manager);

    let kpi = kpis
        .create_kpi(
            &principal,
            test_data::create_kpi_dto(alice.id, "2025-06", "Transferable", vec![("Report", 10)]),
        )
        .await
        .unwrap();

    // bobだけがReportを完了している
    let task = tasks
        .create_task(
            &principal,
            test_data::create_task_dto("Report", test_data::date(2025, 6, 10), vec![bob.id]),
        )
        .await
        .unwrap();
    assignments
        .update_progress(
            &test_data::principal_for(&bob),
            task.id,
            bob.id,
            UpdateAssigneeProgressDto {
                status: "done".to_string(),
                progress: 10,
            },
        )
        .await
        .unwrap();

    let kpi = kpis.get_kpi(kpi.id).await.unwrap();
    assert_eq!(kpi.percent, 0);

    // オーナーをbobに付け替えると、bobの完了タスクが実績に数えられる
    let kpi = reassignment
        .reassign_kpi(
            &principal,
            kpi.id,
            ReassignKpiDto {
                new_owner_id: bob.id,
                note: Some("Handover for Q3".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(kpi.owner_id, bob.id);
    assert_eq!(kpi.percent, 100);
    // 小目標はリセットされない
    assert_eq!(kpi.subtasks.len(), 1);
    assert_eq!(kpi.note.as_deref(), Some("Handover for Q3"));
}

#[tokio::test]
async fn test_ping_task_notifies_all_assignees() {
    common::init_test_env();
    let db = common::db::TestDatabase::new().await;
    let tasks = TaskService::new(db.connection.clone());
    let notifier = Arc::new(RecordingNotifier::default());
    let reassignment = ReassignmentService::new(db.connection.clone(), notifier.clone());

    let manager = test_data::create_user(&db.connection, "Manager", Role::Manager).await;
    let alice = test_data::create_user(&db.connection, "Alice", Role::Member).await;
    let bob = test_data::create_user(&db.connection, "Bob", Role::Member).await;
    let principal = test_data::principal_for(&manager);

    let task = tasks
        .create_task(
            &principal,
            test_data::create_task_dto(
                "Overdue work",
                test_data::date(2025, 6, 10),
                vec![alice.id, bob.id],
            ),
        )
        .await
        .unwrap();

    reassignment
        .ping_task(&principal, task.id, "Please update your progress")
        .await
        .unwrap();

    assert_eq!(notifier.sent_count(), 2);
    let recipients = notifier.recipients();
    assert!(recipients.contains(&alice.id));
    assert!(recipients.contains(&bob.id));
}

#[tokio::test]
async fn test_ping_task_without_assignees_is_validation_error() {
    common::init_test_env();
    let db = common::db::TestDatabase::new().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let reassignment = ReassignmentService::new(db.connection.clone(), notifier.clone());

    let manager = test_data::create_user(&db.connection, "Manager", Role::Manager).await;
    let principal = test_data::principal_for(&manager);

    // サービス経由では担当者ゼロのタスクは作れないため、直接挿入する
    let mut active = task_model::ActiveModel::new();
    active.title = Set("Unassigned".to_string());
    active.scheduled_date = Set(test_data::date(2025, 6, 10));
    active.priority = Set("medium".to_string());
    active.status = Set(TaskStatus::NotStarted.as_str().to_string());
    active.created_by = Set(manager.id);
    active.assigned_by = Set(manager.id);
    let task = TaskRepository::create(&db.connection, active).await.unwrap();

    let err = reassignment
        .ping_task(&principal, task.id, "Anyone there?")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    // 通知は1件も送られない
    assert_eq!(notifier.sent_count(), 0);
}

#[tokio::test]
async fn test_ping_unknown_task_is_not_found() {
    common::init_test_env();
    let db = common::db::TestDatabase::new().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let reassignment = ReassignmentService::new(db.connection.clone(), notifier);

    let manager = test_data::create_user(&db.connection, "Manager", Role::Manager).await;
    let err = reassignment
        .ping_task(&test_data::principal_for(&manager), Uuid::new_v4(), "Hello")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
