// tests/unit/assignment_rollup_tests.rs
use kpi_backend::api::dto::task_dto::{SyncAssigneesDto, UpdateAssigneeProgressDto};
use kpi_backend::domain::permission::Role;
use kpi_backend::error::AppError;
use kpi_backend::service::assignment_service::AssignmentService;
use kpi_backend::service::task_service::TaskService;
use uuid::Uuid;

use crate::common::{self, test_data};

fn progress(status: &str, progress: i32) -> UpdateAssigneeProgressDto {
    UpdateAssigneeProgressDto {
        status: status.to_string(),
        progress,
    }
}

#[tokio::test]
async fn test_task_done_only_when_all_assignees_done() {
    common::init_test_env();
    let db = common::db::TestDatabase::new().await;
    let tasks = TaskService::new(db.connection.clone());
    let assignments = AssignmentService::new(db.connection.clone());

    let manager = test_data::create_user(&db.connection, "Manager", Role::Manager).await;
    let alice = test_data::create_user(&db.connection, "Alice", Role::Member).await;
    let bob = test_data::create_user(&db.connection, "Bob", Role::Member).await;
    let principal = test_data::principal_for(&manager);

    let task = tasks
        .create_task(
            &principal,
            test_data::create_task_dto(
                "Monthly report",
                test_data::date(2025, 6, 10),
                vec![alice.id, bob.id],
            ),
        )
        .await
        .unwrap();
    assert_eq!(task.status, "not_started");
    assert_eq!(task.total_count, 2);

    // 1人だけ完了しても全体は未完了のまま
    let task = assignments
        .update_progress(&principal, task.id, alice.id, progress("done", 100))
        .await
        .unwrap();
    assert_eq!(task.status, "not_started");
    assert_eq!(task.done_count, 1);

    // 全員完了で初めてDoneになる
    let task = assignments
        .update_progress(&principal, task.id, bob.id, progress("done", 100))
        .await
        .unwrap();
    assert_eq!(task.status, "done");
    assert_eq!(task.done_count, 2);

    // 1人が未完了に戻ると全体も戻る
    let task = assignments
        .update_progress(&principal, task.id, bob.id, progress("not_started", 40))
        .await
        .unwrap();
    assert_eq!(task.status, "not_started");
}

#[tokio::test]
async fn test_assignee_can_update_only_own_row() {
    common::init_test_env();
    let db = common::db::TestDatabase::new().await;
    let tasks = TaskService::new(db.connection.clone());
    let assignments = AssignmentService::new(db.connection.clone());

    let manager = test_data::create_user(&db.connection, "Manager", Role::Manager).await;
    let alice = test_data::create_user(&db.connection, "Alice", Role::Member).await;
    let bob = test_data::create_user(&db.connection, "Bob", Role::Member).await;

    let task = tasks
        .create_task(
            &test_data::principal_for(&manager),
            test_data::create_task_dto(
                "Shared work",
                test_data::date(2025, 6, 10),
                vec![alice.id, bob.id],
            ),
        )
        .await
        .unwrap();

    // 自分の行は更新できる
    let updated = assignments
        .update_progress(
            &test_data::principal_for(&alice),
            task.id,
            alice.id,
            progress("done", 100),
        )
        .await
        .unwrap();
    assert_eq!(updated.done_count, 1);

    // 他人の行は更新できない
    let err = assignments
        .update_progress(
            &test_data::principal_for(&alice),
            task.id,
            bob.id,
            progress("done", 100),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_update_progress_rejects_out_of_range() {
    common::init_test_env();
    let db = common::db::TestDatabase::new().await;
    let tasks = TaskService::new(db.connection.clone());
    let assignments = AssignmentService::new(db.connection.clone());

    let manager = test_data::create_user(&db.connection, "Manager", Role::Manager).await;
    let principal = test_data::principal_for(&manager);
    let task = tasks
        .create_task(
            &principal,
            test_data::create_task_dto("Solo", test_data::date(2025, 6, 10), vec![]),
        )
        .await
        .unwrap();

    let err = assignments
        .update_progress(&principal, task.id, manager.id, progress("done", 101))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationErrors(_)));
}

#[tokio::test]
async fn test_sync_preserves_retained_and_drops_removed() {
    common::init_test_env();
    let db = common::db::TestDatabase::new().await;
    let tasks = TaskService::new(db.connection.clone());
    let assignments = AssignmentService::new(db.connection.clone());

    let manager = test_data::create_user(&db.connection, "Manager", Role::Manager).await;
    let alice = test_data::create_user(&db.connection, "Alice", Role::Member).await;
    let bob = test_data::create_user(&db.connection, "Bob", Role::Member).await;
    let carol = test_data::create_user(&db.connection, "Carol", Role::Member).await;
    let principal = test_data::principal_for(&manager);

    let task = tasks
        .create_task(
            &principal,
            test_data::create_task_dto(
                "Rotating duty",
                test_data::date(2025, 6, 10),
                vec![alice.id, bob.id],
            ),
        )
        .await
        .unwrap();

    assignments
        .update_progress(&principal, task.id, alice.id, progress("done", 80))
        .await
        .unwrap();

    // bobを外し、carolを加える。aliceの進捗は保持される。
    let task = assignments
        .sync_assignees(
            &principal,
            task.id,
            SyncAssigneesDto {
                user_ids: vec![alice.id, carol.id],
            },
        )
        .await
        .unwrap();

    assert_eq!(task.total_count, 2);
    let alice_row = task
        .assignees
        .iter()
        .find(|a| a.user_id == alice.id)
        .unwrap();
    assert_eq!(alice_row.progress, 80);
    assert_eq!(alice_row.status, "done");
    let carol_row = task
        .assignees
        .iter()
        .find(|a| a.user_id == carol.id)
        .unwrap();
    assert_eq!(carol_row.progress, 0);
    assert_eq!(carol_row.status, "not_started");
    assert!(!task.assignees.iter().any(|a| a.user_id == bob.id));
}

#[tokio::test]
async fn test_sync_is_idempotent() {
    common::init_test_env();
    let db = common::db::TestDatabase::new().await;
    let tasks = TaskService::new(db.connection.clone());
    let assignments = AssignmentService::new(db.connection.clone());

    let manager = test_data::create_user(&db.connection, "Manager", Role::Manager).await;
    let alice = test_data::create_user(&db.connection, "Alice", Role::Member).await;
    let principal = test_data::principal_for(&manager);

    let task = tasks
        .create_task(
            &principal,
            test_data::create_task_dto("Stable", test_data::date(2025, 6, 10), vec![alice.id]),
        )
        .await
        .unwrap();
    assignments
        .update_progress(&principal, task.id, alice.id, progress("done", 100))
        .await
        .unwrap();

    // 同じ集合での同期を2回行っても状態は変わらない
    for _ in 0..2 {
        let task = assignments
            .sync_assignees(
                &principal,
                task.id,
                SyncAssigneesDto {
                    user_ids: vec![alice.id],
                },
            )
            .await
            .unwrap();
        assert_eq!(task.status, "done");
        assert_eq!(task.assignees[0].progress, 100);
    }
}

#[tokio::test]
async fn test_sync_empty_list_falls_back_to_acting_user() {
    common::init_test_env();
    let db = common::db::TestDatabase::new().await;
    let tasks = TaskService::new(db.connection.clone());
    let assignments = AssignmentService::new(db.connection.clone());

    let manager = test_data::create_user(&db.connection, "Manager", Role::Manager).await;
    let alice = test_data::create_user(&db.connection, "Alice", Role::Member).await;
    let principal = test_data::principal_for(&manager);

    let task = tasks
        .create_task(
            &principal,
            test_data::create_task_dto("Orphaned", test_data::date(2025, 6, 10), vec![alice.id]),
        )
        .await
        .unwrap();

    let task = assignments
        .sync_assignees(&principal, task.id, SyncAssigneesDto { user_ids: vec![] })
        .await
        .unwrap();
    assert_eq!(task.total_count, 1);
    assert_eq!(task.assignees[0].user_id, manager.id);
}

#[tokio::test]
async fn test_duplicate_assignee_in_create_is_conflict() {
    common::init_test_env();
    let db = common::db::TestDatabase::new().await;
    let tasks = TaskService::new(db.connection.clone());

    let manager = test_data::create_user(&db.connection, "Manager", Role::Manager).await;
    let alice = test_data::create_user(&db.connection, "Alice", Role::Member).await;

    let err = tasks
        .create_task(
            &test_data::principal_for(&manager),
            test_data::create_task_dto(
                "Double booked",
                test_data::date(2025, 6, 10),
                vec![alice.id, alice.id],
            ),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_unknown_assignee_is_not_found() {
    common::init_test_env();
    let db = common::db::TestDatabase::new().await;
    let tasks = TaskService::new(db.connection.clone());

    let manager = test_data::create_user(&db.connection, "Manager", Role::Manager).await;
    let err = tasks
        .create_task(
            &test_data::principal_for(&manager),
            test_data::create_task_dto(
                "Ghost assignee",
                test_data::date(2025, 6, 10),
                vec![Uuid::new_v4()],
            ),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_outsider_cannot_sync_assignees() {
    common::init_test_env();
    let db = common::db::TestDatabase::new().await;
    let tasks = TaskService::new(db.connection.clone());
    let assignments = AssignmentService::new(db.connection.clone());

    let manager = test_data::create_user(&db.connection, "Manager", Role::Manager).await;
    let alice = test_data::create_user(&db.connection, "Alice", Role::Member).await;
    let outsider = test_data::create_user(&db.connection, "Outsider", Role::Member).await;

    let task = tasks
        .create_task(
            &test_data::principal_for(&manager),
            test_data::create_task_dto("Private", test_data::date(2025, 6, 10), vec![alice.id]),
        )
        .await
        .unwrap();

    let err = assignments
        .sync_assignees(
            &test_data::principal_for(&outsider),
            task.id,
            SyncAssigneesDto {
                user_ids: vec![outsider.id],
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_mark_assignment_read_is_idempotent() {
    common::init_test_env();
    let db = common::db::TestDatabase::new().await;
    let tasks = TaskService::new(db.connection.clone());
    let assignments = AssignmentService::new(db.connection.clone());

    let manager = test_data::create_user(&db.connection, "Manager", Role::Manager).await;
    let alice = test_data::create_user(&db.connection, "Alice", Role::Member).await;

    let task = tasks
        .create_task(
            &test_data::principal_for(&manager),
            test_data::create_task_dto("Ack me", test_data::date(2025, 6, 10), vec![alice.id]),
        )
        .await
        .unwrap();
    assert!(task.assignees[0].read_at.is_none());

    let alice_principal = test_data::principal_for(&alice);
    let first = assignments
        .mark_assignment_read(&alice_principal, task.id)
        .await
        .unwrap();
    let read_at = first.read_at.expect("read_at set");

    // 2回目は何も変更しない
    let second = assignments
        .mark_assignment_read(&alice_principal, task.id)
        .await
        .unwrap();
    assert_eq!(second.read_at, Some(read_at));
}
