// tests/unit/snapshot_tests.rs
use kpi_backend::api::dto::task_dto::UpdateAssigneeProgressDto;
use kpi_backend::domain::permission::Role;
use kpi_backend::error::AppError;
use kpi_backend::service::assignment_service::AssignmentService;
use kpi_backend::service::kpi_service::KpiService;
use kpi_backend::service::report_service::ReportService;
use kpi_backend::service::task_service::TaskService;

use crate::common::{self, test_data};

#[tokio::test]
async fn test_invalid_month_token_fails_before_any_query() {
    common::init_test_env();
    let db = common::db::TestDatabase::new().await;
    let reports = ReportService::new(db.connection.clone());

    for token in ["", "June", "2025-13", "2025-6"] {
        let err = reports.build_snapshot(token).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)), "token: {}", token);
    }
}

#[tokio::test]
async fn test_summary_and_distribution_counts() {
    common::init_test_env();
    let db = common::db::TestDatabase::new().await;
    let tasks = TaskService::new(db.connection.clone());
    let assignments = AssignmentService::new(db.connection.clone());
    let kpis = KpiService::new(db.connection.clone());
    let reports = ReportService::new(db.connection.clone());

    let manager = test_data::create_user(&db.connection, "Manager", Role::Manager).await;
    let alice = test_data::create_user(&db.connection, "Alice", Role::Member).await;
    let bob = test_data::create_user(&db.connection, "Bob", Role::Member).await;
    let principal = test_data::principal_for(&manager);

    // aliceのKPIは100%、bobのKPIは0%になる
    kpis.create_kpi(
        &principal,
        test_data::create_kpi_dto(alice.id, "2025-06", "Alice June", vec![("Report", 10)]),
    )
    .await
    .unwrap();
    kpis.create_kpi(
        &principal,
        test_data::create_kpi_dto(bob.id, "2025-06", "Bob June", vec![("Review", 10)]),
    )
    .await
    .unwrap();

    let task = tasks
        .create_task(
            &principal,
            test_data::create_task_dto("Report", test_data::date(2025, 6, 10), vec![alice.id]),
        )
        .await
        .unwrap();
    assignments
        .update_progress(
            &test_data::principal_for(&alice),
            task.id,
            alice.id,
            UpdateAssigneeProgressDto {
                status: "done".to_string(),
                progress: 10,
            },
        )
        .await
        .unwrap();

    let snapshot = reports.build_snapshot("2025-06").await.unwrap();

    assert_eq!(snapshot.month, "2025-06");
    assert_eq!(snapshot.summary.month_label, "June 2025");
    assert_eq!(snapshot.summary.total, 2);
    assert_eq!(snapshot.summary.on_track, 1);
    assert_eq!(snapshot.summary.at_risk, 0);
    assert_eq!(snapshot.summary.critical, 1);
    assert!((snapshot.summary.avg_percent - 50.0).abs() < f64::EPSILON);

    assert_eq!(snapshot.distribution.excellent, 1);
    assert_eq!(snapshot.distribution.good, 0);
    assert_eq!(snapshot.distribution.warning, 0);
    assert_eq!(snapshot.distribution.critical, 1);

    // リスクリストは達成率の低い順
    assert_eq!(snapshot.risk_kpis.len(), 2);
    assert_eq!(snapshot.risk_kpis[0].percent, 0);
    assert_eq!(snapshot.risk_kpis[0].owner_id, bob.id);
    assert_eq!(snapshot.risk_kpis[0].owner_name, "Bob");
    assert_eq!(snapshot.risk_kpis[1].percent, 100);
}

#[tokio::test]
async fn test_snapshot_of_empty_month() {
    common::init_test_env();
    let db = common::db::TestDatabase::new().await;
    let reports = ReportService::new(db.connection.clone());

    let snapshot = reports.build_snapshot("2030-01").await.unwrap();
    assert_eq!(snapshot.summary.total, 0);
    assert!((snapshot.summary.avg_percent - 0.0).abs() < f64::EPSILON);
    assert!(snapshot.risk_kpis.is_empty());
    assert!(snapshot.blocked_tasks.is_empty());
}

#[tokio::test]
async fn test_blocked_tasks_use_padded_deadline_window() {
    common::init_test_env();
    let db = common::db::TestDatabase::new().await;
    let tasks = TaskService::new(db.connection.clone());
    let reports = ReportService::new(db.connection.clone());

    let manager = test_data::create_user(&db.connection, "Manager", Role::Manager).await;
    let alice = test_data::create_user(&db.connection, "Alice", Role::Member).await;
    let principal = test_data::principal_for(&manager);

    // 月初の3日前が期限: 7日パディングの窓内なのでブロック扱い
    let inside = tasks
        .create_task(
            &principal,
            test_data::create_task_dto_with_due(
                "Late prep",
                test_data::date(2025, 5, 20),
                test_data::date(2025, 5, 28),
                vec![alice.id],
            ),
        )
        .await
        .unwrap();

    // 月初の12日前が期限: 窓外なので現れない
    tasks
        .create_task(
            &principal,
            test_data::create_task_dto_with_due(
                "Old item",
                test_data::date(2025, 5, 10),
                test_data::date(2025, 5, 20),
                vec![alice.id],
            ),
        )
        .await
        .unwrap();

    // 期限なしのタスクも現れない
    tasks
        .create_task(
            &principal,
            test_data::create_task_dto("No deadline", test_data::date(2025, 6, 10), vec![alice.id]),
        )
        .await
        .unwrap();

    let snapshot = reports.build_snapshot("2025-06").await.unwrap();

    assert_eq!(snapshot.blocked_tasks.len(), 1);
    let blocked = &snapshot.blocked_tasks[0];
    assert_eq!(blocked.id, inside.id);
    assert_eq!(blocked.deadline, test_data::date(2025, 5, 28));
    assert!(blocked.is_overdue);
    assert!(blocked.days_overdue > 0);
    assert_eq!(blocked.owners, vec!["Alice".to_string()]);
    assert_eq!(blocked.status, "not_started");
}
