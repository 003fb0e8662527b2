// tests/common/test_data.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use kpi_backend::api::dto::kpi_dto::{CreateKpiDto, CreateKpiSubtaskDto};
use kpi_backend::api::dto::proposal_dto::CreateProposalDto;
use kpi_backend::api::dto::task_dto::CreateTaskDto;
use kpi_backend::domain::permission::{Principal, Role};
use kpi_backend::domain::user_model;
use kpi_backend::error::AppResult;
use kpi_backend::repository::user_repository::UserRepository;
use kpi_backend::service::notification_service::Notifier;
use sea_orm::{ActiveModelBehavior, DatabaseConnection, Set};
use std::sync::Mutex;
use uuid::Uuid;

/// テスト用ユーザーを作成してモデルを返す
pub async fn create_user(
    db: &DatabaseConnection,
    display_name: &str,
    role: Role,
) -> user_model::Model {
    let mut active = user_model::ActiveModel::new();
    active.username = Set(format!(
        "{}_{}",
        display_name.to_lowercase().replace(' ', "_"),
        &Uuid::new_v4().to_string()[..8]
    ));
    active.display_name = Set(display_name.to_string());
    active.role = Set(role.as_str().to_string());
    active.is_active = Set(true);
    UserRepository::create(db, active)
        .await
        .expect("create test user")
}

/// ユーザーからPrincipalを作る
pub fn principal_for(user: &user_model::Model) -> Principal {
    user.to_principal()
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// タスク作成リクエストを生成
pub fn create_task_dto(
    title: &str,
    scheduled_date: NaiveDate,
    assignee_ids: Vec<Uuid>,
) -> CreateTaskDto {
    CreateTaskDto {
        title: title.to_string(),
        detail: None,
        scheduled_date,
        due_date: None,
        priority: None,
        assignee_ids,
    }
}

/// 期限付きのタスク作成リクエストを生成
pub fn create_task_dto_with_due(
    title: &str,
    scheduled_date: NaiveDate,
    due_date: NaiveDate,
    assignee_ids: Vec<Uuid>,
) -> CreateTaskDto {
    CreateTaskDto {
        title: title.to_string(),
        detail: None,
        scheduled_date,
        due_date: Some(due_date),
        priority: None,
        assignee_ids,
    }
}

/// KPI作成リクエストを生成
pub fn create_kpi_dto(
    owner_id: Uuid,
    month: &str,
    name: &str,
    subtasks: Vec<(&str, i32)>,
) -> CreateKpiDto {
    CreateKpiDto {
        owner_id,
        month: month.to_string(),
        name: name.to_string(),
        note: None,
        subtasks: subtasks
            .into_iter()
            .map(|(title, target)| CreateKpiSubtaskDto {
                title: title.to_string(),
                target,
            })
            .collect(),
    }
}

/// タスク種別の提案リクエストを生成
pub fn create_task_proposal_dto(title: &str) -> CreateProposalDto {
    CreateProposalDto {
        kind: "task".to_string(),
        title: title.to_string(),
        description: Some("Needs doing".to_string()),
        priority: Some("high".to_string()),
        expected_deadline: Some(date(2025, 7, 15)),
        kpi_month: None,
        kpi_target: None,
    }
}

/// KPI種別の提案リクエストを生成
pub fn create_kpi_proposal_dto(title: &str, month: &str, target: i32) -> CreateProposalDto {
    CreateProposalDto {
        kind: "kpi".to_string(),
        title: title.to_string(),
        description: None,
        priority: None,
        expected_deadline: None,
        kpi_month: Some(month.to_string()),
        kpi_target: Some(target),
    }
}

/// 配信内容を記録するだけのNotifier（配信検証用）
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(Uuid, String)>>,
}

impl RecordingNotifier {
    pub fn sent_count(&self) -> usize {
        self.sent.lock().expect("notifier lock").len()
    }

    pub fn recipients(&self) -> Vec<Uuid> {
        self.sent
            .lock()
            .expect("notifier lock")
            .iter()
            .map(|(id, _)| *id)
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_user(&self, user_id: Uuid, subject: &str, _body: &str) -> AppResult<()> {
        self.sent
            .lock()
            .expect("notifier lock")
            .push((user_id, subject.to_string()));
        Ok(())
    }
}
