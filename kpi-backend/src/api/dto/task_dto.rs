// src/api/dto/task_dto.rs
use crate::domain::task_assignment_model;
use crate::domain::task_model;
use crate::utils::validation::common;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// --- Request DTOs ---

#[derive(Deserialize, Serialize, Debug, Validate)]
pub struct CreateTaskDto {
    #[validate(
        length(
            min = common::TITLE_MIN_LENGTH,
            max = common::TITLE_MAX_LENGTH,
            message = "Task title must be between 1 and 200 characters"
        ),
        custom(function = crate::utils::validation::validate_not_blank)
    )]
    pub title: String,

    #[validate(length(
        max = common::NOTE_MAX_LENGTH,
        message = "Task detail must not exceed 2000 characters"
    ))]
    pub detail: Option<String>,

    pub scheduled_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<String>, // 省略時はデフォルト値（medium）

    /// 初期担当者。空の場合は作成者自身が割り当てられる。
    pub assignee_ids: Vec<Uuid>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct SyncAssigneesDto {
    pub user_ids: Vec<Uuid>,
}

#[derive(Deserialize, Serialize, Debug, Validate)]
pub struct UpdateAssigneeProgressDto {
    pub status: String,

    #[validate(range(
        min = common::PROGRESS_MIN,
        max = common::PROGRESS_MAX,
        message = "Progress must be between 0 and 100"
    ))]
    pub progress: i32,
}

// --- Response DTOs ---

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AssigneeDto {
    pub user_id: Uuid,
    pub status: String,
    pub progress: i32,
    pub assigned_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

impl From<task_assignment_model::Model> for AssigneeDto {
    fn from(model: task_assignment_model::Model) -> Self {
        Self {
            user_id: model.user_id,
            status: model.status,
            progress: model.progress,
            assigned_at: model.assigned_at,
            read_at: model.read_at,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TaskDto {
    pub id: Uuid,
    pub title: String,
    pub detail: Option<String>,
    pub scheduled_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub priority: String,
    pub status: String,
    pub created_by: Uuid,
    pub assigned_by: Uuid,
    pub assignees: Vec<AssigneeDto>,
    pub done_count: u64,
    pub total_count: u64,
}

impl TaskDto {
    pub fn from_parts(
        task: task_model::Model,
        assignments: Vec<task_assignment_model::Model>,
    ) -> Self {
        let done_count = assignments.iter().filter(|a| a.is_done()).count() as u64;
        let total_count = assignments.len() as u64;
        Self {
            id: task.id,
            title: task.title,
            detail: task.detail,
            scheduled_date: task.scheduled_date,
            due_date: task.due_date,
            priority: task.priority,
            status: task.status,
            created_by: task.created_by,
            assigned_by: task.assigned_by,
            assignees: assignments.into_iter().map(AssigneeDto::from).collect(),
            done_count,
            total_count,
        }
    }
}
