// src/service/task_service.rs
use crate::api::dto::task_dto::{CreateTaskDto, TaskDto};
use crate::db::DbPool;
use crate::domain::audit_log_model::{AuditAction, AuditEntityType};
use crate::domain::permission::Principal;
use crate::domain::priority::Priority;
use crate::domain::progress::derive_task_status;
use crate::domain::task_model;
use crate::domain::task_status::TaskStatus;
use crate::error::AppResult;
use crate::log_with_context;
use crate::repository::task_assignment_repository::TaskAssignmentRepository;
use crate::repository::task_repository::TaskRepository;
use crate::repository::user_repository::UserRepository;
use crate::service::audit_log_service::{AuditLogService, LogActionParams};
use crate::utils::error_helper::{
    conflict_error, convert_validation_errors, not_found_error, validation_error,
};
use crate::utils::transaction::TransactionManager;
use sea_orm::{ActiveModelBehavior, Set};
use std::collections::HashSet;
use uuid::Uuid;
use validator::Validate;

pub struct TaskService {
    db: DbPool,
}

impl TaskService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// タスクと初期割り当てを1トランザクションで作成する
    ///
    /// 担当者リストが空の場合は作成者自身を割り当てる。
    /// 同一ユーザーIDの重複はConflictになる。
    pub async fn create_task(
        &self,
        principal: &Principal,
        payload: CreateTaskDto,
    ) -> AppResult<TaskDto> {
        payload
            .validate()
            .map_err(|e| convert_validation_errors(e, "task_service::create_task"))?;

        let priority = match payload.priority.as_deref() {
            Some(value) => Priority::from_str(value).ok_or_else(|| {
                validation_error(
                    "priority",
                    "must be one of 'urgent', 'high', 'medium', 'low'",
                )
            })?,
            None => Priority::default(),
        };

        // 割り当ては(task, user)ごとに1行。重複指定は衝突として弾く。
        let mut seen = HashSet::new();
        for user_id in &payload.assignee_ids {
            if !seen.insert(*user_id) {
                return Err(conflict_error(
                    "Duplicate assignee in request",
                    "task_service::create_task",
                ));
            }
        }

        let mut assignee_ids = payload.assignee_ids.clone();
        if assignee_ids.is_empty() {
            assignee_ids.push(principal.id);
        }

        let principal = principal.clone();
        let dto = self
            .db
            .execute_in_transaction(move |txn| {
                Box::pin(async move {
                    let users = UserRepository::find_active_by_ids(txn, &assignee_ids).await?;
                    if users.len() != assignee_ids.len() {
                        return Err(not_found_error(
                            "User",
                            "one or more assignee ids",
                            "task_service::create_task",
                        ));
                    }

                    let mut active = task_model::ActiveModel::new();
                    active.title = Set(payload.title.clone());
                    active.detail = Set(payload.detail.clone());
                    active.scheduled_date = Set(payload.scheduled_date);
                    active.due_date = Set(payload.due_date);
                    active.priority = Set(priority.as_str().to_string());
                    active.status = Set(TaskStatus::NotStarted.as_str().to_string());
                    active.created_by = Set(principal.id);
                    active.assigned_by = Set(principal.id);
                    let task = TaskRepository::create(txn, active).await?;

                    for user_id in &assignee_ids {
                        let mut assignment =
                            crate::domain::task_assignment_model::ActiveModel::new();
                        assignment.task_id = Set(task.id);
                        assignment.user_id = Set(*user_id);
                        assignment.status = Set(TaskStatus::NotStarted.as_str().to_string());
                        assignment.progress = Set(0);
                        TaskAssignmentRepository::create(txn, assignment).await?;
                    }

                    let assignments = TaskAssignmentRepository::find_by_task(txn, task.id).await?;
                    let done = assignments.iter().filter(|a| a.is_done()).count() as u64;
                    let status = derive_task_status(done, assignments.len() as u64);
                    let task = TaskRepository::update_status(txn, task, status).await?;

                    AuditLogService::log_action_in(
                        txn,
                        &principal,
                        LogActionParams {
                            entity_type: AuditEntityType::Task,
                            entity_id: task.id,
                            entity_label: task.title.clone(),
                            action: AuditAction::TaskCreated,
                            details: Some(serde_json::json!({
                                "assignee_ids": assignee_ids,
                                "scheduled_date": task.scheduled_date,
                            })),
                        },
                    )
                    .await?;

                    Ok(TaskDto::from_parts(task, assignments))
                })
            })
            .await?;

        log_with_context!(
            tracing::Level::INFO,
            "Task created",
            "task_id" => dto.id,
            "assignee_count" => dto.total_count
        );

        Ok(dto)
    }

    pub async fn get_task(&self, id: Uuid) -> AppResult<TaskDto> {
        let task = TaskRepository::find_by_id(&self.db, id)
            .await?
            .ok_or_else(|| {
                not_found_error("Task", &id.to_string(), "task_service::get_task")
            })?;
        let assignments = TaskAssignmentRepository::find_by_task(&self.db, task.id).await?;
        Ok(TaskDto::from_parts(task, assignments))
    }
}
