// src/service/reassignment_service.rs

//! 再割り当て操作（マネージャー限定）
//!
//! KPIのオーナー変更・タスク担当の総入れ替え・担当者へのリマインドを
//! 扱う。各操作は同一トランザクション内で監査ログを1件書き込む。
//! 通知はコミット後に行い、配信失敗は書き込みを巻き戻さない。

use crate::api::dto::kpi_dto::{KpiDto, ReassignKpiDto};
use crate::api::dto::task_dto::{SyncAssigneesDto, TaskDto};
use crate::db::DbPool;
use crate::domain::audit_log_model::{AuditAction, AuditEntityType};
use crate::domain::permission::Principal;
use crate::domain::task_status::TaskStatus;
use crate::error::AppResult;
use crate::log_with_context;
use crate::repository::kpi_repository::KpiRepository;
use crate::repository::kpi_subtask_repository::KpiSubtaskRepository;
use crate::repository::task_assignment_repository::TaskAssignmentRepository;
use crate::repository::task_repository::TaskRepository;
use crate::repository::user_repository::UserRepository;
use crate::service::assignment_service::AssignmentService;
use crate::service::audit_log_service::{AuditLogService, LogActionParams};
use crate::service::kpi_service::KpiService;
use crate::service::notification_service::Notifier;
use crate::utils::error_helper::{convert_validation_errors, not_found_error, validation_error};
use crate::utils::transaction::TransactionManager;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub struct ReassignmentService {
    db: DbPool,
    notifier: Arc<dyn Notifier>,
}

impl ReassignmentService {
    pub fn new(db: DbPool, notifier: Arc<dyn Notifier>) -> Self {
        Self { db, notifier }
    }

    /// KPIのオーナーを付け替えて再計算する。小目標はリセットしない。
    pub async fn reassign_kpi(
        &self,
        principal: &Principal,
        kpi_id: Uuid,
        payload: ReassignKpiDto,
    ) -> AppResult<KpiDto> {
        principal.require_manager("reassignment_service::reassign_kpi")?;
        payload
            .validate()
            .map_err(|e| convert_validation_errors(e, "reassignment_service::reassign_kpi"))?;

        let principal = principal.clone();
        let dto = self
            .db
            .execute_in_transaction(move |txn| {
                Box::pin(async move {
                    let kpi = KpiRepository::find_by_id(txn, kpi_id).await?.ok_or_else(
                        || {
                            not_found_error(
                                "Kpi",
                                &kpi_id.to_string(),
                                "reassignment_service::reassign_kpi",
                            )
                        },
                    )?;
                    let new_owner = UserRepository::find_by_id(txn, payload.new_owner_id)
                        .await?
                        .ok_or_else(|| {
                            not_found_error(
                                "User",
                                &payload.new_owner_id.to_string(),
                                "reassignment_service::reassign_kpi",
                            )
                        })?;

                    let previous_owner_id = kpi.owner_id;
                    let kpi = KpiRepository::update_owner(
                        txn,
                        kpi,
                        new_owner.id,
                        payload.note.clone(),
                    )
                    .await?;
                    let kpi = KpiService::recalculate_in(txn, kpi).await?;

                    AuditLogService::log_action_in(
                        txn,
                        &principal,
                        LogActionParams {
                            entity_type: AuditEntityType::Kpi,
                            entity_id: kpi.id,
                            entity_label: kpi.name.clone(),
                            action: AuditAction::KpiReassigned,
                            details: Some(serde_json::json!({
                                "previous_owner_id": previous_owner_id,
                                "new_owner_id": new_owner.id,
                                "new_owner_name": new_owner.display_name,
                                "note": payload.note,
                            })),
                        },
                    )
                    .await?;

                    let subtasks = KpiSubtaskRepository::find_by_kpi(txn, kpi.id).await?;
                    Ok(KpiDto::from_parts(kpi, subtasks))
                })
            })
            .await?;

        log_with_context!(
            tracing::Level::INFO,
            "KPI reassigned",
            "kpi_id" => dto.id,
            "new_owner_id" => dto.owner_id
        );

        Ok(dto)
    }

    /// 担当者集合を総入れ替えする（マージではない）
    ///
    /// 完全な引き継ぎは常にレビューをやり直すため、新担当者の個別状態に
    /// かかわらずタスクの導出ステータスをNotStartedに戻す。
    pub async fn reassign_task(
        &self,
        principal: &Principal,
        task_id: Uuid,
        payload: SyncAssigneesDto,
    ) -> AppResult<TaskDto> {
        principal.require_manager("reassignment_service::reassign_task")?;

        let user_ids = AssignmentService::normalize_user_ids(payload.user_ids, principal);

        let principal = principal.clone();
        let dto = self
            .db
            .execute_in_transaction(move |txn| {
                Box::pin(async move {
                    let task = TaskRepository::find_by_id(txn, task_id).await?.ok_or_else(
                        || {
                            not_found_error(
                                "Task",
                                &task_id.to_string(),
                                "reassignment_service::reassign_task",
                            )
                        },
                    )?;

                    let users = UserRepository::find_active_by_ids(txn, &user_ids).await?;
                    if users.len() != user_ids.len() {
                        return Err(not_found_error(
                            "User",
                            "one or more assignee ids",
                            "reassignment_service::reassign_task",
                        ));
                    }

                    let assignments =
                        AssignmentService::sync_set_in(txn, task.id, &user_ids).await?;
                    let task =
                        TaskRepository::update_status(txn, task, TaskStatus::NotStarted).await?;

                    AuditLogService::log_action_in(
                        txn,
                        &principal,
                        LogActionParams {
                            entity_type: AuditEntityType::Task,
                            entity_id: task.id,
                            entity_label: task.title.clone(),
                            action: AuditAction::TaskReassigned,
                            details: Some(serde_json::json!({
                                "assignee_ids": user_ids,
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
            "Task reassigned",
            "task_id" => dto.id,
            "assignee_count" => dto.total_count
        );

        Ok(dto)
    }

    /// 現担当者全員へのリマインド
    ///
    /// 担当者が1人もいない場合はValidationErrorとし、通知は行わない。
    pub async fn ping_task(
        &self,
        principal: &Principal,
        task_id: Uuid,
        message: &str,
    ) -> AppResult<()> {
        principal.require_manager("reassignment_service::ping_task")?;
        if message.trim().is_empty() {
            return Err(validation_error("message", "must not be blank"));
        }

        let principal_c = principal.clone();
        let message_c = message.to_string();
        let (task_title, recipient_ids) = self
            .db
            .execute_in_transaction(move |txn| {
                Box::pin(async move {
                    let task = TaskRepository::find_by_id(txn, task_id).await?.ok_or_else(
                        || {
                            not_found_error(
                                "Task",
                                &task_id.to_string(),
                                "reassignment_service::ping_task",
                            )
                        },
                    )?;

                    let assignments =
                        TaskAssignmentRepository::find_by_task(txn, task.id).await?;
                    if assignments.is_empty() {
                        return Err(validation_error(
                            "assignees",
                            "task has no current assignees to ping",
                        ));
                    }

                    AuditLogService::log_action_in(
                        txn,
                        &principal_c,
                        LogActionParams {
                            entity_type: AuditEntityType::Task,
                            entity_id: task.id,
                            entity_label: task.title.clone(),
                            action: AuditAction::TaskPinged,
                            details: Some(serde_json::json!({
                                "message": message_c,
                                "recipient_count": assignments.len(),
                            })),
                        },
                    )
                    .await?;

                    let recipient_ids: Vec<Uuid> =
                        assignments.iter().map(|a| a.user_id).collect();
                    Ok((task.title, recipient_ids))
                })
            })
            .await?;

        // 配信はコミット後。失敗してもpingそのものは成立している。
        let subject = format!("Reminder: {}", task_title);
        for user_id in recipient_ids {
            if let Err(e) = self.notifier.notify_user(user_id, &subject, message).await {
                log_with_context!(
                    tracing::Level::WARN,
                    "Failed to deliver ping notification",
                    "task_id" => task_id,
                    "user_id" => user_id,
                    "error" => e
                );
            }
        }

        Ok(())
    }
}
