// src/service/assignment_service.rs

//! 割り当てのロールアップ
//!
//! タスクと担当者の多対多関係を維持し、担当者ごとの状態から
//! タスク全体の導出ステータスを再計算する。書き込みと再計算は
//! 常に同一トランザクション内で行われる。

use crate::api::dto::task_dto::{AssigneeDto, SyncAssigneesDto, TaskDto, UpdateAssigneeProgressDto};
use crate::db::DbPool;
use crate::domain::permission::Principal;
use crate::domain::progress::derive_task_status;
use crate::domain::task_assignment_model;
use crate::domain::task_model;
use crate::domain::task_status::TaskStatus;
use crate::error::AppResult;
use crate::log_with_context;
use crate::repository::task_assignment_repository::TaskAssignmentRepository;
use crate::repository::task_repository::TaskRepository;
use crate::repository::user_repository::UserRepository;
use crate::utils::error_helper::{
    convert_validation_errors, forbidden_error, not_found_error, validation_error,
};
use crate::utils::transaction::TransactionManager;
use chrono::Utc;
use sea_orm::{ActiveModelBehavior, ConnectionTrait, Set};
use std::collections::HashSet;
use uuid::Uuid;
use validator::Validate;

pub struct AssignmentService {
    db: DbPool,
}

impl AssignmentService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// 担当者集合の冪等な同期（§順序無視・重複無視の集合意味論）
    ///
    /// 残留する担当者の状態・進捗は保持される。新しい集合に含まれない
    /// 担当者は削除され、進捗履歴も失われる。空リストは実行者自身への
    /// 割り当てにフォールバックする。
    pub async fn sync_assignees(
        &self,
        principal: &Principal,
        task_id: Uuid,
        payload: SyncAssigneesDto,
    ) -> AppResult<TaskDto> {
        let user_ids = Self::normalize_user_ids(payload.user_ids, principal);

        let principal = principal.clone();
        self.db
            .execute_in_transaction(move |txn| {
                Box::pin(async move {
                    let task = TaskRepository::find_by_id(txn, task_id).await?.ok_or_else(
                        || {
                            not_found_error(
                                "Task",
                                &task_id.to_string(),
                                "assignment_service::sync_assignees",
                            )
                        },
                    )?;
                    Self::ensure_can_manage(txn, &principal, &task).await?;

                    let users = UserRepository::find_active_by_ids(txn, &user_ids).await?;
                    if users.len() != user_ids.len() {
                        return Err(not_found_error(
                            "User",
                            "one or more assignee ids",
                            "assignment_service::sync_assignees",
                        ));
                    }

                    Self::sync_set_in(txn, task.id, &user_ids).await?;
                    let (task, assignments) = Self::recompute_status_in(txn, task).await?;
                    Ok(TaskDto::from_parts(task, assignments))
                })
            })
            .await
    }

    /// 担当者1名の状態・進捗を更新し、タスクの導出ステータスを再計算する
    ///
    /// 担当者は自分の行のみ更新できる。作成者・割当者・マネージャーは
    /// 任意の行を更新できる。
    pub async fn update_progress(
        &self,
        principal: &Principal,
        task_id: Uuid,
        user_id: Uuid,
        payload: UpdateAssigneeProgressDto,
    ) -> AppResult<TaskDto> {
        payload
            .validate()
            .map_err(|e| convert_validation_errors(e, "assignment_service::update_progress"))?;

        let status = TaskStatus::from_str(&payload.status).ok_or_else(|| {
            validation_error("status", "must be either 'not_started' or 'done'")
        })?;
        let progress = payload.progress;

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
                                "assignment_service::update_progress",
                            )
                        },
                    )?;

                    let is_own_row = principal.id == user_id;
                    if !is_own_row {
                        Self::ensure_can_administer(&principal, &task)?;
                    }

                    let user = UserRepository::find_by_id(txn, user_id).await?.ok_or_else(
                        || {
                            not_found_error(
                                "User",
                                &user_id.to_string(),
                                "assignment_service::update_progress",
                            )
                        },
                    )?;

                    match TaskAssignmentRepository::find_by_task_and_user(txn, task.id, user.id)
                        .await?
                    {
                        Some(assignment) => {
                            let mut active: task_assignment_model::ActiveModel =
                                assignment.into();
                            active.status = Set(status.as_str().to_string());
                            active.progress = Set(progress);
                            TaskAssignmentRepository::update(txn, active).await?;
                        }
                        None => {
                            // 自分以外の未割り当てユーザーへの進捗書き込みは割り当ての追加を意味する
                            if is_own_row {
                                return Err(forbidden_error(
                                    "You are not assigned to this task",
                                    "assignment_service::update_progress",
                                    Some(&principal.id.to_string()),
                                ));
                            }
                            let mut active = task_assignment_model::ActiveModel::new();
                            active.task_id = Set(task.id);
                            active.user_id = Set(user.id);
                            active.status = Set(status.as_str().to_string());
                            active.progress = Set(progress);
                            TaskAssignmentRepository::create(txn, active).await?;
                        }
                    }

                    let (task, assignments) = Self::recompute_status_in(txn, task).await?;
                    Ok(TaskDto::from_parts(task, assignments))
                })
            })
            .await?;

        log_with_context!(
            tracing::Level::INFO,
            "Assignee progress updated",
            "task_id" => task_id,
            "user_id" => user_id,
            "status" => dto.status
        );

        Ok(dto)
    }

    /// 担当者自身による割り当ての確認（read_at）。確認済みなら何もしない。
    pub async fn mark_assignment_read(
        &self,
        principal: &Principal,
        task_id: Uuid,
    ) -> AppResult<AssigneeDto> {
        let task = TaskRepository::find_by_id(&self.db, task_id)
            .await?
            .ok_or_else(|| {
                not_found_error(
                    "Task",
                    &task_id.to_string(),
                    "assignment_service::mark_assignment_read",
                )
            })?;

        let assignment =
            TaskAssignmentRepository::find_by_task_and_user(&self.db, task.id, principal.id)
                .await?
                .ok_or_else(|| {
                    not_found_error(
                        "Assignment",
                        &principal.id.to_string(),
                        "assignment_service::mark_assignment_read",
                    )
                })?;

        if assignment.read_at.is_some() {
            return Ok(AssigneeDto::from(assignment));
        }

        let mut active: task_assignment_model::ActiveModel = assignment.into();
        active.read_at = Set(Some(Utc::now()));
        let updated = TaskAssignmentRepository::update(&self.db, active).await?;
        Ok(AssigneeDto::from(updated))
    }

    /// 集合同期の本体。再割り当てサービスからも同じ実装を使う。
    pub(crate) async fn sync_set_in<C: ConnectionTrait>(
        db: &C,
        task_id: Uuid,
        user_ids: &[Uuid],
    ) -> AppResult<Vec<task_assignment_model::Model>> {
        let existing = TaskAssignmentRepository::find_by_task(db, task_id).await?;
        let desired: HashSet<Uuid> = user_ids.iter().copied().collect();
        let current: HashSet<Uuid> = existing.iter().map(|a| a.user_id).collect();

        let removed: Vec<Uuid> = current.difference(&desired).copied().collect();
        TaskAssignmentRepository::delete_by_task_and_users(db, task_id, &removed).await?;

        for user_id in user_ids {
            if current.contains(user_id) {
                continue;
            }
            let mut active = task_assignment_model::ActiveModel::new();
            active.task_id = Set(task_id);
            active.user_id = Set(*user_id);
            active.status = Set(TaskStatus::NotStarted.as_str().to_string());
            active.progress = Set(0);
            TaskAssignmentRepository::create(db, active).await?;
        }

        let assignments = TaskAssignmentRepository::find_by_task(db, task_id).await?;
        Ok(assignments)
    }

    /// 現在の割り当て集合からタスクの導出ステータスを再計算する
    pub(crate) async fn recompute_status_in<C: ConnectionTrait>(
        db: &C,
        task: task_model::Model,
    ) -> AppResult<(task_model::Model, Vec<task_assignment_model::Model>)> {
        let assignments = TaskAssignmentRepository::find_by_task(db, task.id).await?;
        let done = assignments.iter().filter(|a| a.is_done()).count() as u64;
        let derived = derive_task_status(done, assignments.len() as u64);

        let task = if task.task_status() != derived {
            TaskRepository::update_status(db, task, derived).await?
        } else {
            task
        };
        Ok((task, assignments))
    }

    /// 重複を除去し、空リストは実行者へのフォールバックに置き換える
    pub(crate) fn normalize_user_ids(user_ids: Vec<Uuid>, principal: &Principal) -> Vec<Uuid> {
        let mut seen = HashSet::new();
        let mut normalized: Vec<Uuid> = user_ids
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();
        if normalized.is_empty() {
            normalized.push(principal.id);
        }
        normalized
    }

    /// 管理権限・作成者・割当者のいずれかであること
    fn ensure_can_administer(principal: &Principal, task: &task_model::Model) -> AppResult<()> {
        if principal.is_manager()
            || task.created_by == principal.id
            || task.assigned_by == principal.id
        {
            Ok(())
        } else {
            Err(forbidden_error(
                "You are not allowed to manage this task",
                "assignment_service::ensure_can_administer",
                Some(&principal.id.to_string()),
            ))
        }
    }

    /// 管理権限・作成者・割当者に加えて、現担当者にも操作を許す
    async fn ensure_can_manage<C: ConnectionTrait>(
        db: &C,
        principal: &Principal,
        task: &task_model::Model,
    ) -> AppResult<()> {
        if Self::ensure_can_administer(principal, task).is_ok() {
            return Ok(());
        }
        let assignment =
            TaskAssignmentRepository::find_by_task_and_user(db, task.id, principal.id).await?;
        if assignment.is_some() {
            Ok(())
        } else {
            Err(forbidden_error(
                "You are not allowed to manage this task",
                "assignment_service::ensure_can_manage",
                Some(&principal.id.to_string()),
            ))
        }
    }
}
