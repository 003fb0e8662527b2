// src/service/kpi_service.rs

//! KPIの集計
//!
//! `target_progress` / `actual_progress` / `percent` は導出キャッシュ列。
//! ここにある再計算は現在のタスク・小目標の純粋な関数であり、
//! 何度呼んでも同じ結果になる。読み取り系は返す前に必ず再計算する
//! （プル型の導出状態）。

use crate::api::dto::kpi_dto::{CreateKpiDto, KpiDto};
use crate::db::DbPool;
use crate::domain::audit_log_model::{AuditAction, AuditEntityType};
use crate::domain::kpi_model;
use crate::domain::kpi_subtask_model;
use crate::domain::permission::Principal;
use crate::domain::progress::compute_percent;
use crate::error::AppResult;
use crate::log_with_context;
use crate::repository::kpi_repository::KpiRepository;
use crate::repository::kpi_subtask_repository::KpiSubtaskRepository;
use crate::repository::task_assignment_repository::TaskAssignmentRepository;
use crate::repository::task_repository::TaskRepository;
use crate::repository::user_repository::UserRepository;
use crate::service::audit_log_service::{AuditLogService, LogActionParams};
use crate::utils::error_helper::{conflict_error, convert_validation_errors, not_found_error};
use crate::utils::month::MonthWindow;
use crate::utils::transaction::TransactionManager;
use sea_orm::{ActiveModelBehavior, ConnectionTrait, Set};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

pub struct KpiService {
    db: DbPool,
}

impl KpiService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// KPIと小目標を1トランザクションで作成する（マネージャー限定）
    ///
    /// 同一の(オーナー, 月)に対する2つ目のKPIはConflictになる。
    pub async fn create_kpi(
        &self,
        principal: &Principal,
        payload: CreateKpiDto,
    ) -> AppResult<KpiDto> {
        principal.require_manager("kpi_service::create_kpi")?;
        payload
            .validate()
            .map_err(|e| convert_validation_errors(e, "kpi_service::create_kpi"))?;

        let window = MonthWindow::parse(&payload.month)?;

        let principal = principal.clone();
        let dto = self
            .db
            .execute_in_transaction(move |txn| {
                Box::pin(async move {
                    let owner = UserRepository::find_by_id(txn, payload.owner_id)
                        .await?
                        .ok_or_else(|| {
                            not_found_error(
                                "User",
                                &payload.owner_id.to_string(),
                                "kpi_service::create_kpi",
                            )
                        })?;

                    if KpiRepository::find_by_owner_and_period_start(
                        txn,
                        owner.id,
                        window.start,
                    )
                    .await?
                    .is_some()
                    {
                        return Err(conflict_error(
                            "A KPI for this owner and month already exists",
                            "kpi_service::create_kpi",
                        ));
                    }

                    let mut active = kpi_model::ActiveModel::new();
                    active.owner_id = Set(owner.id);
                    active.period_start = Set(window.start);
                    active.period_end = Set(window.end);
                    active.name = Set(payload.name.clone());
                    active.note = Set(payload.note.clone());
                    active.target_progress = Set(0);
                    active.actual_progress = Set(0);
                    active.percent = Set(0);
                    let kpi = KpiRepository::create(txn, active).await?;

                    for (index, subtask) in payload.subtasks.iter().enumerate() {
                        let mut active = kpi_subtask_model::ActiveModel::new();
                        active.kpi_id = Set(kpi.id);
                        active.title = Set(subtask.title.clone());
                        active.target = Set(subtask.target);
                        active.sort_order = Set(index as i32);
                        KpiSubtaskRepository::create(txn, active).await?;
                    }

                    let kpi = Self::recalculate_in(txn, kpi).await?;

                    AuditLogService::log_action_in(
                        txn,
                        &principal,
                        LogActionParams {
                            entity_type: AuditEntityType::Kpi,
                            entity_id: kpi.id,
                            entity_label: kpi.name.clone(),
                            action: AuditAction::KpiCreated,
                            details: Some(serde_json::json!({
                                "owner_id": owner.id,
                                "owner_name": owner.display_name,
                                "month": window.token(),
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
            "KPI created",
            "kpi_id" => dto.id,
            "owner_id" => dto.owner_id,
            "month" => window.token()
        );

        Ok(dto)
    }

    /// KPIを再計算してから返す
    pub async fn get_kpi(&self, id: Uuid) -> AppResult<KpiDto> {
        self.db
            .execute_in_transaction(move |txn| {
                Box::pin(async move {
                    let kpi = KpiRepository::find_by_id(txn, id).await?.ok_or_else(|| {
                        not_found_error("Kpi", &id.to_string(), "kpi_service::get_kpi")
                    })?;
                    let kpi = Self::recalculate_in(txn, kpi).await?;
                    let subtasks = KpiSubtaskRepository::find_by_kpi(txn, kpi.id).await?;
                    Ok(KpiDto::from_parts(kpi, subtasks))
                })
            })
            .await
    }

    /// 指定月のKPIを全件、再計算してから返す
    pub async fn list_kpis_for_month(&self, month: &str) -> AppResult<Vec<KpiDto>> {
        let window = MonthWindow::parse(month)?;
        self.db
            .execute_in_transaction(move |txn| {
                Box::pin(async move {
                    let kpis =
                        KpiRepository::find_by_period(txn, window.start, window.end).await?;
                    let mut dtos = Vec::with_capacity(kpis.len());
                    for kpi in kpis {
                        let kpi = Self::recalculate_in(txn, kpi).await?;
                        let subtasks = KpiSubtaskRepository::find_by_kpi(txn, kpi.id).await?;
                        dtos.push(KpiDto::from_parts(kpi, subtasks));
                    }
                    Ok(dtos)
                })
            })
            .await
    }

    pub async fn recalculate(&self, kpi_id: Uuid) -> AppResult<KpiDto> {
        self.db
            .execute_in_transaction(move |txn| {
                Box::pin(async move {
                    let kpi = KpiRepository::find_by_id(txn, kpi_id).await?.ok_or_else(
                        || {
                            not_found_error(
                                "Kpi",
                                &kpi_id.to_string(),
                                "kpi_service::recalculate",
                            )
                        },
                    )?;
                    let kpi = Self::recalculate_in(txn, kpi).await?;
                    let subtasks = KpiSubtaskRepository::find_by_kpi(txn, kpi.id).await?;
                    Ok(KpiDto::from_parts(kpi, subtasks))
                })
            })
            .await
    }

    /// 導出列の再計算本体
    ///
    /// 小目標 (title, target) ごとに、オーナー自身の割り当てを持つ
    /// 完了済みタスクのうち、タイトルが（大文字小文字を無視して）一致し
    /// 実施日が期間内のものの進捗を実績として合算する。一致するタスクの
    /// ない小目標も目標値には寄与する（未達をそのまま達成率に反映する）。
    pub async fn recalculate_in<C: ConnectionTrait>(
        db: &C,
        kpi: kpi_model::Model,
    ) -> AppResult<kpi_model::Model> {
        let subtasks = KpiSubtaskRepository::find_by_kpi(db, kpi.id).await?;

        // オーナー自身の割り当てがあるタスクだけが集計対象
        let assignments = TaskAssignmentRepository::find_by_user(db, kpi.owner_id).await?;
        let progress_by_task: HashMap<Uuid, i32> = assignments
            .iter()
            .map(|a| (a.task_id, a.progress))
            .collect();
        let task_ids: Vec<Uuid> = progress_by_task.keys().copied().collect();

        let window = kpi.window();
        let done_tasks =
            TaskRepository::find_done_in_window_by_ids(db, &task_ids, window.start, window.end)
                .await?;

        let mut target_total = 0;
        let mut actual_total = 0;
        for subtask in &subtasks {
            target_total += subtask.target;
            for task in &done_tasks {
                if subtask.matches_title(&task.title) {
                    actual_total += progress_by_task.get(&task.id).copied().unwrap_or(0);
                }
            }
        }

        let percent = compute_percent(actual_total, target_total);
        let kpi = KpiRepository::update_derived(db, kpi, target_total, actual_total, percent)
            .await?;
        Ok(kpi)
    }
}
