// src/service/report_service.rs

//! 月次ヘルススナップショット
//!
//! 指定月の全KPIを一括再計算し、サマリー・分布・リスクリスト・
//! ブロック済みタスクからなる読み取り専用ビューを組み立てる。
//! 一括再計算では監査ログを書かない（個別の操作のみが監査対象）。

use crate::api::dto::report_dto::{
    BlockedTaskDto, DistributionDto, HealthSnapshotDto, RiskKpiDto, SnapshotSummaryDto,
};
use crate::db::DbPool;
use crate::domain::progress::{HealthLevel, ProgressBucket};
use crate::error::AppResult;
use crate::log_with_context;
use crate::repository::kpi_repository::KpiRepository;
use crate::repository::task_assignment_repository::TaskAssignmentRepository;
use crate::repository::task_repository::TaskRepository;
use crate::repository::user_repository::UserRepository;
use crate::service::kpi_service::KpiService;
use crate::utils::month::{days_between, offset_days, MonthWindow};
use crate::utils::transaction::TransactionManager;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// リスクリストに載せるKPIの最大件数（達成率の低い順）
const RISK_KPI_LIMIT: usize = 8;
/// ブロック済みタスクの最大件数（期限の近い順）
const BLOCKED_TASK_LIMIT: usize = 10;
/// 期限の探索窓を月の前後に広げる日数
const BLOCKED_WINDOW_PAD_DAYS: i64 = 7;

pub struct ReportService {
    db: DbPool,
}

impl ReportService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// 月トークン（YYYY-MM）からスナップショットを構築する
    ///
    /// トークンが不正な場合はクエリを1つも実行せずにValidationErrorを返す。
    pub async fn build_snapshot(&self, month: &str) -> AppResult<HealthSnapshotDto> {
        let window = MonthWindow::parse(month)?;
        let token = window.token();
        let label = window.label();

        let snapshot = self
            .db
            .execute_in_transaction(move |txn| {
                Box::pin(async move {
                    // 1. 対象月のKPIを全件再計算する
                    let kpis =
                        KpiRepository::find_by_period(txn, window.start, window.end).await?;
                    let mut recalculated = Vec::with_capacity(kpis.len());
                    for kpi in kpis {
                        recalculated.push(KpiService::recalculate_in(txn, kpi).await?);
                    }

                    // 2. サマリー
                    let total = recalculated.len() as u64;
                    let mut on_track = 0u64;
                    let mut at_risk = 0u64;
                    let mut summary_critical = 0u64;
                    for kpi in &recalculated {
                        match HealthLevel::classify(kpi.percent) {
                            HealthLevel::OnTrack => on_track += 1,
                            HealthLevel::AtRisk => at_risk += 1,
                            HealthLevel::Critical => summary_critical += 1,
                        }
                    }
                    let avg_percent = if total > 0 {
                        let sum: i64 = recalculated.iter().map(|k| k.percent as i64).sum();
                        // 小数1桁に丸める
                        (sum as f64 / total as f64 * 10.0).round() / 10.0
                    } else {
                        0.0
                    };

                    // 3. 排他的な分布バケット
                    let mut distribution = DistributionDto::default();
                    for kpi in &recalculated {
                        match ProgressBucket::classify(kpi.percent) {
                            ProgressBucket::Excellent => distribution.excellent += 1,
                            ProgressBucket::Good => distribution.good += 1,
                            ProgressBucket::Warning => distribution.warning += 1,
                            ProgressBucket::Critical => distribution.critical += 1,
                        }
                    }

                    // 4. リスクリスト（達成率の低い順）
                    let mut ranked = recalculated.clone();
                    ranked.sort_by_key(|k| k.percent);
                    let risk_candidates: Vec<_> =
                        ranked.into_iter().take(RISK_KPI_LIMIT).collect();

                    // 5. ブロック済みタスク（期限が前後7日のパディング付き窓内）
                    let pad_start = offset_days(window.start, -BLOCKED_WINDOW_PAD_DAYS);
                    let pad_end = offset_days(window.end, BLOCKED_WINDOW_PAD_DAYS);
                    let unfinished =
                        TaskRepository::find_unfinished_with_due_between(txn, pad_start, pad_end)
                            .await?;
                    let blocked_candidates: Vec<_> =
                        unfinished.into_iter().take(BLOCKED_TASK_LIMIT).collect();

                    let mut assignments_per_task = Vec::with_capacity(blocked_candidates.len());
                    for task in &blocked_candidates {
                        assignments_per_task
                            .push(TaskAssignmentRepository::find_by_task(txn, task.id).await?);
                    }

                    // 表示名の解決は1クエリにまとめる
                    let mut name_ids: HashSet<Uuid> =
                        risk_candidates.iter().map(|k| k.owner_id).collect();
                    for assignments in &assignments_per_task {
                        name_ids.extend(assignments.iter().map(|a| a.user_id));
                    }
                    let id_list: Vec<Uuid> = name_ids.into_iter().collect();
                    let names: HashMap<Uuid, String> =
                        UserRepository::find_by_ids(txn, &id_list)
                            .await?
                            .into_iter()
                            .map(|u| (u.id, u.display_name))
                            .collect();
                    let resolve = |id: &Uuid| {
                        names
                            .get(id)
                            .cloned()
                            .unwrap_or_else(|| "Unknown".to_string())
                    };

                    let today = Utc::now().date_naive();
                    let risk_kpis: Vec<RiskKpiDto> = risk_candidates
                        .into_iter()
                        .map(|kpi| RiskKpiDto {
                            id: kpi.id,
                            name: kpi.name,
                            owner_name: resolve(&kpi.owner_id),
                            owner_id: kpi.owner_id,
                            percent: kpi.percent,
                            deadline: kpi.period_end,
                            days_left: days_between(today, kpi.period_end),
                            note: kpi.note,
                        })
                        .collect();

                    let mut blocked_tasks = Vec::with_capacity(blocked_candidates.len());
                    for (task, assignments) in
                        blocked_candidates.into_iter().zip(assignments_per_task)
                    {
                        // クエリで due_date IS NOT NULL に絞っている
                        let Some(deadline) = task.due_date else {
                            continue;
                        };
                        blocked_tasks.push(BlockedTaskDto {
                            id: task.id,
                            priority: task.task_priority().as_str().to_string(),
                            title: task.title,
                            deadline,
                            assigned_by: task.assigned_by,
                            owners: assignments.iter().map(|a| resolve(&a.user_id)).collect(),
                            status: task.status,
                            is_overdue: deadline < today,
                            days_overdue: days_between(deadline, today),
                        });
                    }

                    Ok(HealthSnapshotDto {
                        month: token,
                        summary: SnapshotSummaryDto {
                            total,
                            on_track,
                            at_risk,
                            critical: summary_critical,
                            avg_percent,
                            month_label: label,
                        },
                        distribution,
                        risk_kpis,
                        blocked_tasks,
                    })
                })
            })
            .await?;

        log_with_context!(
            tracing::Level::INFO,
            "Health snapshot built",
            "month" => snapshot.month,
            "kpi_count" => snapshot.summary.total,
            "blocked_count" => snapshot.blocked_tasks.len()
        );

        Ok(snapshot)
    }
}
