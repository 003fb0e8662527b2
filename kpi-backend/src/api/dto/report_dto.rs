// src/api/dto/report_dto.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 月次サマリー
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SnapshotSummaryDto {
    pub total: u64,
    pub on_track: u64,
    pub at_risk: u64,
    pub critical: u64,
    /// 平均達成率（小数1桁に丸め）
    pub avg_percent: f64,
    pub month_label: String,
}

/// 達成率の分布（排他的バケット）
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct DistributionDto {
    pub excellent: u64,
    pub good: u64,
    pub warning: u64,
    pub critical: u64,
}

/// リスクの高いKPI（達成率の低い順）
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RiskKpiDto {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub owner_name: String,
    pub percent: i32,
    pub deadline: NaiveDate,
    /// 期末までの符号付き日数（負なら期限超過）
    pub days_left: i64,
    pub note: Option<String>,
}

/// 期限が迫っている・超過している未完了タスク
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BlockedTaskDto {
    pub id: Uuid,
    pub title: String,
    pub priority: String,
    pub deadline: NaiveDate,
    pub assigned_by: Uuid,
    pub owners: Vec<String>,
    pub status: String,
    pub is_overdue: bool,
    /// 期限からの符号付き日数（正なら超過）
    pub days_overdue: i64,
}

/// 月次の読み取り専用スナップショット
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthSnapshotDto {
    pub month: String,
    pub summary: SnapshotSummaryDto,
    pub distribution: DistributionDto,
    pub risk_kpis: Vec<RiskKpiDto>,
    pub blocked_tasks: Vec<BlockedTaskDto>,
}
