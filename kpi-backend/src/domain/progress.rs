// kpi-backend/src/domain/progress.rs

//! 進捗の導出ロジック
//!
//! タスク状態のロールアップ・KPI達成率・スナップショットの分類は
//! すべてここの純粋関数で行い、サービス層（即時再計算）と
//! スナップショットの一括再計算の両方から同じ実装を呼ぶ。

use crate::domain::task_status::TaskStatus;
use serde::{Deserialize, Serialize};

/// 担当者の完了数からタスク全体の状態を導出する
///
/// 担当者ゼロは「未割り当て」として NotStarted 扱い。
pub fn derive_task_status(done_count: u64, total_count: u64) -> TaskStatus {
    if total_count > 0 && done_count == total_count {
        TaskStatus::Done
    } else {
        TaskStatus::NotStarted
    }
}

/// 達成率（%）を計算する
///
/// `target == 0` の場合は 0。100 を超える値はそのまま返す
/// （目標超過は意図的にクランプしない）。
pub fn compute_percent(actual: i32, target: i32) -> i32 {
    if target > 0 {
        (100.0 * actual as f64 / target as f64).round() as i32
    } else {
        0
    }
}

/// スナップショットの分布バケット（高い方から排他的に評価）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressBucket {
    Excellent,
    Good,
    Warning,
    Critical,
}

impl ProgressBucket {
    pub fn classify(percent: i32) -> Self {
        if percent >= 95 {
            Self::Excellent
        } else if percent >= 85 {
            Self::Good
        } else if percent >= 70 {
            Self::Warning
        } else {
            Self::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

/// サマリー集計用の健全性レベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthLevel {
    OnTrack,
    AtRisk,
    Critical,
}

impl HealthLevel {
    pub fn classify(percent: i32) -> Self {
        if percent >= 90 {
            Self::OnTrack
        } else if percent >= 70 {
            Self::AtRisk
        } else {
            Self::Critical
        }
    }
}
