// kpi-backend/src/utils/month.rs

//! 月トークン（`YYYY-MM`）の解釈と日付計算ヘルパー

use crate::error::{AppError, AppResult};
use chrono::{Datelike, Duration, NaiveDate};

/// ある月の初日と末日からなる期間
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MonthWindow {
    /// 月トークン（例: `2025-06`）を解釈する。クエリ実行前に必ず呼ぶこと。
    pub fn parse(token: &str) -> AppResult<Self> {
        let invalid = || {
            AppError::ValidationError(format!(
                "month: invalid month token '{}' (expected YYYY-MM)",
                token
            ))
        };

        let (year_str, month_str) = token.split_once('-').ok_or_else(invalid)?;
        if year_str.len() != 4 || month_str.len() != 2 {
            return Err(invalid());
        }

        let year: i32 = year_str.parse().map_err(|_| invalid())?;
        let month: u32 = month_str.parse().map_err(|_| invalid())?;

        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        Ok(Self {
            start,
            end: last_day_of_month(start),
        })
    }

    /// 表示用ラベル（例: "June 2025"）
    pub fn label(&self) -> String {
        self.start.format("%B %Y").to_string()
    }

    pub fn token(&self) -> String {
        self.start.format("%Y-%m").to_string()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// 与えられた日付が属する月の末日
pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (next_year, next_month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    // 翌月1日の前日
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .expect("first day of next month is always valid")
        .pred_opt()
        .expect("previous day of a first-of-month is always valid")
}

/// `from` から `to` までの符号付き日数（`to` が過去なら負）
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// 日付に日数を加減する（スナップショットの前後パディング用）
pub fn offset_days(date: NaiveDate, days: i64) -> NaiveDate {
    date + Duration::days(days)
}
