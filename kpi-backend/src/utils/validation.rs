// kpi-backend/src/utils/validation.rs

//! 入力バリデーションの共通定義

use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

/// タイトル・名称共通の長さ制限
pub mod common {
    pub const TITLE_MIN_LENGTH: u64 = 1;
    pub const TITLE_MAX_LENGTH: u64 = 200;
    pub const NOTE_MAX_LENGTH: u64 = 2000;

    pub const PROGRESS_MIN: i32 = 0;
    pub const PROGRESS_MAX: i32 = 100;
}

/// 月トークン用正規表現（YYYY-MM）
pub static MONTH_TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}$").unwrap());

/// 月トークンバリデーション
pub fn validate_month_token(token: &str) -> Result<(), ValidationError> {
    if MONTH_TOKEN_REGEX.is_match(token) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_month_token"))
    }
}

/// 空白のみのタイトルを拒否する
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank"))
    } else {
        Ok(())
    }
}
