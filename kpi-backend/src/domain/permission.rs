// kpi-backend/src/domain/permission.rs

//! 操作主体（Principal）とロールの定義
//!
//! 全てのコア操作は環境依存のセッション状態ではなく、明示的な
//! `Principal` 引数で実行者を受け取る。

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// ユーザーのロール
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Member,
    Manager,
    Admin,
}

impl Role {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "member" => Some(Self::Member),
            "manager" => Some(Self::Manager),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }

    /// 管理権限（KPI・割り当ての変更、提案の審査）を持つか
    pub fn is_manager(&self) -> bool {
        matches!(self, Self::Manager | Self::Admin)
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Member
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// コア操作の実行者
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
}

impl Principal {
    pub fn new(id: Uuid, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            role,
        }
    }

    pub fn is_manager(&self) -> bool {
        self.role.is_manager()
    }

    /// 管理権限を要求する。満たさない場合は状態を変更せずForbiddenを返す。
    pub fn require_manager(&self, context: &str) -> AppResult<()> {
        if self.is_manager() {
            Ok(())
        } else {
            tracing::warn!(
                context = %context,
                user_id = %self.id,
                role = %self.role,
                "Forbidden access attempt"
            );
            Err(AppError::Forbidden(
                "This operation requires a manager role".to_string(),
            ))
        }
    }
}
