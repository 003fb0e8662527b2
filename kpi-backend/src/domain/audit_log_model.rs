// kpi-backend/src/domain/audit_log_model.rs
use crate::domain::permission::Principal;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 監査ログの1行
///
/// 追記専用。作成後に更新・削除されることはない（コード上に経路が存在しない）。
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub entity_label: String,
    pub action: String,
    pub actor_id: Uuid,
    pub actor_name: String,
    pub actor_role: String,
    pub details: Option<Json>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

// 監査対象エンティティの種別
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AuditEntityType {
    Task,
    Kpi,
    Proposal,
    Report,
}

impl AuditEntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEntityType::Task => "task",
            AuditEntityType::Kpi => "kpi",
            AuditEntityType::Proposal => "proposal",
            AuditEntityType::Report => "report",
        }
    }
}

// 監査アクションの定義
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum AuditAction {
    // タスク関連
    TaskCreated,
    TaskReassigned,
    TaskPinged,

    // KPI関連
    KpiCreated,
    KpiReassigned,

    // 提案関連
    ProposalSubmitted,
    ProposalApproved,
    ProposalRejected,

    // その他
    Custom(String),
}

impl AuditAction {
    pub fn as_str(&self) -> &str {
        match self {
            AuditAction::TaskCreated => "task_created",
            AuditAction::TaskReassigned => "task_reassigned",
            AuditAction::TaskPinged => "task_pinged",
            AuditAction::KpiCreated => "kpi_created",
            AuditAction::KpiReassigned => "kpi_reassigned",
            AuditAction::ProposalSubmitted => "proposal_submitted",
            AuditAction::ProposalApproved => "proposal_approved",
            AuditAction::ProposalRejected => "proposal_rejected",
            AuditAction::Custom(action) => action,
        }
    }
}

// 監査ログエントリービルダー
pub struct AuditLogBuilder {
    entity_type: AuditEntityType,
    entity_id: Uuid,
    entity_label: String,
    action: AuditAction,
    actor_id: Uuid,
    actor_name: String,
    actor_role: String,
    details: Option<serde_json::Value>,
}

impl AuditLogBuilder {
    pub fn new(
        entity_type: AuditEntityType,
        entity_id: Uuid,
        entity_label: impl Into<String>,
        action: AuditAction,
        actor: &Principal,
    ) -> Self {
        Self {
            entity_type,
            entity_id,
            entity_label: entity_label.into(),
            action,
            actor_id: actor.id,
            actor_name: actor.name.clone(),
            actor_role: actor.role.as_str().to_string(),
            details: None,
        }
    }

    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn build(self) -> ActiveModel {
        ActiveModel {
            id: Set(Uuid::new_v4()),
            entity_type: Set(self.entity_type.as_str().to_string()),
            entity_id: Set(self.entity_id),
            entity_label: Set(self.entity_label),
            action: Set(self.action.as_str().to_string()),
            actor_id: Set(self.actor_id),
            actor_name: Set(self.actor_name),
            actor_role: Set(self.actor_role),
            details: Set(self.details),
            created_at: Set(Utc::now()),
        }
    }
}
