// kpi-backend/src/domain/proposal_model.rs
use crate::domain::proposal_status::ProposalStatus;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, DbErr, Set};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 従業員が提出するタスク／KPIの新設提案
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "proposals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub submitted_by: Uuid,
    pub kind: String,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    // タスク提案用
    #[sea_orm(nullable)]
    pub priority: Option<String>,
    #[sea_orm(nullable)]
    pub expected_deadline: Option<NaiveDate>,
    // KPI提案用
    #[sea_orm(nullable)]
    pub kpi_month: Option<String>,
    #[sea_orm(nullable)]
    pub kpi_target: Option<i32>,
    pub status: String,
    #[sea_orm(nullable)]
    pub reviewed_by: Option<Uuid>,
    #[sea_orm(column_type = "Text", nullable)]
    pub review_note: Option<String>,
    #[sea_orm(nullable)]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[sea_orm(nullable)]
    pub linked_task_id: Option<Uuid>,
    #[sea_orm(nullable)]
    pub linked_kpi_id: Option<Uuid>,
    /// 提出者が審査結果を確認した日時（審査時にクリアされる）
    #[sea_orm(nullable)]
    pub submitter_read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user_model::Entity",
        from = "Column::SubmittedBy",
        to = "super::user_model::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Submitter,
}

impl Related<super::user_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submitter.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            id: Set(Uuid::new_v4()),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..ActiveModelTrait::default()
        }
    }

    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if !insert {
            self.updated_at = Set(Utc::now());
        }
        Ok(self)
    }
}

impl Model {
    pub fn proposal_status(&self) -> ProposalStatus {
        ProposalStatus::from_str(&self.status).unwrap_or_default()
    }

    pub fn proposal_kind(&self) -> ProposalKind {
        ProposalKind::from_str(&self.kind).unwrap_or(ProposalKind::Task)
    }
}

/// 提案の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalKind {
    Task,
    Kpi,
}

impl ProposalKind {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "task" => Some(Self::Task),
            "kpi" => Some(Self::Kpi),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Kpi => "kpi",
        }
    }
}

impl fmt::Display for ProposalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<ProposalKind> for String {
    fn from(kind: ProposalKind) -> Self {
        kind.as_str().to_string()
    }
}
