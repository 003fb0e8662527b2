// kpi-backend/src/domain/kpi_subtask_model.rs
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};

/// KPIを構成する小目標（タイトル・目標値の組）
///
/// タイトルはタスクのタイトルと大文字小文字を無視して照合され、
/// 一致した完了タスクの進捗が実績として合算される。
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "kpi_subtasks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub kpi_id: Uuid,
    pub title: String,
    pub target: i32,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::kpi_model::Entity",
        from = "Column::KpiId",
        to = "super::kpi_model::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Kpi,
}

impl Related<super::kpi_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Kpi.def()
    }
}

impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            id: Set(Uuid::new_v4()),
            created_at: Set(Utc::now()),
            ..ActiveModelTrait::default()
        }
    }
}

impl Model {
    /// タスクタイトルとの照合（大文字小文字を無視）
    pub fn matches_title(&self, task_title: &str) -> bool {
        self.title.to_lowercase() == task_title.to_lowercase()
    }
}
