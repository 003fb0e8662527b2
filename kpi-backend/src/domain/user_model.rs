// kpi-backend/src/domain/user_model.rs
use crate::domain::permission::{Principal, Role};
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, DbErr, Set};
use serde::{Deserialize, Serialize};

/// ユーザーディレクトリの最小限のモデル
///
/// 認証そのものは外部コラボレーターの責務。コア側は実行者の解決と
/// 参照整合性チェックにのみ使用する。
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    pub display_name: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::task_assignment_model::Entity")]
    TaskAssignments,
    #[sea_orm(has_many = "super::kpi_model::Entity")]
    Kpis,
}

impl Related<super::task_assignment_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TaskAssignments.def()
    }
}

impl Related<super::kpi_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Kpis.def()
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
    pub fn user_role(&self) -> Role {
        Role::from_str(&self.role).unwrap_or_default()
    }

    /// このユーザーを実行者として表すPrincipalを生成する
    pub fn to_principal(&self) -> Principal {
        Principal::new(self.id, self.display_name.clone(), self.user_role())
    }
}
