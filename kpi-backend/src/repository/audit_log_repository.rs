// kpi-backend/src/repository/audit_log_repository.rs
use crate::domain::audit_log_model::{self, Entity as AuditLogEntity};
use sea_orm::{entity::*, ConnectionTrait, DbErr};
use sea_orm::{Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

/// 監査ログへのアクセス
///
/// 追記専用テーブルなので作成と読み取りのみを提供する。
/// 更新・削除のメソッドは意図的に存在しない。
pub struct AuditLogRepository;

impl AuditLogRepository {
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        model: audit_log_model::ActiveModel,
    ) -> Result<audit_log_model::Model, DbErr> {
        model.insert(db).await
    }

    /// 特定エンティティの監査履歴を新しい順で返す
    pub async fn find_by_entity<C: ConnectionTrait>(
        db: &C,
        entity_type: &str,
        entity_id: Uuid,
    ) -> Result<Vec<audit_log_model::Model>, DbErr> {
        AuditLogEntity::find()
            .filter(audit_log_model::Column::EntityType.eq(entity_type))
            .filter(audit_log_model::Column::EntityId.eq(entity_id))
            .order_by(audit_log_model::Column::CreatedAt, Order::Desc)
            .all(db)
            .await
    }

    pub async fn find_recent<C: ConnectionTrait>(
        db: &C,
        limit: u64,
    ) -> Result<Vec<audit_log_model::Model>, DbErr> {
        AuditLogEntity::find()
            .order_by(audit_log_model::Column::CreatedAt, Order::Desc)
            .limit(limit)
            .all(db)
            .await
    }

    pub async fn count_all<C: ConnectionTrait>(db: &C) -> Result<u64, DbErr> {
        AuditLogEntity::find().count(db).await
    }
}
