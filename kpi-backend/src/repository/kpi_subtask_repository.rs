// kpi-backend/src/repository/kpi_subtask_repository.rs
use crate::domain::kpi_subtask_model::{self, Entity as KpiSubtaskEntity};
use sea_orm::{entity::*, ConnectionTrait, DbErr};
use sea_orm::{Order, QueryFilter, QueryOrder};
use uuid::Uuid;

pub struct KpiSubtaskRepository;

impl KpiSubtaskRepository {
    /// KPIの小目標を表示順で返す
    pub async fn find_by_kpi<C: ConnectionTrait>(
        db: &C,
        kpi_id: Uuid,
    ) -> Result<Vec<kpi_subtask_model::Model>, DbErr> {
        KpiSubtaskEntity::find()
            .filter(kpi_subtask_model::Column::KpiId.eq(kpi_id))
            .order_by(kpi_subtask_model::Column::SortOrder, Order::Asc)
            .all(db)
            .await
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        model: kpi_subtask_model::ActiveModel,
    ) -> Result<kpi_subtask_model::Model, DbErr> {
        model.insert(db).await
    }
}
