// kpi-backend/src/repository/kpi_repository.rs
use crate::domain::kpi_model::{self, Entity as KpiEntity};
use chrono::NaiveDate;
use sea_orm::{entity::*, ConnectionTrait, DbErr, Set};
use sea_orm::{Order, QueryFilter, QueryOrder};
use uuid::Uuid;

pub struct KpiRepository;

impl KpiRepository {
    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
    ) -> Result<Option<kpi_model::Model>, DbErr> {
        KpiEntity::find_by_id(id).one(db).await
    }

    /// (オーナー, 月初日) での一意性チェック用
    pub async fn find_by_owner_and_period_start<C: ConnectionTrait>(
        db: &C,
        owner_id: Uuid,
        period_start: NaiveDate,
    ) -> Result<Option<kpi_model::Model>, DbErr> {
        KpiEntity::find()
            .filter(kpi_model::Column::OwnerId.eq(owner_id))
            .filter(kpi_model::Column::PeriodStart.eq(period_start))
            .one(db)
            .await
    }

    /// 期間が月の初日・末日と完全一致するKPIを全件返す
    pub async fn find_by_period<C: ConnectionTrait>(
        db: &C,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<Vec<kpi_model::Model>, DbErr> {
        KpiEntity::find()
            .filter(kpi_model::Column::PeriodStart.eq(period_start))
            .filter(kpi_model::Column::PeriodEnd.eq(period_end))
            .order_by(kpi_model::Column::CreatedAt, Order::Asc)
            .all(db)
            .await
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        model: kpi_model::ActiveModel,
    ) -> Result<kpi_model::Model, DbErr> {
        model.insert(db).await
    }

    /// 導出キャッシュ列（target / actual / percent）のみを更新する
    pub async fn update_derived<C: ConnectionTrait>(
        db: &C,
        kpi: kpi_model::Model,
        target_progress: i32,
        actual_progress: i32,
        percent: i32,
    ) -> Result<kpi_model::Model, DbErr> {
        let mut active: kpi_model::ActiveModel = kpi.into();
        active.target_progress = Set(target_progress);
        active.actual_progress = Set(actual_progress);
        active.percent = Set(percent);
        active.update(db).await
    }

    /// オーナー（と任意の備考）を付け替える
    pub async fn update_owner<C: ConnectionTrait>(
        db: &C,
        kpi: kpi_model::Model,
        new_owner_id: Uuid,
        note: Option<String>,
    ) -> Result<kpi_model::Model, DbErr> {
        let mut active: kpi_model::ActiveModel = kpi.into();
        active.owner_id = Set(new_owner_id);
        if let Some(note) = note {
            active.note = Set(Some(note));
        }
        active.update(db).await
    }
}
