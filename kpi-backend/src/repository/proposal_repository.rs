// kpi-backend/src/repository/proposal_repository.rs
use crate::domain::proposal_model::{self, Entity as ProposalEntity};
use crate::domain::proposal_status::ProposalStatus;
use sea_orm::{entity::*, ConnectionTrait, DbErr};
use sea_orm::{Order, QueryFilter, QueryOrder};
use uuid::Uuid;

pub struct ProposalRepository;

impl ProposalRepository {
    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
    ) -> Result<Option<proposal_model::Model>, DbErr> {
        ProposalEntity::find_by_id(id).one(db).await
    }

    pub async fn find_by_submitter<C: ConnectionTrait>(
        db: &C,
        submitted_by: Uuid,
    ) -> Result<Vec<proposal_model::Model>, DbErr> {
        ProposalEntity::find()
            .filter(proposal_model::Column::SubmittedBy.eq(submitted_by))
            .order_by(proposal_model::Column::CreatedAt, Order::Desc)
            .all(db)
            .await
    }

    /// 審査待ちの提案を提出順で返す
    pub async fn find_pending<C: ConnectionTrait>(
        db: &C,
    ) -> Result<Vec<proposal_model::Model>, DbErr> {
        ProposalEntity::find()
            .filter(proposal_model::Column::Status.eq(ProposalStatus::Pending.as_str()))
            .order_by(proposal_model::Column::CreatedAt, Order::Asc)
            .all(db)
            .await
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        model: proposal_model::ActiveModel,
    ) -> Result<proposal_model::Model, DbErr> {
        model.insert(db).await
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        model: proposal_model::ActiveModel,
    ) -> Result<proposal_model::Model, DbErr> {
        model.update(db).await
    }
}
