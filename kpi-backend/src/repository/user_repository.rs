// kpi-backend/src/repository/user_repository.rs
use crate::domain::user_model::{self, Entity as UserEntity};
use sea_orm::{entity::*, ConnectionTrait, DbErr, QueryFilter};
use uuid::Uuid;

/// ユーザーディレクトリへの読み取りアクセス
///
/// 全メソッドは `ConnectionTrait` 総称なので、単発の接続でも
/// トランザクション内でも同じクエリが使える。
pub struct UserRepository;

impl UserRepository {
    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
    ) -> Result<Option<user_model::Model>, DbErr> {
        UserEntity::find_by_id(id).one(db).await
    }

    /// 指定されたID集合のユーザーを返す（表示名の解決用、無効ユーザーも含む）
    pub async fn find_by_ids<C: ConnectionTrait>(
        db: &C,
        ids: &[Uuid],
    ) -> Result<Vec<user_model::Model>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        UserEntity::find()
            .filter(user_model::Column::Id.is_in(ids.iter().copied()))
            .all(db)
            .await
    }

    /// 指定されたID集合のうち、有効なユーザーのみを返す
    pub async fn find_active_by_ids<C: ConnectionTrait>(
        db: &C,
        ids: &[Uuid],
    ) -> Result<Vec<user_model::Model>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        UserEntity::find()
            .filter(user_model::Column::Id.is_in(ids.iter().copied()))
            .filter(user_model::Column::IsActive.eq(true))
            .all(db)
            .await
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        model: user_model::ActiveModel,
    ) -> Result<user_model::Model, DbErr> {
        model.insert(db).await
    }
}
