// kpi-backend/src/repository/task_assignment_repository.rs
use crate::domain::task_assignment_model::{self, Entity as TaskAssignmentEntity};
use sea_orm::{entity::*, ConnectionTrait, DbErr};
use sea_orm::{Order, QueryFilter, QueryOrder};
use uuid::Uuid;

pub struct TaskAssignmentRepository;

impl TaskAssignmentRepository {
    pub async fn find_by_task<C: ConnectionTrait>(
        db: &C,
        task_id: Uuid,
    ) -> Result<Vec<task_assignment_model::Model>, DbErr> {
        TaskAssignmentEntity::find()
            .filter(task_assignment_model::Column::TaskId.eq(task_id))
            .order_by(task_assignment_model::Column::AssignedAt, Order::Asc)
            .all(db)
            .await
    }

    pub async fn find_by_task_and_user<C: ConnectionTrait>(
        db: &C,
        task_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<task_assignment_model::Model>, DbErr> {
        TaskAssignmentEntity::find()
            .filter(task_assignment_model::Column::TaskId.eq(task_id))
            .filter(task_assignment_model::Column::UserId.eq(user_id))
            .one(db)
            .await
    }

    pub async fn find_by_user<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
    ) -> Result<Vec<task_assignment_model::Model>, DbErr> {
        TaskAssignmentEntity::find()
            .filter(task_assignment_model::Column::UserId.eq(user_id))
            .all(db)
            .await
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        model: task_assignment_model::ActiveModel,
    ) -> Result<task_assignment_model::Model, DbErr> {
        model.insert(db).await
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        model: task_assignment_model::ActiveModel,
    ) -> Result<task_assignment_model::Model, DbErr> {
        model.update(db).await
    }

    /// 指定ユーザー群の割り当てを削除する
    ///
    /// 進捗履歴も一緒に失われる（アーカイブはしない）。
    pub async fn delete_by_task_and_users<C: ConnectionTrait>(
        db: &C,
        task_id: Uuid,
        user_ids: &[Uuid],
    ) -> Result<u64, DbErr> {
        if user_ids.is_empty() {
            return Ok(0);
        }
        let result = TaskAssignmentEntity::delete_many()
            .filter(task_assignment_model::Column::TaskId.eq(task_id))
            .filter(task_assignment_model::Column::UserId.is_in(user_ids.iter().copied()))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}
