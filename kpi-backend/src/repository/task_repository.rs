// kpi-backend/src/repository/task_repository.rs
use crate::domain::task_model::{self, Entity as TaskEntity};
use crate::domain::task_status::TaskStatus;
use chrono::NaiveDate;
use sea_orm::{entity::*, ConnectionTrait, DbErr, Set};
use sea_orm::{Order, QueryFilter, QueryOrder};
use uuid::Uuid;

pub struct TaskRepository;

impl TaskRepository {
    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
    ) -> Result<Option<task_model::Model>, DbErr> {
        TaskEntity::find_by_id(id).one(db).await
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        model: task_model::ActiveModel,
    ) -> Result<task_model::Model, DbErr> {
        model.insert(db).await
    }

    /// 導出ステータス列のみを更新する
    pub async fn update_status<C: ConnectionTrait>(
        db: &C,
        task: task_model::Model,
        status: TaskStatus,
    ) -> Result<task_model::Model, DbErr> {
        let mut active: task_model::ActiveModel = task.into();
        active.status = Set(status.as_str().to_string());
        active.update(db).await
    }

    /// 指定ID集合のうち、完了済みかつ実施日が期間内のタスク
    ///
    /// KPI集計用。タイトル照合は照合順序に依存しないようサービス層で行う。
    pub async fn find_done_in_window_by_ids<C: ConnectionTrait>(
        db: &C,
        ids: &[Uuid],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<task_model::Model>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        TaskEntity::find()
            .filter(task_model::Column::Id.is_in(ids.iter().copied()))
            .filter(task_model::Column::Status.eq(TaskStatus::Done.as_str()))
            .filter(task_model::Column::ScheduledDate.gte(start))
            .filter(task_model::Column::ScheduledDate.lte(end))
            .all(db)
            .await
    }

    /// 未完了かつ期限が範囲内のタスクを期限昇順で返す
    ///
    /// スナップショットのブロック済みタスク抽出用。
    pub async fn find_unfinished_with_due_between<C: ConnectionTrait>(
        db: &C,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<task_model::Model>, DbErr> {
        TaskEntity::find()
            .filter(task_model::Column::Status.ne(TaskStatus::Done.as_str()))
            .filter(task_model::Column::DueDate.is_not_null())
            .filter(task_model::Column::DueDate.gte(from))
            .filter(task_model::Column::DueDate.lte(to))
            .order_by(task_model::Column::DueDate, Order::Asc)
            .all(db)
            .await
    }
}
