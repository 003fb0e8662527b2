use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 同一タスク・同一ユーザーの割り当ては1件のみ
        manager
            .create_index(
                Index::create()
                    .name("idx_task_assignments_task_user")
                    .table(TaskAssignments::Table)
                    .col(TaskAssignments::TaskId)
                    .col(TaskAssignments::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 同一オーナー・同一月のKPIは1件のみ
        manager
            .create_index(
                Index::create()
                    .name("idx_kpis_owner_period_start")
                    .table(Kpis::Table)
                    .col(Kpis::OwnerId)
                    .col(Kpis::PeriodStart)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 月次集計・スナップショットの検索用
        manager
            .create_index(
                Index::create()
                    .name("idx_tasks_scheduled_date")
                    .table(Tasks::Table)
                    .col(Tasks::ScheduledDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tasks_due_date")
                    .table(Tasks::Table)
                    .col(Tasks::DueDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_audit_logs_entity")
                    .table(AuditLogs::Table)
                    .col(AuditLogs::EntityType)
                    .col(AuditLogs::EntityId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_proposals_status")
                    .table(Proposals::Table)
                    .col(Proposals::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_task_assignments_task_user")
                    .table(TaskAssignments::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_kpis_owner_period_start")
                    .table(Kpis::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_tasks_scheduled_date")
                    .table(Tasks::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_tasks_due_date")
                    .table(Tasks::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_audit_logs_entity")
                    .table(AuditLogs::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_proposals_status")
                    .table(Proposals::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum TaskAssignments {
    Table,
    TaskId,
    UserId,
}

#[derive(DeriveIden)]
enum Kpis {
    Table,
    OwnerId,
    PeriodStart,
}

#[derive(DeriveIden)]
enum Tasks {
    Table,
    ScheduledDate,
    DueDate,
}

#[derive(DeriveIden)]
enum AuditLogs {
    Table,
    EntityType,
    EntityId,
}

#[derive(DeriveIden)]
enum Proposals {
    Table,
    Status,
}
