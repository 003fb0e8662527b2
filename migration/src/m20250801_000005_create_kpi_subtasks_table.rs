use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(KpiSubtasks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(KpiSubtasks::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(KpiSubtasks::KpiId).uuid().not_null())
                    .col(
                        // タスクのタイトルと大文字小文字を無視して照合される
                        ColumnDef::new(KpiSubtasks::Title).string().not_null(),
                    )
                    .col(
                        ColumnDef::new(KpiSubtasks::Target)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(KpiSubtasks::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(KpiSubtasks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_kpi_subtasks_kpi_id")
                            .from(KpiSubtasks::Table, KpiSubtasks::KpiId)
                            .to(Kpis::Table, Kpis::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(KpiSubtasks::Table).to_owned())
            .await
    }
}

/// Iden Enum for the 'kpi_subtasks' table and its columns
#[derive(DeriveIden)]
enum KpiSubtasks {
    Table,
    Id,
    KpiId,
    Title,
    Target,
    SortOrder,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Kpis {
    Table,
    Id,
}
