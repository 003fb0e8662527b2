use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Proposals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Proposals::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Proposals::SubmittedBy).uuid().not_null())
                    .col(
                        // task / kpi
                        ColumnDef::new(Proposals::Kind).string().not_null(),
                    )
                    .col(ColumnDef::new(Proposals::Title).string().not_null())
                    .col(ColumnDef::new(Proposals::Description).text())
                    // タスク提案用のフィールド
                    .col(ColumnDef::new(Proposals::Priority).string())
                    .col(ColumnDef::new(Proposals::ExpectedDeadline).date())
                    // KPI提案用のフィールド
                    .col(ColumnDef::new(Proposals::KpiMonth).string())
                    .col(ColumnDef::new(Proposals::KpiTarget).integer())
                    .col(
                        // pending / approved / rejected（approved・rejectedは終端状態）
                        ColumnDef::new(Proposals::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Proposals::ReviewedBy).uuid())
                    .col(ColumnDef::new(Proposals::ReviewNote).text())
                    .col(ColumnDef::new(Proposals::ReviewedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Proposals::LinkedTaskId).uuid())
                    .col(ColumnDef::new(Proposals::LinkedKpiId).uuid())
                    .col(
                        // 提出者が審査結果を確認した日時
                        ColumnDef::new(Proposals::SubmitterReadAt).timestamp_with_time_zone(),
                    )
                    .col(
                        ColumnDef::new(Proposals::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Proposals::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_proposals_submitted_by")
                            .from(Proposals::Table, Proposals::SubmittedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Proposals::Table).to_owned())
            .await
    }
}

/// Iden Enum for the 'proposals' table and its columns
#[derive(DeriveIden)]
enum Proposals {
    Table,
    Id,
    SubmittedBy,
    Kind,
    Title,
    Description,
    Priority,
    ExpectedDeadline,
    KpiMonth,
    KpiTarget,
    Status,
    ReviewedBy,
    ReviewNote,
    ReviewedAt,
    LinkedTaskId,
    LinkedKpiId,
    SubmitterReadAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
