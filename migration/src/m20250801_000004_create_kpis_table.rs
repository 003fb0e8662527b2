use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Kpis::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Kpis::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Kpis::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Kpis::PeriodStart).date().not_null())
                    .col(ColumnDef::new(Kpis::PeriodEnd).date().not_null())
                    .col(ColumnDef::new(Kpis::Name).string().not_null())
                    .col(ColumnDef::new(Kpis::Note).text())
                    .col(
                        // 以下3カラムは再計算で維持される導出値（手動更新しない）
                        ColumnDef::new(Kpis::TargetProgress)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Kpis::ActualProgress)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Kpis::Percent)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Kpis::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Kpis::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_kpis_owner_id")
                            .from(Kpis::Table, Kpis::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Kpis::Table).to_owned())
            .await
    }
}

/// Iden Enum for the 'kpis' table and its columns
#[derive(DeriveIden)]
enum Kpis {
    Table,
    Id,
    OwnerId,
    PeriodStart,
    PeriodEnd,
    Name,
    Note,
    TargetProgress,
    ActualProgress,
    Percent,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
