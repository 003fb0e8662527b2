// migration/src/lib.rs
pub use sea_orm_migration::prelude::*;

// 基本テーブル
mod m20250801_000001_create_users_table;
mod m20250801_000002_create_tasks_table;
mod m20250801_000003_create_task_assignments_table;

// KPI関連テーブル
mod m20250801_000004_create_kpis_table;
mod m20250801_000005_create_kpi_subtasks_table;

// ワークフロー・監査関連テーブル
mod m20250801_000006_create_proposals_table;
mod m20250801_000007_create_audit_logs_table;

// インデックス
mod m20250801_000008_add_rollup_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            // 1. 依存関係のないテーブルから作成
            Box::new(m20250801_000001_create_users_table::Migration),
            // 2. usersに依存するテーブル
            Box::new(m20250801_000002_create_tasks_table::Migration),
            Box::new(m20250801_000004_create_kpis_table::Migration),
            // 3. tasks / kpis に依存するテーブル
            Box::new(m20250801_000003_create_task_assignments_table::Migration),
            Box::new(m20250801_000005_create_kpi_subtasks_table::Migration),
            Box::new(m20250801_000006_create_proposals_table::Migration),
            Box::new(m20250801_000007_create_audit_logs_table::Migration),
            // 4. 一意制約・検索用インデックス
            Box::new(m20250801_000008_add_rollup_indexes::Migration),
        ]
    }
}
