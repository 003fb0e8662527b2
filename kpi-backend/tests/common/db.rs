// tests/common/db.rs

//! インメモリSQLite上に実スキーマを構築するテスト用データベース

use migration::Migrator;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

pub struct TestDatabase {
    pub connection: DatabaseConnection,
}

impl TestDatabase {
    pub async fn new() -> Self {
        // 接続ごとに独立したインメモリデータベースになるため、
        // 並列テストでも衝突しない
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1).sqlx_logging(false);

        let connection = Database::connect(opt).await.expect("connect sqlite");

        // 本番と同じマイグレーションでスキーマを構築する
        Migrator::up(&connection, None).await.expect("run migrations");

        Self { connection }
    }
}
