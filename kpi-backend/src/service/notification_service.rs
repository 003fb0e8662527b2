// src/service/notification_service.rs

//! 通知配信の境界
//!
//! 実際の配信（メール・プッシュ等）は外部コラボレーターの責務。
//! コアは `Notifier` トレイト越しに依頼するだけで、配信失敗が
//! コミット済みの書き込みを巻き戻すことはない。

use crate::error::AppResult;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_user(&self, user_id: Uuid, subject: &str, body: &str) -> AppResult<()>;
}

/// ログ出力のみ行うデフォルト実装（テスト・スタンドアロン実行用）
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn notify_user(&self, user_id: Uuid, subject: &str, body: &str) -> AppResult<()> {
        tracing::info!(
            user_id = %user_id,
            subject = %subject,
            body = %body,
            "Notification dispatched"
        );
        Ok(())
    }
}
