// src/service/audit_log_service.rs
use crate::db::DbPool;
use crate::domain::audit_log_model::{self, AuditAction, AuditEntityType, AuditLogBuilder};
use crate::domain::permission::Principal;
use crate::error::AppResult;
use crate::log_with_context;
use crate::repository::audit_log_repository::AuditLogRepository;
use crate::utils::error_helper::internal_server_error;
use sea_orm::ConnectionTrait;
use uuid::Uuid;

// 監査ログ記録のためのパラメータ構造体
pub struct LogActionParams {
    pub entity_type: AuditEntityType,
    pub entity_id: Uuid,
    pub entity_label: String,
    pub action: AuditAction,
    pub details: Option<serde_json::Value>,
}

pub struct AuditLogService {
    db: DbPool,
}

impl AuditLogService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// 監査ログを記録（他サービスのトランザクション内からも呼ばれる）
    pub async fn log_action_in<C: ConnectionTrait>(
        db: &C,
        actor: &Principal,
        params: LogActionParams,
    ) -> AppResult<audit_log_model::Model> {
        let action_str = params.action.as_str().to_string();

        log_with_context!(
            tracing::Level::DEBUG,
            "Recording audit log",
            "actor_id" => actor.id,
            "action" => &action_str,
            "entity_type" => params.entity_type.as_str(),
            "entity_id" => params.entity_id
        );

        let mut builder = AuditLogBuilder::new(
            params.entity_type,
            params.entity_id,
            params.entity_label,
            params.action,
            actor,
        );
        if let Some(details) = params.details {
            builder = builder.details(details);
        }

        let entry = AuditLogRepository::create(db, builder.build())
            .await
            .map_err(|e| {
                internal_server_error(
                    e,
                    "audit_log_service::log_action_in",
                    "Failed to create audit log",
                )
            })?;

        log_with_context!(
            tracing::Level::INFO,
            "Audit log recorded",
            "actor_id" => actor.id,
            "action" => &action_str
        );

        Ok(entry)
    }

    /// 特定エンティティの監査履歴（レビュー画面用）
    pub async fn list_for_entity(
        &self,
        entity_type: AuditEntityType,
        entity_id: Uuid,
    ) -> AppResult<Vec<audit_log_model::Model>> {
        let entries =
            AuditLogRepository::find_by_entity(&self.db, entity_type.as_str(), entity_id).await?;
        Ok(entries)
    }

    /// 直近の監査ログ
    pub async fn list_recent(&self, limit: u64) -> AppResult<Vec<audit_log_model::Model>> {
        let entries = AuditLogRepository::find_recent(&self.db, limit).await?;
        Ok(entries)
    }
}
