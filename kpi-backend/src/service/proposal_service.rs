// src/service/proposal_service.rs

//! 提案ワークフロー
//!
//! 従業員が提出するタスク／KPIの新設提案を扱う。審査は
//! `Pending → {Approved, Rejected}` の一方向・一回限りの遷移で、
//! 審査済みの提案を再度審査しようとするとConflictになる。

use crate::api::dto::proposal_dto::{CreateProposalDto, DecideProposalDto, ProposalDto};
use crate::db::DbPool;
use crate::domain::audit_log_model::{AuditAction, AuditEntityType};
use crate::domain::permission::Principal;
use crate::domain::priority::Priority;
use crate::domain::proposal_model::{self, ProposalKind};
use crate::domain::proposal_status::ProposalStatus;
use crate::error::AppResult;
use crate::log_with_context;
use crate::repository::proposal_repository::ProposalRepository;
use crate::service::audit_log_service::{AuditLogService, LogActionParams};
use crate::service::notification_service::Notifier;
use crate::utils::error_helper::{
    conflict_error, convert_validation_errors, forbidden_error, not_found_error, validation_error,
};
use crate::utils::transaction::TransactionManager;
use chrono::Utc;
use sea_orm::{ActiveModelBehavior, Set};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub struct ProposalService {
    db: DbPool,
    notifier: Arc<dyn Notifier>,
}

impl ProposalService {
    pub fn new(db: DbPool, notifier: Arc<dyn Notifier>) -> Self {
        Self { db, notifier }
    }

    /// 提案を提出する。種別ごとの必須フィールドをここで検証する。
    pub async fn submit(
        &self,
        principal: &Principal,
        payload: CreateProposalDto,
    ) -> AppResult<ProposalDto> {
        payload
            .validate()
            .map_err(|e| convert_validation_errors(e, "proposal_service::submit"))?;

        let kind = ProposalKind::from_str(&payload.kind)
            .ok_or_else(|| validation_error("kind", "must be either 'task' or 'kpi'"))?;

        match kind {
            ProposalKind::Task => {
                if let Some(priority) = payload.priority.as_deref() {
                    Priority::from_str(priority).ok_or_else(|| {
                        validation_error(
                            "priority",
                            "must be one of 'urgent', 'high', 'medium', 'low'",
                        )
                    })?;
                }
            }
            ProposalKind::Kpi => {
                if payload.kpi_month.is_none() {
                    return Err(validation_error(
                        "kpi_month",
                        "required for kpi proposals",
                    ));
                }
                if payload.kpi_target.is_none() {
                    return Err(validation_error(
                        "kpi_target",
                        "required for kpi proposals",
                    ));
                }
            }
        }

        let principal = principal.clone();
        let dto = self
            .db
            .execute_in_transaction(move |txn| {
                Box::pin(async move {
                    let mut active = proposal_model::ActiveModel::new();
                    active.submitted_by = Set(principal.id);
                    active.kind = Set(kind.as_str().to_string());
                    active.title = Set(payload.title.clone());
                    active.description = Set(payload.description.clone());
                    active.priority = Set(payload.priority.clone());
                    active.expected_deadline = Set(payload.expected_deadline);
                    active.kpi_month = Set(payload.kpi_month.clone());
                    active.kpi_target = Set(payload.kpi_target);
                    active.status = Set(ProposalStatus::Pending.as_str().to_string());
                    active.reviewed_by = Set(None);
                    active.review_note = Set(None);
                    active.reviewed_at = Set(None);
                    active.linked_task_id = Set(None);
                    active.linked_kpi_id = Set(None);
                    active.submitter_read_at = Set(None);
                    let proposal = ProposalRepository::create(txn, active).await?;

                    AuditLogService::log_action_in(
                        txn,
                        &principal,
                        LogActionParams {
                            entity_type: AuditEntityType::Proposal,
                            entity_id: proposal.id,
                            entity_label: proposal.title.clone(),
                            action: AuditAction::ProposalSubmitted,
                            details: Some(serde_json::json!({
                                "kind": proposal.kind,
                            })),
                        },
                    )
                    .await?;

                    Ok(ProposalDto::from(proposal))
                })
            })
            .await?;

        log_with_context!(
            tracing::Level::INFO,
            "Proposal submitted",
            "proposal_id" => dto.id,
            "kind" => dto.kind
        );

        Ok(dto)
    }

    /// 提案を審査する（マネージャー限定・一回限り）
    ///
    /// 審査済みの提案はConflict。タスク提案にKPIリンク、KPI提案に
    /// タスクリンクを付けることはできない。審査と同時に提出者の
    /// 確認マーカーをクリアし、結果の再確認を強制する。
    pub async fn decide(
        &self,
        principal: &Principal,
        proposal_id: Uuid,
        payload: DecideProposalDto,
    ) -> AppResult<ProposalDto> {
        principal.require_manager("proposal_service::decide")?;
        payload
            .validate()
            .map_err(|e| convert_validation_errors(e, "proposal_service::decide"))?;

        let outcome = ProposalStatus::from_str(&payload.outcome).ok_or_else(|| {
            validation_error("outcome", "must be either 'approved' or 'rejected'")
        })?;
        if !ProposalStatus::Pending.can_transition_to(outcome) {
            return Err(validation_error(
                "outcome",
                "must be either 'approved' or 'rejected'",
            ));
        }

        let principal_c = principal.clone();
        let decided = self
            .db
            .execute_in_transaction(move |txn| {
                Box::pin(async move {
                    let proposal = ProposalRepository::find_by_id(txn, proposal_id)
                        .await?
                        .ok_or_else(|| {
                            not_found_error(
                                "Proposal",
                                &proposal_id.to_string(),
                                "proposal_service::decide",
                            )
                        })?;

                    if !proposal.proposal_status().can_transition_to(outcome) {
                        return Err(conflict_error(
                            "Proposal has already been processed",
                            "proposal_service::decide",
                        ));
                    }

                    match proposal.proposal_kind() {
                        ProposalKind::Task => {
                            if payload.linked_kpi_id.is_some() {
                                return Err(validation_error(
                                    "linked_kpi_id",
                                    "cannot link a KPI to a task proposal",
                                ));
                            }
                        }
                        ProposalKind::Kpi => {
                            if payload.linked_task_id.is_some() {
                                return Err(validation_error(
                                    "linked_task_id",
                                    "cannot link a task to a kpi proposal",
                                ));
                            }
                        }
                    }

                    let mut active: proposal_model::ActiveModel = proposal.into();
                    active.status = Set(outcome.as_str().to_string());
                    active.reviewed_by = Set(Some(principal_c.id));
                    active.review_note = Set(payload.note.clone());
                    active.reviewed_at = Set(Some(Utc::now()));
                    active.linked_task_id = Set(payload.linked_task_id);
                    active.linked_kpi_id = Set(payload.linked_kpi_id);
                    // 審査結果の再確認を強制する
                    active.submitter_read_at = Set(None);
                    let proposal = ProposalRepository::update(txn, active).await?;

                    let action = match outcome {
                        ProposalStatus::Approved => AuditAction::ProposalApproved,
                        _ => AuditAction::ProposalRejected,
                    };
                    AuditLogService::log_action_in(
                        txn,
                        &principal_c,
                        LogActionParams {
                            entity_type: AuditEntityType::Proposal,
                            entity_id: proposal.id,
                            entity_label: proposal.title.clone(),
                            action,
                            details: Some(serde_json::json!({
                                "outcome": proposal.status,
                                "note": proposal.review_note,
                            })),
                        },
                    )
                    .await?;

                    Ok(proposal)
                })
            })
            .await?;

        // 提出者への通知はコミット後。失敗しても審査結果は確定済み。
        let subject = format!("Your proposal '{}' was {}", decided.title, decided.status);
        let body = decided
            .review_note
            .clone()
            .unwrap_or_else(|| "No review note was provided.".to_string());
        if let Err(e) = self
            .notifier
            .notify_user(decided.submitted_by, &subject, &body)
            .await
        {
            log_with_context!(
                tracing::Level::WARN,
                "Failed to deliver proposal decision notification",
                "proposal_id" => decided.id,
                "submitter_id" => decided.submitted_by,
                "error" => e
            );
        }

        log_with_context!(
            tracing::Level::INFO,
            "Proposal decided",
            "proposal_id" => decided.id,
            "outcome" => decided.status
        );

        Ok(ProposalDto::from(decided))
    }

    /// 提出者による審査結果の確認。確認済みなら何もしない。
    pub async fn mark_read(
        &self,
        principal: &Principal,
        proposal_id: Uuid,
    ) -> AppResult<ProposalDto> {
        let proposal = ProposalRepository::find_by_id(&self.db, proposal_id)
            .await?
            .ok_or_else(|| {
                not_found_error(
                    "Proposal",
                    &proposal_id.to_string(),
                    "proposal_service::mark_read",
                )
            })?;

        if proposal.submitted_by != principal.id {
            return Err(forbidden_error(
                "Only the submitter can mark a proposal as read",
                "proposal_service::mark_read",
                Some(&principal.id.to_string()),
            ));
        }

        if proposal.submitter_read_at.is_some() {
            return Ok(ProposalDto::from(proposal));
        }

        let mut active: proposal_model::ActiveModel = proposal.into();
        active.submitter_read_at = Set(Some(Utc::now()));
        let updated = ProposalRepository::update(&self.db, active).await?;
        Ok(ProposalDto::from(updated))
    }

    /// 審査待ちの提案を提出順で返す（審査画面用）
    pub async fn list_pending(&self, principal: &Principal) -> AppResult<Vec<ProposalDto>> {
        principal.require_manager("proposal_service::list_pending")?;
        let proposals = ProposalRepository::find_pending(&self.db).await?;
        Ok(proposals.into_iter().map(ProposalDto::from).collect())
    }

    /// 自分が提出した提案の一覧（新しい順）
    pub async fn list_own(&self, principal: &Principal) -> AppResult<Vec<ProposalDto>> {
        let proposals = ProposalRepository::find_by_submitter(&self.db, principal.id).await?;
        Ok(proposals.into_iter().map(ProposalDto::from).collect())
    }
}
