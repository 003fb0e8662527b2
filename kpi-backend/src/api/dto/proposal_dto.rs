// src/api/dto/proposal_dto.rs
use crate::domain::proposal_model;
use crate::utils::validation::common;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// --- Request DTOs ---

#[derive(Deserialize, Serialize, Debug, Validate)]
pub struct CreateProposalDto {
    /// task / kpi
    pub kind: String,

    #[validate(
        length(
            min = common::TITLE_MIN_LENGTH,
            max = common::TITLE_MAX_LENGTH,
            message = "Proposal title must be between 1 and 200 characters"
        ),
        custom(function = crate::utils::validation::validate_not_blank)
    )]
    pub title: String,

    #[validate(length(
        max = common::NOTE_MAX_LENGTH,
        message = "Proposal description must not exceed 2000 characters"
    ))]
    pub description: Option<String>,

    // タスク提案用
    pub priority: Option<String>,
    pub expected_deadline: Option<NaiveDate>,

    // KPI提案用
    #[validate(custom(
        function = crate::utils::validation::validate_month_token,
        message = "KPI month must be in YYYY-MM format"
    ))]
    pub kpi_month: Option<String>,

    #[validate(range(min = 0, message = "KPI target must not be negative"))]
    pub kpi_target: Option<i32>,
}

#[derive(Deserialize, Serialize, Debug, Validate)]
pub struct DecideProposalDto {
    /// approved / rejected
    pub outcome: String,

    #[validate(length(
        max = common::NOTE_MAX_LENGTH,
        message = "Review note must not exceed 2000 characters"
    ))]
    pub note: Option<String>,

    /// 承認によって作成されたタスクへのリンク（タスク提案のみ）
    pub linked_task_id: Option<Uuid>,
    /// 承認によって作成されたKPIへのリンク（KPI提案のみ）
    pub linked_kpi_id: Option<Uuid>,
}

// --- Response DTOs ---

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProposalDto {
    pub id: Uuid,
    pub submitted_by: Uuid,
    pub kind: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub expected_deadline: Option<NaiveDate>,
    pub kpi_month: Option<String>,
    pub kpi_target: Option<i32>,
    pub status: String,
    pub reviewed_by: Option<Uuid>,
    pub review_note: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub linked_task_id: Option<Uuid>,
    pub linked_kpi_id: Option<Uuid>,
    pub submitter_read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<proposal_model::Model> for ProposalDto {
    fn from(model: proposal_model::Model) -> Self {
        Self {
            id: model.id,
            submitted_by: model.submitted_by,
            kind: model.kind,
            title: model.title,
            description: model.description,
            priority: model.priority,
            expected_deadline: model.expected_deadline,
            kpi_month: model.kpi_month,
            kpi_target: model.kpi_target,
            status: model.status,
            reviewed_by: model.reviewed_by,
            review_note: model.review_note,
            reviewed_at: model.reviewed_at,
            linked_task_id: model.linked_task_id,
            linked_kpi_id: model.linked_kpi_id,
            submitter_read_at: model.submitter_read_at,
            created_at: model.created_at,
        }
    }
}
