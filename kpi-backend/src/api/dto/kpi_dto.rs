// src/api/dto/kpi_dto.rs
use crate::domain::kpi_model;
use crate::domain::kpi_subtask_model;
use crate::utils::validation::common;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// --- Request DTOs ---

#[derive(Deserialize, Serialize, Debug, Validate)]
pub struct CreateKpiSubtaskDto {
    #[validate(
        length(
            min = common::TITLE_MIN_LENGTH,
            max = common::TITLE_MAX_LENGTH,
            message = "Subtask title must be between 1 and 200 characters"
        ),
        custom(function = crate::utils::validation::validate_not_blank)
    )]
    pub title: String,

    #[validate(range(min = 0, message = "Subtask target must not be negative"))]
    pub target: i32,
}

#[derive(Deserialize, Serialize, Debug, Validate)]
pub struct CreateKpiDto {
    pub owner_id: Uuid,

    /// 対象月（YYYY-MM）
    #[validate(custom(
        function = crate::utils::validation::validate_month_token,
        message = "Month must be in YYYY-MM format"
    ))]
    pub month: String,

    #[validate(length(
        min = common::TITLE_MIN_LENGTH,
        max = common::TITLE_MAX_LENGTH,
        message = "KPI name must be between 1 and 200 characters"
    ))]
    pub name: String,

    #[validate(length(
        max = common::NOTE_MAX_LENGTH,
        message = "KPI note must not exceed 2000 characters"
    ))]
    pub note: Option<String>,

    #[validate(nested)]
    pub subtasks: Vec<CreateKpiSubtaskDto>,
}

#[derive(Deserialize, Serialize, Debug, Validate)]
pub struct ReassignKpiDto {
    pub new_owner_id: Uuid,

    #[validate(length(
        max = common::NOTE_MAX_LENGTH,
        message = "Note must not exceed 2000 characters"
    ))]
    pub note: Option<String>,
}

// --- Response DTOs ---

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct KpiSubtaskDto {
    pub title: String,
    pub target: i32,
}

impl From<kpi_subtask_model::Model> for KpiSubtaskDto {
    fn from(model: kpi_subtask_model::Model) -> Self {
        Self {
            title: model.title,
            target: model.target,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct KpiDto {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub name: String,
    pub note: Option<String>,
    pub target_progress: i32,
    pub actual_progress: i32,
    pub percent: i32,
    pub subtasks: Vec<KpiSubtaskDto>,
}

impl KpiDto {
    pub fn from_parts(
        kpi: kpi_model::Model,
        subtasks: Vec<kpi_subtask_model::Model>,
    ) -> Self {
        Self {
            id: kpi.id,
            owner_id: kpi.owner_id,
            period_start: kpi.period_start,
            period_end: kpi.period_end,
            name: kpi.name,
            note: kpi.note,
            target_progress: kpi.target_progress,
            actual_progress: kpi.actual_progress,
            percent: kpi.percent,
            subtasks: subtasks.into_iter().map(KpiSubtaskDto::from).collect(),
        }
    }
}
