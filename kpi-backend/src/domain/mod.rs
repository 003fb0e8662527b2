// src/domain/mod.rs
pub mod audit_log_model;
pub mod kpi_model;
pub mod kpi_subtask_model;
pub mod permission;
pub mod priority;
pub mod progress;
pub mod proposal_model;
pub mod proposal_status;
pub mod task_assignment_model;
pub mod task_model;
pub mod task_status;
pub mod user_model;
