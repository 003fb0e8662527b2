// src/repository/mod.rs
pub mod audit_log_repository;
pub mod kpi_repository;
pub mod kpi_subtask_repository;
pub mod proposal_repository;
pub mod task_assignment_repository;
pub mod task_repository;
pub mod user_repository;
