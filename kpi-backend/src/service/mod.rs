// src/service/mod.rs
pub mod assignment_service;
pub mod audit_log_service;
pub mod kpi_service;
pub mod notification_service;
pub mod proposal_service;
pub mod reassignment_service;
pub mod report_service;
pub mod task_service;
