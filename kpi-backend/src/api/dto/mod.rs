// src/api/dto/mod.rs
pub mod kpi_dto;
pub mod proposal_dto;
pub mod report_dto;
pub mod task_dto;
