// src/error.rs

use sea_orm::DbErr;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),

    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Multiple validation errors")]
    ValidationErrors(Vec<String>),

    #[error("Failed to parse UUID: {0}")]
    UuidError(#[from] uuid::Error),

    #[error("Validation failed")]
    ValidationFailure(#[from] ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),
}

impl AppError {
    /// トランスポート層がHTTPステータス等にマッピングするための分類タグ
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::DbErr(_) => "database_error",
            AppError::NotFound(_) => "not_found",
            AppError::ValidationError(_) => "validation_error",
            AppError::ValidationErrors(_) => "validation_errors",
            AppError::UuidError(_) => "invalid_uuid",
            AppError::ValidationFailure(_) => "validation_errors",
            AppError::BadRequest(_) => "bad_request",
            AppError::Forbidden(_) => "forbidden",
            AppError::Conflict(_) => "conflict",
            AppError::InternalServerError(_) => "internal_server_error",
            AppError::ExternalServiceError(_) => "external_service_error",
        }
    }

    /// 呼び出し側へ返すレスポンス表現に変換する
    pub fn to_response(&self) -> ErrorResponse {
        match self {
            AppError::DbErr(db_err) => {
                // サーバーログには詳細を出し、クライアントには概要のみ返す
                tracing::error!(error = ?db_err, "Database error");
                ErrorResponse {
                    success: false,
                    error: "A database error occurred".to_string(),
                    message: "A database error occurred".to_string(),
                    validation_errors: None,
                    error_type: self.error_type().to_string(),
                }
            }
            AppError::ValidationErrors(errors) => {
                let mut field_errors = HashMap::new();
                for error in errors {
                    if let Some((field, message)) = error.split_once(": ") {
                        field_errors
                            .entry(field.to_string())
                            .or_insert_with(Vec::new)
                            .push(message.to_string());
                    }
                }
                ErrorResponse {
                    success: false,
                    error: "Validation failed".to_string(),
                    message: "Validation failed".to_string(),
                    validation_errors: Some(field_errors),
                    error_type: self.error_type().to_string(),
                }
            }
            AppError::ValidationFailure(errors) => {
                let field_errors: HashMap<String, Vec<String>> = errors
                    .field_errors()
                    .into_iter()
                    .map(|(field, errors)| {
                        let messages = errors
                            .iter()
                            .map(|e| {
                                e.message
                                    .as_ref()
                                    .map_or_else(|| "Invalid value".to_string(), |m| m.to_string())
                            })
                            .collect();
                        (field.to_string(), messages)
                    })
                    .collect();
                ErrorResponse {
                    success: false,
                    error: "Validation failed".to_string(),
                    message: "Validation failed".to_string(),
                    validation_errors: Some(field_errors),
                    error_type: self.error_type().to_string(),
                }
            }
            AppError::InternalServerError(message) => {
                tracing::error!(message = %message, "Internal server error");
                ErrorResponse {
                    success: false,
                    error: "An internal server error occurred".to_string(),
                    message: "An internal server error occurred".to_string(),
                    validation_errors: None,
                    error_type: self.error_type().to_string(),
                }
            }
            other => {
                let message = other.to_string();
                ErrorResponse {
                    success: false,
                    error: message.clone(),
                    message,
                    validation_errors: None,
                    error_type: other.error_type().to_string(),
                }
            }
        }
    }
}

// Result 型のエイリアス
pub type AppResult<T> = Result<T, AppError>;

/// 統一的なエラーレスポンス構造
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<HashMap<String, Vec<String>>>,
    pub error_type: String,
}
