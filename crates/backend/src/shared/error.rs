use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Ошибки операций с коллекциями и хранилищем файлов
#[derive(Debug, Error)]
pub enum AppError {
    /// Хранилище недоступно, отклонило операцию или запрос некорректен
    #[error("Data access error: {0}")]
    DataAccess(String),

    #[error("{collection}/{id} not found")]
    NotFound { collection: String, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),
}

impl AppError {
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        AppError::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::DataAccess(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(e: sea_orm::DbErr) -> Self {
        AppError::DataAccess(e.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::DataAccess(format!("storage: {}", e))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::DataAccess(format!("serialization: {}", e))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            AppError::DataAccess(_) => tracing::error!("{}", self),
            _ => tracing::warn!("{}", self),
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::DataAccess("down".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::not_found("players", "42").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Validation("title".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_not_found_message_names_the_record() {
        let err = AppError::not_found("teams", "abc");
        assert_eq!(err.to_string(), "teams/abc not found");
    }
}
