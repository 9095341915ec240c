use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: Uuid },
    #[error("{0}")]
    BadRequest(String),
    #[error("Missing or invalid API key")]
    Unauthorized,
    #[error("Rate limiter unavailable")]
    ServiceUnavailable,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Internal(String),
}

/// 统一错误响应体
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub timestamp: String,
    pub status: u16,
    pub error: String,
    pub message: String,
    pub path: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: message.into(),
            path: path.into(),
        }
    }

    /// 限流拒绝响应体（timestamp 留空）
    pub fn rate_limited(path: impl Into<String>) -> Self {
        Self {
            timestamp: String::new(),
            status: StatusCode::TOO_MANY_REQUESTS.as_u16(),
            error: "Too Many Requests".to_string(),
            message: "Rate limit exceeded".to_string(),
            path: path.into(),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Internal(_) => "An unexpected error occurred".into(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        // the error-logging stage fills in the path from the request URI
        let body = ErrorResponse::new(status, self.public_message(), "");
        let mut response = (status, Json(body.clone())).into_response();
        response.extensions_mut().insert(body);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_details_are_not_exposed() {
        let err = AppError::Internal("pool exhausted".into());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "An unexpected error occurred");
    }

    #[test]
    fn not_found_names_the_resource() {
        let id = Uuid::nil();
        let err = AppError::NotFound { resource: "Session", id };
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.public_message(), format!("Session not found: {id}"));
    }

    #[test]
    fn rate_limited_body_has_the_fixed_shape() {
        let body = serde_json::to_value(ErrorResponse::rate_limited("/api/v1/sessions")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "timestamp": "",
                "status": 429,
                "error": "Too Many Requests",
                "message": "Rate limit exceeded",
                "path": "/api/v1/sessions"
            })
        );
    }
}
