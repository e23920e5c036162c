//! HTTP Error Handling
//!
//! 业务错误统一以 HTTP 200 + errno 返回。

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::{ApplicationError, RepositoryError};

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: i32,
    pub error: String,
    pub data: Option<()>,
}

impl ErrorResponse {
    pub fn new(errno: i32, error: impl Into<String>) -> Self {
        Self {
            errno,
            error: error.into(),
            data: None,
        }
    }
}

/// 错误码定义
pub mod errno {
    pub const BAD_REQUEST: i32 = 400;
    pub const NOT_FOUND: i32 = 404;
    pub const CONFLICT: i32 = 409;
    pub const UNPROCESSABLE: i32 = 422;
    pub const INTERNAL_ERROR: i32 = 500;
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Unprocessable(String),
    Internal(String),
}

impl ApiError {
    pub fn errno(&self) -> i32 {
        match self {
            ApiError::NotFound(_) => errno::NOT_FOUND,
            ApiError::BadRequest(_) => errno::BAD_REQUEST,
            ApiError::Conflict(_) => errno::CONFLICT,
            ApiError::Unprocessable(_) => errno::UNPROCESSABLE,
            ApiError::Internal(_) => errno::INTERNAL_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::Unprocessable(msg)
            | ApiError::Internal(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let errno = self.errno();
        let msg = self.message();

        match &self {
            ApiError::NotFound(_) => {
                tracing::warn!(errno, error = %msg, "Resource not found")
            }
            ApiError::BadRequest(_) => tracing::warn!(errno, error = %msg, "Bad request"),
            ApiError::Conflict(_) => tracing::warn!(errno, error = %msg, "Resource conflict"),
            ApiError::Unprocessable(_) => {
                tracing::warn!(errno, error = %msg, "Unprocessable document")
            }
            ApiError::Internal(_) => {
                tracing::error!(errno, error = %msg, "Internal server error")
            }
        }

        let body = ErrorResponse::new(errno, msg);
        (StatusCode::OK, Json(body)).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound(msg) => ApiError::NotFound(msg),
            RepositoryError::Duplicate(msg) => ApiError::Conflict(msg),
            _ => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::NotFound { resource_type, id } => {
                ApiError::NotFound(format!("{} not found: {}", resource_type, id))
            }
            ApplicationError::ValidationError(msg) => ApiError::BadRequest(msg),
            ApplicationError::Conflict(msg) => ApiError::Conflict(msg),
            ApplicationError::Unprocessable(msg) => ApiError::Unprocessable(msg),
            ApplicationError::RepositoryError(msg) => ApiError::Internal(msg),
            ApplicationError::InternalError(msg) => ApiError::Internal(msg),
        }
    }
}
