//! 核心错误处理模块

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::core::middleware::current_request_id;
use crate::infrastructure::json_storage::StorageError;

/// 核心错误类型
#[derive(Debug)]
pub enum CoreError {
    BadRequest(String),
    NotFound(String),
    InternalServerError(String),
}

/// 错误响应结构
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: u16,
    pub timestamp: String,
    pub request_id: String,
}

impl CoreError {
    pub fn status(&self) -> StatusCode {
        match self {
            CoreError::BadRequest(_) => StatusCode::BAD_REQUEST,
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_message, user_message) = match self {
            CoreError::BadRequest(msg) => ("BAD_REQUEST", msg),
            CoreError::NotFound(msg) => ("NOT_FOUND", msg),
            CoreError::InternalServerError(msg) => ("INTERNAL_SERVER_ERROR", msg),
        };

        let error_response = ErrorResponse {
            error: error_message.to_string(),
            message: user_message,
            code: status.as_u16(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            request_id: current_request_id().unwrap_or_else(|| Uuid::new_v4().to_string()),
        };

        (status, axum::Json(error_response)).into_response()
    }
}

impl From<StorageError> for CoreError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(id) => CoreError::NotFound(format!("产品 {} 不存在", id)),
            other => {
                error!("存储错误: {}", other);
                CoreError::InternalServerError("存储操作失败，请稍后重试".to_string())
            }
        }
    }
}

impl From<JsonRejection> for CoreError {
    fn from(rejection: JsonRejection) -> Self {
        CoreError::BadRequest(format!("无效的请求体: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for CoreError {
    fn from(_: PathRejection) -> Self {
        CoreError::BadRequest("无效的产品 ID".to_string())
    }
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = err
            .field_errors()
            .into_iter()
            .flat_map(|(_, errors)| {
                errors.iter().map(|error| {
                    error
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| "参数校验失败".to_string())
                })
            })
            .collect();
        messages.sort();

        CoreError::BadRequest(messages.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_storage_error_mapping() {
        let not_found: CoreError = StorageError::NotFound(3).into();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let persistence: CoreError = StorageError::Persistence {
            path: PathBuf::from("products.json"),
            source: io::Error::other("disk full"),
        }
        .into();
        assert_eq!(persistence.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // 内部错误细节不暴露给客户端
        match persistence {
            CoreError::InternalServerError(msg) => assert!(!msg.contains("disk full")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_error_response_status() {
        let response = CoreError::BadRequest("bad".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
