//! 统一错误处理

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::{ActionState, FieldErrors};
use crate::service::ProviderError;

pub const MSG_UPDATE_MISSING_FIELDS: &str = "Missing fields. Failed to update invoice.";

/// Action 层向上传播的错误
#[derive(Debug, Error)]
pub enum ActionError {
    /// 表单校验失败 (update 路径经 `?` 传播)
    #[error("validation failed on {} field(s)", .0.fields().count())]
    Validation(FieldErrors),
}

/// HTTP 层错误边界
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Action(#[from] ActionError),

    /// 认证提供方的非认证类错误 (存储/哈希等)
    #[error("sign-in provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("database error: {0}")]
    Database(#[from] RepositoryError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Action(ActionError::Validation(errors)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ActionState::invalid(errors, MSG_UPDATE_MISSING_FIELDS)),
            )
                .into_response(),
            other => {
                tracing::error!(error = %other, "request failed");
                // 不向客户端暴露内部错误细节
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
