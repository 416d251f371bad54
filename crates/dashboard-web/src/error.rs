//! HTTP错误映射

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use dashboard_core::DashboardError;
use serde_json::json;
use tracing::{error, warn};

/// 包装 [`DashboardError`]，映射为JSON错误响应
#[derive(Debug)]
pub struct ApiError(pub DashboardError);

/// 处理器结果类型
pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DashboardError::Validation(_) | DashboardError::InvalidSelection { .. } => {
                StatusCode::BAD_REQUEST
            }
            DashboardError::NotFound(_) => StatusCode::NOT_FOUND,
            DashboardError::Config(_)
            | DashboardError::InvariantViolation(_)
            | DashboardError::Internal(_)
            | DashboardError::Io(_)
            | DashboardError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.0.to_string();

        if status.is_server_error() {
            error!("Request failed: {}", message);
        } else {
            warn!("Request rejected: {}", message);
        }

        let body = Json(json!({
            "error": true,
            "message": message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}
