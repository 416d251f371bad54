//! 错误定义模块

use thiserror::Error;

/// 看板系统统一错误类型
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("验证错误: {0}")]
    Validation(String),

    #[error("无效的选择值: {field} = {value}")]
    InvalidSelection { field: String, value: String },

    #[error("数据不变量被破坏: {0}")]
    InvariantViolation(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("系统内部错误: {0}")]
    Internal(String),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DashboardError {
    pub fn invalid_selection(field: &str, value: &str) -> Self {
        Self::InvalidSelection {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

/// 看板系统统一结果类型
pub type Result<T> = std::result::Result<T, DashboardError>;
