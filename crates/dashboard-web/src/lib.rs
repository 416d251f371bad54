//! # 看板Web模块
//!
//! 基于axum的HTTP服务：
//! - 页面与片段：整页HTML以及按更新规则重新渲染的子树
//! - 交互表单：标签页、筛选、动作按钮、报告编辑，处理后303重定向回页面
//! - JSON接口：患者查询、指标、工作流、会话快照与显示树

pub mod assets;
pub mod error;
pub mod handlers;
pub mod server;
pub mod session;

// 重新导出主要类型
pub use error::{ApiError, ApiResult};
pub use server::{create_app, AppState, WebServer};
