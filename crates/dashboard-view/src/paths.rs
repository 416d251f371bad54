//! 表单提交地址

pub const PAGE: &str = "/";
pub const TAB: &str = "/tab";
pub const FILTERS: &str = "/filters";
pub const REPORT: &str = "/report";
pub const ACTIONS: &str = "/actions";
pub const STYLESHEET: &str = "/static/dashboard.css";

/// 按钮动作的提交地址，如 `/actions/run-ai-analysis`
pub fn action(dom_id: &str) -> String {
    format!("{}/{}", ACTIONS, dom_id)
}
