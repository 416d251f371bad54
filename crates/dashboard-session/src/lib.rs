//! # 看板会话模块
//!
//! 每个浏览器连接拥有一份独立的会话状态，包括：
//! - 筛选状态：三个互相独立的精确匹配筛选器
//! - 更新规则：切换标签页、修改筛选、点击按钮、编辑报告
//! - 会话存储：按会话ID保存状态，同一会话内的交互串行执行

pub mod filter;
pub mod rules;
pub mod state;
pub mod store;

// 重新导出主要类型
pub use filter::{filter_options, FilterOptions, FilterSelection, FilterState, PatientQuery};
pub use rules::{ActionButton, ActiveTab, Interaction, RenderTarget, StateSlice, UpdateRule};
pub use state::{RuleOutcome, SessionSnapshot, SessionState, DEFAULT_REPORT_TEXT};
pub use store::{InMemorySessionStore, SessionSettings, SessionStore, SharedSession};
