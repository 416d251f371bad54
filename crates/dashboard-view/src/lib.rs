//! # 看板视图模块
//!
//! 把会话状态映射为显示树，再由HTML序列化器输出标记。渲染函数都是状态的纯函数，
//! 不依赖任何具体的渲染技术。

pub mod content;
pub mod html;
pub mod paths;
pub mod renderer;
pub mod tree;

// 重新导出主要类型
pub use html::{render_document, to_html};
pub use renderer::{render_page, render_tab, render_target, TITLE};
pub use tree::{NodeKind, ViewNode};
