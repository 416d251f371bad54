//! 响应式更新规则
//!
//! 看板唯一的动态行为。每条规则声明自己读取的输入切片、写入的输出切片，
//! 以及需要重新渲染的子树。各规则的输出切片互不相交，因此规则之间没有隐藏的顺序依赖。

use crate::filter::FilterState;
use dashboard_core::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 当前标签页
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ActiveTab {
    #[default]
    Overview,
    Patients,
    Workflow,
    Reports,
}

impl ActiveTab {
    pub const ALL: [ActiveTab; 4] = [
        ActiveTab::Overview,
        ActiveTab::Patients,
        ActiveTab::Workflow,
        ActiveTab::Reports,
    ];

    /// 表单与URL中使用的取值
    pub fn value(&self) -> &'static str {
        match self {
            ActiveTab::Overview => "overview",
            ActiveTab::Patients => "patients",
            ActiveTab::Workflow => "workflow",
            ActiveTab::Reports => "reports",
        }
    }

    /// DOM中的元素ID
    pub fn dom_id(&self) -> &'static str {
        match self {
            ActiveTab::Overview => "tab-overview",
            ActiveTab::Patients => "tab-patients",
            ActiveTab::Workflow => "tab-workflow",
            ActiveTab::Reports => "tab-reports",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActiveTab::Overview => "Dashboard Overview",
            ActiveTab::Patients => "Patient Management",
            ActiveTab::Workflow => "Workflow Analysis",
            ActiveTab::Reports => "AI Reports",
        }
    }
}

impl FromStr for ActiveTab {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim();
        ActiveTab::ALL
            .into_iter()
            .find(|tab| {
                value.eq_ignore_ascii_case(tab.value()) || value.eq_ignore_ascii_case(tab.dom_id())
            })
            .ok_or_else(|| DashboardError::invalid_selection("tab", s))
    }
}

impl fmt::Display for ActiveTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

/// 刷新"最后更新"时间的按钮
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ActionButton {
    RunAiAnalysis,
    GenerateReports,
}

impl ActionButton {
    pub const ALL: [ActionButton; 2] = [ActionButton::RunAiAnalysis, ActionButton::GenerateReports];

    pub fn dom_id(&self) -> &'static str {
        match self {
            ActionButton::RunAiAnalysis => "run-ai-analysis",
            ActionButton::GenerateReports => "generate-reports",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActionButton::RunAiAnalysis => "Run AI Analysis",
            ActionButton::GenerateReports => "Generate Reports",
        }
    }
}

impl FromStr for ActionButton {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        ActionButton::ALL
            .into_iter()
            .find(|button| s.trim().eq_ignore_ascii_case(button.dom_id()))
            .ok_or_else(|| DashboardError::invalid_selection("action", s))
    }
}

/// 用户交互事件
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    SelectTab(ActiveTab),
    ChangeFilters(FilterState),
    ClickButton(ActionButton),
    EditReport(String),
}

impl Interaction {
    /// 事件对应的更新规则
    pub fn rule(&self) -> UpdateRule {
        match self {
            Interaction::SelectTab(_) => UpdateRule::TabSelect,
            Interaction::ChangeFilters(_) => UpdateRule::FilterChange,
            Interaction::ClickButton(_) => UpdateRule::ButtonClick,
            Interaction::EditReport(_) => UpdateRule::ReportEdit,
        }
    }
}

/// 会话状态切片
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StateSlice {
    ActiveTab,
    Filters,
    VisiblePatients,
    LastUpdated,
    ReportDraft,
    Patients,
    Clock,
}

/// 可单独重新渲染的子树
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RenderTarget {
    LastUpdated,
    Tabs,
    TabContent,
    PatientTable,
}

impl RenderTarget {
    pub const ALL: [RenderTarget; 4] = [
        RenderTarget::LastUpdated,
        RenderTarget::Tabs,
        RenderTarget::TabContent,
        RenderTarget::PatientTable,
    ];

    pub fn dom_id(&self) -> &'static str {
        match self {
            RenderTarget::LastUpdated => "last-updated",
            RenderTarget::Tabs => "tabs",
            RenderTarget::TabContent => "tabs-content",
            RenderTarget::PatientTable => "patient-table",
        }
    }

    /// 片段路由中使用的名称
    pub fn slug(&self) -> &'static str {
        match self {
            RenderTarget::LastUpdated => "last-updated",
            RenderTarget::Tabs => "tabs",
            RenderTarget::TabContent => "tab-content",
            RenderTarget::PatientTable => "patient-table",
        }
    }
}

impl FromStr for RenderTarget {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        RenderTarget::ALL
            .into_iter()
            .find(|target| s == target.slug() || s == target.dom_id())
            .ok_or_else(|| DashboardError::NotFound(format!("Unknown fragment: {}", s)))
    }
}

/// 命名更新规则
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateRule {
    TabSelect,
    FilterChange,
    ButtonClick,
    ReportEdit,
}

impl UpdateRule {
    pub const ALL: [UpdateRule; 4] = [
        UpdateRule::TabSelect,
        UpdateRule::FilterChange,
        UpdateRule::ButtonClick,
        UpdateRule::ReportEdit,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            UpdateRule::TabSelect => "tab-select",
            UpdateRule::FilterChange => "filter-change",
            UpdateRule::ButtonClick => "button-click",
            UpdateRule::ReportEdit => "report-edit",
        }
    }

    /// 规则读取的切片
    pub fn inputs(&self) -> &'static [StateSlice] {
        match self {
            UpdateRule::TabSelect => &[StateSlice::ActiveTab],
            UpdateRule::FilterChange => &[StateSlice::Filters, StateSlice::Patients],
            UpdateRule::ButtonClick => &[StateSlice::Clock],
            UpdateRule::ReportEdit => &[StateSlice::ReportDraft],
        }
    }

    /// 规则写入的切片
    pub fn outputs(&self) -> &'static [StateSlice] {
        match self {
            UpdateRule::TabSelect => &[StateSlice::ActiveTab],
            UpdateRule::FilterChange => &[StateSlice::Filters, StateSlice::VisiblePatients],
            UpdateRule::ButtonClick => &[StateSlice::LastUpdated],
            UpdateRule::ReportEdit => &[StateSlice::ReportDraft],
        }
    }

    /// 规则执行后需要重新渲染的子树
    pub fn render_targets(&self) -> &'static [RenderTarget] {
        match self {
            UpdateRule::TabSelect => &[RenderTarget::Tabs, RenderTarget::TabContent],
            UpdateRule::FilterChange => &[RenderTarget::PatientTable],
            UpdateRule::ButtonClick => &[RenderTarget::LastUpdated],
            // 编辑器本身已持有新文本
            UpdateRule::ReportEdit => &[],
        }
    }
}

impl fmt::Display for UpdateRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
