//! 视图渲染
//!
//! `(当前标签页, 筛选状态, 报告草稿, ...)` 到显示树的纯映射。四个标签页各自渲染互不相交的子树，
//! 任一时刻只显示其中一个。[`render_target`] 只渲染某条更新规则影响到的那一片。

use crate::content::{
    Card, AI_SUGGESTIONS, OPTIMIZATION_SUGGESTIONS, PATIENT_ACTIONS, RECENT_ALERTS,
    REPORT_EXTRA_ACTIONS, REPORT_TEMPLATES,
};
use crate::paths;
use crate::tree::{div, heading, paragraph, post_form, span, static_button, NodeKind, ViewNode};
use dashboard_core::{
    utils::{format_percent, DATE_FORMAT},
    Finding, PatientRecord, WorkflowStepRecord,
};
use dashboard_data::{
    confidence_histogram, cumulative_completion, exam_type_distribution, findings_by_priority,
    DashboardMetrics,
};
use dashboard_session::{ActionButton, ActiveTab, FilterSelection, RenderTarget, SessionState};
use std::fmt::Display;

/// 页面标题
pub const TITLE: &str = "Radiology AI Workflow Dashboard";

const CONFIDENCE_BINS: usize = 10;

const PATIENT_COLUMNS: [&str; 10] = [
    "Patient ID",
    "Name",
    "Age",
    "Exam Type",
    "Exam Date",
    "Follow-up Due",
    "Status",
    "Priority",
    "AI Confidence",
    "Findings",
];

const WORKFLOW_COLUMNS: [&str; 4] = [
    "Workflow Step",
    "Avg Duration (hours)",
    "Completion Rate",
    "AI Assistance",
];

/// 渲染整页
pub fn render_page(session: &SessionState) -> ViewNode {
    div()
        .id("app")
        .class("dashboard")
        .child(render_header(session))
        .child(
            div()
                .class("main")
                .child(render_sidebar(session))
                .child(
                    ViewNode::element(NodeKind::Section)
                        .class("content")
                        .child(render_tabs(session.active_tab()))
                        .child(render_tab_content(session)),
                ),
        )
}

/// 只渲染指定的子树
pub fn render_target(target: RenderTarget, session: &SessionState) -> ViewNode {
    match target {
        RenderTarget::LastUpdated => render_last_updated(session),
        RenderTarget::Tabs => render_tabs(session.active_tab()),
        RenderTarget::TabContent => render_tab_content(session),
        RenderTarget::PatientTable => render_patient_table(session),
    }
}

/// 渲染某个标签页的内容
pub fn render_tab(tab: ActiveTab, session: &SessionState) -> ViewNode {
    let body = match tab {
        ActiveTab::Overview => overview_tab(session),
        ActiveTab::Patients => patients_tab(session),
        ActiveTab::Workflow => workflow_tab(session),
        ActiveTab::Reports => reports_tab(session),
    };

    ViewNode::element(NodeKind::Section)
        .id(&format!("{}-view", tab.value()))
        .class("tab-view")
        .attr("data-tab", tab.value())
        .children(body)
}

fn render_header(session: &SessionState) -> ViewNode {
    ViewNode::element(NodeKind::Header)
        .class("header")
        .child(heading(1, TITLE))
        .child(
            div()
                .class("last-updated-box")
                .child(span("Last updated: "))
                .child(render_last_updated(session)),
        )
}

fn render_last_updated(session: &SessionState) -> ViewNode {
    span(session.last_updated_display())
        .id(RenderTarget::LastUpdated.dom_id())
        .class("timestamp")
}

fn render_sidebar(session: &SessionState) -> ViewNode {
    ViewNode::element(NodeKind::Aside)
        .class("sidebar")
        .child(metrics_panel(session.metrics()))
        .child(ai_controls_panel())
        .child(filters_panel(session))
}

fn panel(title: &str) -> ViewNode {
    ViewNode::element(NodeKind::Section)
        .class("panel")
        .child(heading(3, title).class("panel-title"))
}

fn metrics_panel(metrics: &DashboardMetrics) -> ViewNode {
    panel("Key Metrics").id("key-metrics").child(
        div()
            .class("metric-grid")
            .child(metric_box(
                "total-patients",
                metrics.total_patients.to_string(),
                "Total Patients",
            ))
            .child(metric_box(
                "pending-followups",
                metrics.pending_followups.to_string(),
                "Pending Follow-ups",
            ))
            .child(metric_box(
                "critical-cases",
                metrics.critical_cases.to_string(),
                "Critical Cases",
            ))
            .child(metric_box(
                "avg-ai-confidence",
                format!("{:.2}", metrics.avg_ai_confidence),
                "Avg AI Confidence",
            )),
    )
}

fn metric_box(id: &str, value: String, label: &str) -> ViewNode {
    div()
        .class("metric-box")
        .child(heading(4, value).id(id).class("metric-value"))
        .child(paragraph(label).class("metric-label"))
}

fn ai_controls_panel() -> ViewNode {
    panel("AI Controls").children(ActionButton::ALL.into_iter().map(|button| {
        post_form(&paths::action(button.dom_id())).class("action-form").child(
            ViewNode::element(NodeKind::Button)
                .attr("type", "submit")
                .id(button.dom_id())
                .class("action-button")
                .with_text(button.label()),
        )
    }))
}

fn filters_panel(session: &SessionState) -> ViewNode {
    let options = session.filter_options();
    let filters = session.filters();

    post_form(paths::FILTERS)
        .id("filters")
        .class("panel")
        .child(heading(3, "Filters").class("panel-title"))
        .child(select_field(
            "Exam Type:",
            "exam_type",
            "exam-type-filter",
            &options.exam_types,
            &filters.exam_type,
        ))
        .child(select_field(
            "Priority:",
            "priority",
            "priority-filter",
            &options.priorities,
            &filters.priority,
        ))
        .child(select_field(
            "Findings:",
            "findings",
            "findings-filter",
            &options.findings,
            &filters.findings,
        ))
        .child(
            ViewNode::element(NodeKind::Button)
                .attr("type", "submit")
                .class("apply-filters")
                .with_text("Apply Filters"),
        )
}

fn select_field<T: Display + PartialEq>(
    label: &str,
    name: &str,
    id: &str,
    options: &[FilterSelection<T>],
    current: &FilterSelection<T>,
) -> ViewNode {
    let select = ViewNode::element(NodeKind::Select)
        .attr("name", name)
        .id(id)
        .attr("onchange", "this.form.submit()")
        .children(options.iter().map(|option| {
            let value = option.to_string();
            let node = ViewNode::element(NodeKind::SelectOption)
                .attr("value", value.clone())
                .with_text(value);
            if option == current {
                node.attr("selected", "selected")
            } else {
                node
            }
        }));

    div()
        .class("field")
        .child(
            ViewNode::element(NodeKind::Label)
                .attr("for", id)
                .with_text(label),
        )
        .child(select)
}

fn render_tabs(active: ActiveTab) -> ViewNode {
    ViewNode::element(NodeKind::Nav)
        .id(RenderTarget::Tabs.dom_id())
        .class("tabs")
        .children(ActiveTab::ALL.into_iter().map(|tab| {
            let class = if tab == active { "tab active" } else { "tab" };
            post_form(paths::TAB).class("tab-form").child(
                ViewNode::element(NodeKind::Button)
                    .attr("type", "submit")
                    .attr("name", "tab")
                    .attr("value", tab.value())
                    .id(tab.dom_id())
                    .class(class)
                    .with_text(tab.label()),
            )
        }))
}

fn render_tab_content(session: &SessionState) -> ViewNode {
    div()
        .id(RenderTarget::TabContent.dom_id())
        .class("tab-content")
        .child(render_tab(session.active_tab(), session))
}

/// 柱状图的一项
struct BarDatum {
    label: String,
    value: f64,
    display: String,
    class: Option<&'static str>,
}

fn chart(id: &str, title: &str, data: Vec<BarDatum>) -> ViewNode {
    let max = data.iter().map(|d| d.value).fold(0.0, f64::max);

    ViewNode::element(NodeKind::Chart)
        .id(id)
        .class("chart")
        .child(heading(4, title).class("chart-title"))
        .children(data.into_iter().map(|datum| {
            let width = if max > 0.0 { datum.value / max * 100.0 } else { 0.0 };
            let class = match datum.class {
                Some(extra) => format!("bar-row {}", extra),
                None => "bar-row".to_string(),
            };
            ViewNode::element(NodeKind::Bar)
                .class(&class)
                .child(span(datum.label).class("bar-label"))
                .child(
                    div().class("bar-track").child(
                        div()
                            .class("bar-fill")
                            .attr("style", format!("width: {:.1}%", width)),
                    ),
                )
                .child(span(datum.display).class("bar-value"))
        }))
}

fn overview_tab(session: &SessionState) -> Vec<ViewNode> {
    let patients = session.patients();

    let exam_types = exam_type_distribution(patients)
        .into_iter()
        .map(|bucket| BarDatum {
            label: bucket.label,
            value: bucket.count as f64,
            display: bucket.count.to_string(),
            class: None,
        })
        .collect();

    let findings = findings_by_priority(patients)
        .into_iter()
        .map(|group| BarDatum {
            label: format!("{} / {}", group.finding, group.priority),
            value: group.count as f64,
            display: group.count.to_string(),
            class: Some(finding_class(group.finding)),
        })
        .collect();

    let confidence = confidence_histogram(patients, CONFIDENCE_BINS)
        .into_iter()
        .map(|bin| BarDatum {
            label: format!("{:.3}-{:.3}", bin.lower, bin.upper),
            value: bin.count as f64,
            display: bin.count.to_string(),
            class: None,
        })
        .collect();

    let completion = session
        .workflow()
        .iter()
        .map(|record| BarDatum {
            label: record.step.label().to_string(),
            value: record.completion_rate,
            display: format_percent(record.completion_rate),
            class: Some(if record.ai_assistance { "ai-yes" } else { "ai-no" }),
        })
        .collect();

    vec![
        div()
            .class("chart-grid")
            .child(chart("exam-type-chart", "Exam Type Distribution", exam_types))
            .child(chart("findings-chart", "Findings by Priority", findings))
            .child(chart(
                "confidence-chart",
                "AI Confidence Distribution",
                confidence,
            ))
            .child(chart(
                "completion-chart",
                "Workflow Step Completion Rate",
                completion,
            )),
        div()
            .id("recent-alerts")
            .class("alerts")
            .child(heading(3, "Recent AI Alerts & Flags"))
            .children(RECENT_ALERTS.iter().map(|alert| {
                div()
                    .class(&format!("alert {}", alert.tone.class()))
                    .child(heading(4, alert.title))
                    .child(paragraph(alert.detail))
                    .child(span(alert.tag).class("alert-tag"))
            })),
    ]
}

fn patients_tab(session: &SessionState) -> Vec<ViewNode> {
    let visible = session.visible_patients().len();
    let total = session.patients().len();

    vec![
        div()
            .class("tab-intro")
            .child(heading(3, "Patient Management"))
            .child(paragraph(
                "Manage patient records, follow-ups, and examination results",
            )),
        paragraph(format!("Showing {} of {} records", visible, total)).class("result-count"),
        render_patient_table(session),
        div()
            .class("actions")
            .child(heading(4, "Patient Actions"))
            .children(PATIENT_ACTIONS.iter().map(|action| static_button(*action))),
    ]
}

fn table_head(columns: &[&str]) -> ViewNode {
    ViewNode::element(NodeKind::TableHead).child(
        ViewNode::element(NodeKind::Row).children(
            columns
                .iter()
                .map(|column| ViewNode::element(NodeKind::HeaderCell).with_text(*column)),
        ),
    )
}

fn table_row(cells: Vec<String>) -> ViewNode {
    ViewNode::element(NodeKind::Row).children(
        cells
            .into_iter()
            .map(|cell| ViewNode::element(NodeKind::Cell).with_text(cell)),
    )
}

fn finding_class(finding: Finding) -> &'static str {
    match finding {
        Finding::Normal => "finding-normal",
        Finding::Suspicious => "finding-suspicious",
        Finding::Critical => "finding-critical",
    }
}

fn patient_row_class(record: &PatientRecord) -> String {
    let mut classes = Vec::new();
    match record.findings {
        Finding::Critical => classes.push("row-critical"),
        Finding::Suspicious => classes.push("row-suspicious"),
        Finding::Normal => {}
    }
    if record.is_pending() {
        classes.push("row-pending");
    }
    classes.join(" ")
}

fn patient_cells(record: &PatientRecord) -> Vec<String> {
    vec![
        record.id.clone(),
        record.name.clone(),
        record.age.to_string(),
        record.exam_type.to_string(),
        record.exam_date.format(DATE_FORMAT).to_string(),
        record.follow_up_due.format(DATE_FORMAT).to_string(),
        record.status.to_string(),
        record.priority.to_string(),
        format!("{:.2}", record.ai_confidence),
        record.findings.to_string(),
    ]
}

/// 患者表，只包含当前可见的记录；没有匹配记录时表体为空
fn render_patient_table(session: &SessionState) -> ViewNode {
    let rows = session.visible_patients().into_iter().map(|record| {
        let row = table_row(patient_cells(record)).attr("data-patient-id", record.id.clone());
        let class = patient_row_class(record);
        if class.is_empty() {
            row
        } else {
            row.class(&class)
        }
    });

    ViewNode::element(NodeKind::Table)
        .id(RenderTarget::PatientTable.dom_id())
        .class("data-table")
        .child(table_head(&PATIENT_COLUMNS))
        .child(ViewNode::element(NodeKind::TableBody).children(rows))
}

fn workflow_cells(record: &WorkflowStepRecord) -> Vec<String> {
    vec![
        record.step.to_string(),
        record.avg_duration_hours.to_string(),
        format!("{:.2}", record.completion_rate),
        if record.ai_assistance { "Yes" } else { "No" }.to_string(),
    ]
}

fn card(card: &Card) -> ViewNode {
    div()
        .class(&format!("card {}", card.tone.class()))
        .child(heading(5, card.title))
        .child(paragraph(card.detail))
}

fn workflow_tab(session: &SessionState) -> Vec<ViewNode> {
    let waterfall = cumulative_completion(session.workflow())
        .into_iter()
        .map(|step| BarDatum {
            label: step.step.label().to_string(),
            value: step.running_total,
            display: format!("+{:.2} = {:.2}", step.delta, step.running_total),
            class: None,
        })
        .collect();

    vec![
        div()
            .class("tab-intro")
            .child(heading(3, "Workflow Analysis"))
            .child(paragraph(
                "Monitor and optimize radiology workflows with AI assistance",
            )),
        chart("workflow-waterfall", "Radiology Workflow Analysis", waterfall),
        ViewNode::element(NodeKind::Table)
            .id("workflow-table")
            .class("data-table")
            .child(table_head(&WORKFLOW_COLUMNS))
            .child(
                ViewNode::element(NodeKind::TableBody).children(
                    session
                        .workflow()
                        .iter()
                        .map(|record| table_row(workflow_cells(record))),
                ),
            ),
        div()
            .class("suggestions")
            .child(heading(4, "AI Optimization Suggestions"))
            .children(OPTIMIZATION_SUGGESTIONS.iter().map(card)),
    ]
}

fn reports_tab(session: &SessionState) -> Vec<ViewNode> {
    vec![
        div()
            .class("tab-intro")
            .child(heading(3, "AI-Generated Reports"))
            .child(paragraph(
                "Review and customize AI-generated radiology reports",
            )),
        div()
            .class("templates")
            .child(heading(4, "Report Templates"))
            .children(
                REPORT_TEMPLATES
                    .iter()
                    .map(|template| card(template).child(static_button("Use Template"))),
            ),
        post_form(paths::REPORT)
            .id("report-form")
            .child(heading(4, "Report Editor"))
            .child(
                ViewNode::element(NodeKind::TextArea)
                    .attr("name", "report")
                    .id("report-editor")
                    .attr("rows", "18")
                    .with_text(session.report_draft()),
            )
            .child(
                div()
                    .class("actions")
                    .child(
                        ViewNode::element(NodeKind::Button)
                            .attr("type", "submit")
                            .id("save-report")
                            .with_text("Save Report"),
                    )
                    .children(
                        REPORT_EXTRA_ACTIONS
                            .iter()
                            .map(|action| static_button(*action)),
                    ),
            ),
        div()
            .class("suggestions")
            .child(heading(4, "AI Suggestions"))
            .children(AI_SUGGESTIONS.iter().map(|suggestion| {
                div()
                    .class("suggestion")
                    .child(paragraph(*suggestion))
                    .child(static_button("Apply Suggestion"))
            })),
    ]
}
