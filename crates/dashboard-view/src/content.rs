//! 看板上的固定文案：告警、优化建议、报告模板与AI建议

/// 告警级别，对应页面上的配色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Warning,
    Danger,
    Critical,
}

impl Tone {
    pub fn class(&self) -> &'static str {
        match self {
            Tone::Info => "tone-info",
            Tone::Success => "tone-success",
            Tone::Warning => "tone-warning",
            Tone::Danger => "tone-danger",
            Tone::Critical => "tone-critical",
        }
    }
}

/// 概览页告警
#[derive(Debug, Clone, Copy)]
pub struct Alert {
    pub title: &'static str,
    pub detail: &'static str,
    pub tag: &'static str,
    pub tone: Tone,
}

pub const RECENT_ALERTS: [Alert; 3] = [
    Alert {
        title: "Missed Follow-up",
        detail: "Patient P1005 - CT Scan from 45 days ago",
        tag: "High Priority",
        tone: Tone::Danger,
    },
    Alert {
        title: "Critical Finding",
        detail: "Patient P1012 - MRI shows suspicious mass",
        tag: "Requires Immediate Attention",
        tone: Tone::Critical,
    },
    Alert {
        title: "AI Confidence Low",
        detail: "Patient P1023 - X-Ray analysis confidence below threshold",
        tag: "Manual Review Recommended",
        tone: Tone::Warning,
    },
];

/// 带标题和说明的卡片
#[derive(Debug, Clone, Copy)]
pub struct Card {
    pub title: &'static str,
    pub detail: &'static str,
    pub tone: Tone,
}

pub const OPTIMIZATION_SUGGESTIONS: [Card; 3] = [
    Card {
        title: "Reduce Image Acquisition Time",
        detail: "AI analysis suggests protocol optimization could reduce acquisition time by 15%",
        tone: Tone::Info,
    },
    Card {
        title: "Automate Report Generation",
        detail: "Implement AI-powered reporting for normal cases to reduce radiologist workload",
        tone: Tone::Success,
    },
    Card {
        title: "Prioritize Critical Cases",
        detail: "Use AI flagging to ensure critical findings are reviewed within 2 hours",
        tone: Tone::Danger,
    },
];

pub const REPORT_TEMPLATES: [Card; 3] = [
    Card {
        title: "Standard Report",
        detail: "Comprehensive report with findings, impressions, and recommendations",
        tone: Tone::Info,
    },
    Card {
        title: "Follow-up Report",
        detail: "Comparative analysis with previous examinations",
        tone: Tone::Success,
    },
    Card {
        title: "Critical Findings Report",
        detail: "Urgent report for critical or suspicious findings",
        tone: Tone::Danger,
    },
];

pub const AI_SUGGESTIONS: [&str; 2] = [
    "Consider adding specific measurements for the sclerotic lesions.",
    "Recommend follow-up in 3 months for stable metastatic disease.",
];

pub const PATIENT_ACTIONS: [&str; 3] = ["Schedule Follow-up", "Update EHR", "Flag for Review"];

pub const REPORT_EXTRA_ACTIONS: [&str; 2] = ["Export to EHR", "AI Enhance"];
