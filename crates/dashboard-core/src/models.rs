//! 核心数据模型定义

use crate::error::DashboardError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 为带显示标签的枚举生成 `ALL`、`label()`、`Display` 与 `FromStr`
///
/// 解析时同时接受显示标签与变体名（均忽略大小写）。
macro_rules! labelled_enum {
    ($name:ident, $field:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = DashboardError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s.trim();
                $(
                    if value.eq_ignore_ascii_case($label)
                        || value.eq_ignore_ascii_case(stringify!($variant))
                    {
                        return Ok($name::$variant);
                    }
                )+
                Err(DashboardError::invalid_selection($field, s))
            }
        }
    };
}

/// 检查类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExamType {
    #[serde(rename = "CT Scan")]
    CtScan,
    #[serde(rename = "MRI")]
    Mri,
    #[serde(rename = "X-Ray")]
    XRay,
    #[serde(rename = "Ultrasound")]
    Ultrasound,
}

labelled_enum!(ExamType, "exam_type", {
    CtScan => "CT Scan",
    Mri => "MRI",
    XRay => "X-Ray",
    Ultrasound => "Ultrasound",
});

/// 检查状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ExamStatus {
    Completed, // 已完成
    Pending,   // 待随访
}

labelled_enum!(ExamStatus, "status", {
    Completed => "Completed",
    Pending => "Pending",
});

/// 优先级
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Priority {
    High,   // 高
    Medium, // 中
    Low,    // 低
}

labelled_enum!(Priority, "priority", {
    High => "High",
    Medium => "Medium",
    Low => "Low",
});

/// 检查所见
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Finding {
    Normal,     // 正常
    Suspicious, // 可疑
    Critical,   // 危急
}

labelled_enum!(Finding, "findings", {
    Normal => "Normal",
    Suspicious => "Suspicious",
    Critical => "Critical",
});

/// 放射科工作流阶段（按规范顺序排列）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WorkflowStage {
    #[serde(rename = "Order Received")]
    OrderReceived,
    #[serde(rename = "Image Acquisition")]
    ImageAcquisition,
    #[serde(rename = "AI Analysis")]
    AiAnalysis,
    #[serde(rename = "Radiologist Review")]
    RadiologistReview,
    #[serde(rename = "Report Generation")]
    ReportGeneration,
    #[serde(rename = "Follow-up")]
    FollowUp,
}

labelled_enum!(WorkflowStage, "step", {
    OrderReceived => "Order Received",
    ImageAcquisition => "Image Acquisition",
    AiAnalysis => "AI Analysis",
    RadiologistReview => "Radiologist Review",
    ReportGeneration => "Report Generation",
    FollowUp => "Follow-up",
});

/// 一条合成的检查记录
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientRecord {
    pub id: String,             // P1000..P1049
    pub name: String,           // 患者姓名
    pub age: u32,               // 年龄
    pub exam_type: ExamType,    // 检查类型
    pub exam_date: NaiveDate,   // 检查日期
    pub follow_up_due: NaiveDate, // 随访到期日 = 检查日期 + 90天
    pub status: ExamStatus,
    pub priority: Priority,
    pub ai_confidence: f64,     // AI置信度（两位小数）
    pub findings: Finding,
}

impl PatientRecord {
    pub fn is_pending(&self) -> bool {
        self.status == ExamStatus::Pending
    }

    pub fn is_critical(&self) -> bool {
        self.findings == Finding::Critical
    }
}

/// 工作流阶段汇总
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowStepRecord {
    pub step: WorkflowStage,
    pub avg_duration_hours: u32,
    pub completion_rate: f64,
    pub ai_assistance: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels_and_variant_names() {
        assert_eq!("CT Scan".parse::<ExamType>().unwrap(), ExamType::CtScan);
        assert_eq!("ctscan".parse::<ExamType>().unwrap(), ExamType::CtScan);
        assert_eq!("X-Ray".parse::<ExamType>().unwrap(), ExamType::XRay);
        assert_eq!("MRI".parse::<ExamType>().unwrap(), ExamType::Mri);
        assert_eq!("critical".parse::<Finding>().unwrap(), Finding::Critical);
        assert_eq!("Follow-up".parse::<WorkflowStage>().unwrap(), WorkflowStage::FollowUp);
    }

    #[test]
    fn test_parse_rejects_unknown_values() {
        let err = "PET".parse::<ExamType>().unwrap_err();
        match err {
            DashboardError::InvalidSelection { field, value } => {
                assert_eq!(field, "exam_type");
                assert_eq!(value, "PET");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!("Urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_serde_uses_display_labels() {
        assert_eq!(serde_json::to_string(&ExamType::XRay).unwrap(), "\"X-Ray\"");
        assert_eq!(
            serde_json::to_string(&WorkflowStage::AiAnalysis).unwrap(),
            "\"AI Analysis\""
        );
        let parsed: ExamType = serde_json::from_str("\"CT Scan\"").unwrap();
        assert_eq!(parsed, ExamType::CtScan);
    }

    #[test]
    fn test_canonical_stage_order() {
        let labels: Vec<&str> = WorkflowStage::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(
            labels,
            vec![
                "Order Received",
                "Image Acquisition",
                "AI Analysis",
                "Radiologist Review",
                "Report Generation",
                "Follow-up",
            ]
        );
    }
}
