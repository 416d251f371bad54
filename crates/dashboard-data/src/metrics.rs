//! 指标聚合
//!
//! 从患者表推导看板左侧的关键指标，以及概览页与工作流页的图表分布。
//! 患者表在会话内不可变，因此这些值在会话生命周期内等同于常量。

use dashboard_core::{
    utils::round2, ExamStatus, ExamType, Finding, PatientRecord, Priority, WorkflowStage,
    WorkflowStepRecord,
};
use serde::{Deserialize, Serialize};

/// 置信度直方图的取值范围（百分位）
const CONFIDENCE_HISTOGRAM_RANGE: (i64, i64) = (70, 98);

/// 关键指标
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardMetrics {
    pub total_patients: usize,
    pub pending_followups: usize,
    pub completed: usize,
    pub critical_cases: usize,
    pub avg_ai_confidence: f64,
}

impl DashboardMetrics {
    /// 计算关键指标，空集合的平均置信度记为0
    pub fn compute(patients: &[PatientRecord]) -> Self {
        let mut metrics = Self {
            total_patients: patients.len(),
            pending_followups: 0,
            completed: 0,
            critical_cases: 0,
            avg_ai_confidence: 0.0,
        };

        let mut confidence_sum = 0.0;
        for patient in patients {
            match patient.status {
                ExamStatus::Pending => metrics.pending_followups += 1,
                ExamStatus::Completed => metrics.completed += 1,
            }
            if patient.is_critical() {
                metrics.critical_cases += 1;
            }
            confidence_sum += patient.ai_confidence;
        }

        if !patients.is_empty() {
            metrics.avg_ai_confidence = round2(confidence_sum / patients.len() as f64);
        }

        metrics
    }
}

/// 计数桶
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountBucket {
    pub label: String,
    pub count: usize,
}

/// 按所见与优先级分组的计数
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupedCount {
    pub finding: Finding,
    pub priority: Priority,
    pub count: usize,
}

/// 直方图区间 `[lower, upper)`，最后一个区间包含上界
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// 瀑布图的一步
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WaterfallStep {
    pub step: WorkflowStage,
    pub delta: f64,
    pub running_total: f64,
}

/// 检查类型分布，只包含实际出现的类型
pub fn exam_type_distribution(patients: &[PatientRecord]) -> Vec<CountBucket> {
    ExamType::ALL
        .iter()
        .map(|exam_type| CountBucket {
            label: exam_type.label().to_string(),
            count: patients.iter().filter(|p| p.exam_type == *exam_type).count(),
        })
        .filter(|bucket| bucket.count > 0)
        .collect()
}

/// 按所见与优先级交叉计数，覆盖全部组合
pub fn findings_by_priority(patients: &[PatientRecord]) -> Vec<GroupedCount> {
    let mut groups = Vec::with_capacity(Finding::ALL.len() * Priority::ALL.len());
    for &finding in Finding::ALL {
        for &priority in Priority::ALL {
            let count = patients
                .iter()
                .filter(|p| p.findings == finding && p.priority == priority)
                .count();
            groups.push(GroupedCount {
                finding,
                priority,
                count,
            });
        }
    }
    groups
}

/// AI置信度直方图，`bins` 个等宽区间
///
/// 置信度保留两位小数，分桶在整百分位上做整数运算，避免边界值落入相邻区间。
pub fn confidence_histogram(patients: &[PatientRecord], bins: usize) -> Vec<HistogramBin> {
    if bins == 0 {
        return Vec::new();
    }

    let (min, max) = CONFIDENCE_HISTOGRAM_RANGE;
    let span = max - min;
    let scale = (bins * 100) as f64;
    let mut histogram: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: (min * bins as i64 + span * i as i64) as f64 / scale,
            upper: (min * bins as i64 + span * (i + 1) as i64) as f64 / scale,
            count: 0,
        })
        .collect();

    for patient in patients {
        let hundredths = (patient.ai_confidence * 100.0).round() as i64;
        let offset = (hundredths - min) * bins as i64 / span;
        let index = offset.clamp(0, bins as i64 - 1) as usize;
        histogram[index].count += 1;
    }

    histogram
}

/// 工作流完成率的累计序列（瀑布图）
pub fn cumulative_completion(workflow: &[WorkflowStepRecord]) -> Vec<WaterfallStep> {
    let mut running_total = 0.0;
    workflow
        .iter()
        .map(|record| {
            running_total += record.completion_rate;
            WaterfallStep {
                step: record.step,
                delta: record.completion_rate,
                running_total: round2(running_total),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{generate_dataset, DEFAULT_SEED};
    use chrono::NaiveDate;

    fn patients() -> Vec<PatientRecord> {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        generate_dataset(DEFAULT_SEED, date).unwrap().patients
    }

    #[test]
    fn test_pending_plus_completed_is_total() {
        let patients = patients();
        let metrics = DashboardMetrics::compute(&patients);

        assert_eq!(metrics.total_patients, 50);
        assert_eq!(metrics.pending_followups + metrics.completed, metrics.total_patients);
    }

    #[test]
    fn test_metrics_match_brute_force() {
        let patients = patients();
        let metrics = DashboardMetrics::compute(&patients);

        let pending = patients.iter().filter(|p| p.status == ExamStatus::Pending).count();
        let critical = patients.iter().filter(|p| p.findings == Finding::Critical).count();
        let mean = patients.iter().map(|p| p.ai_confidence).sum::<f64>() / 50.0;

        assert_eq!(metrics.pending_followups, pending);
        assert_eq!(metrics.critical_cases, critical);
        assert_eq!(metrics.avg_ai_confidence, round2(mean));
        assert!((0.70..=0.98).contains(&metrics.avg_ai_confidence));
    }

    #[test]
    fn test_empty_collection() {
        let metrics = DashboardMetrics::compute(&[]);
        assert_eq!(metrics.total_patients, 0);
        assert_eq!(metrics.avg_ai_confidence, 0.0);
        assert!(exam_type_distribution(&[]).is_empty());
        assert_eq!(confidence_histogram(&[], 10).iter().map(|b| b.count).sum::<usize>(), 0);
    }

    #[test]
    fn test_distributions_cover_every_record() {
        let patients = patients();

        let by_type: usize = exam_type_distribution(&patients).iter().map(|b| b.count).sum();
        assert_eq!(by_type, 50);

        let grouped = findings_by_priority(&patients);
        assert_eq!(grouped.len(), 9);
        assert_eq!(grouped.iter().map(|g| g.count).sum::<usize>(), 50);

        let histogram = confidence_histogram(&patients, 10);
        assert_eq!(histogram.len(), 10);
        assert_eq!(histogram.iter().map(|b| b.count).sum::<usize>(), 50);
        assert_eq!(histogram[0].lower, 0.70);
        assert_eq!(histogram[9].upper, 0.98);
    }

    #[test]
    fn test_histogram_edges_follow_exact_width() {
        let with_confidence = |values: &[f64]| -> Vec<PatientRecord> {
            let template = patients().remove(0);
            values
                .iter()
                .map(|&ai_confidence| PatientRecord {
                    ai_confidence,
                    ..template.clone()
                })
                .collect()
        };

        let histogram = confidence_histogram(&with_confidence(&[0.70, 0.72, 0.73, 0.84, 0.98]), 10);
        assert_eq!(histogram[1].lower, 0.728);
        assert_eq!(histogram[1].upper, 0.756);
        assert_eq!(histogram[5].lower, 0.84);

        // 0.72 < 0.728 <= 0.73
        assert_eq!(histogram[0].count, 2);
        assert_eq!(histogram[1].count, 1);
        // 0.84 恰好落在第6个区间的下界
        assert_eq!(histogram[4].count, 0);
        assert_eq!(histogram[5].count, 1);
        // 上界归入最后一个区间
        assert_eq!(histogram[9].count, 1);
    }

    #[test]
    fn test_cumulative_completion() {
        let workflow = vec![
            WorkflowStepRecord {
                step: WorkflowStage::OrderReceived,
                avg_duration_hours: 2,
                completion_rate: 0.9,
                ai_assistance: true,
            },
            WorkflowStepRecord {
                step: WorkflowStage::ImageAcquisition,
                avg_duration_hours: 5,
                completion_rate: 0.95,
                ai_assistance: false,
            },
        ];

        let steps = cumulative_completion(&workflow);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].running_total, 0.9);
        assert_eq!(steps[1].delta, 0.95);
        assert_eq!(steps[1].running_total, 1.85);
    }
}
