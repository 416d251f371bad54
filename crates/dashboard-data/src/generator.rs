//! 合成数据生成器
//!
//! 以固定种子确定性地生成50条患者检查记录和6条工作流阶段记录。
//! 生成后立即校验数据契约，违反契约视为内部错误，启动阶段直接失败。

use chrono::{Duration, NaiveDate};
use dashboard_core::{
    utils::{is_rounded2, round2},
    DashboardError, ExamStatus, ExamType, Finding, PatientRecord, Priority, Result,
    WorkflowStage, WorkflowStepRecord,
};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// 默认随机种子
pub const DEFAULT_SEED: u64 = 42;

/// 患者记录数量
pub const PATIENT_COUNT: usize = 50;

/// 随访间隔（天）
pub const FOLLOW_UP_DAYS: i64 = 90;

const PATIENT_ID_BASE: usize = 1000;

// 年龄与检查日期偏移均为左闭右开区间
const AGE_RANGE: (u32, u32) = (25, 85);
const EXAM_AGE_DAYS: (i64, i64) = (1, 365);
const AI_CONFIDENCE_RANGE: (f64, f64) = (0.70, 0.98);
const PENDING_THRESHOLD: f64 = 0.3;

const PRIORITY_WEIGHTS: [(Priority, f64); 3] = [
    (Priority::High, 0.2),
    (Priority::Medium, 0.5),
    (Priority::Low, 0.3),
];

const FINDINGS_WEIGHTS: [(Finding, f64); 3] = [
    (Finding::Normal, 0.6),
    (Finding::Suspicious, 0.3),
    (Finding::Critical, 0.1),
];

const DURATION_HOURS_RANGE: (u32, u32) = (1, 48);
const COMPLETION_RATE_RANGE: (f64, f64) = (0.85, 0.99);
const AI_ASSISTANCE_PROBABILITY: f64 = 0.7;

/// 一次生成得到的完整数据集
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    pub seed: u64,
    pub reference_date: NaiveDate,
    pub patients: Vec<PatientRecord>,
    pub workflow: Vec<WorkflowStepRecord>,
}

/// 合成数据生成器
#[derive(Debug, Clone)]
pub struct SyntheticDataGenerator {
    seed: u64,
    reference_date: NaiveDate,
}

impl SyntheticDataGenerator {
    /// 创建生成器，检查日期以 `reference_date` 为基准向前回溯
    pub fn new(seed: u64, reference_date: NaiveDate) -> Self {
        Self {
            seed,
            reference_date,
        }
    }

    /// 生成并校验数据集
    ///
    /// 患者表与工作流表共用同一个随机数序列，先生成患者再生成工作流阶段。
    pub fn generate(&self) -> Result<Dataset> {
        let mut rng = StdRng::seed_from_u64(self.seed);

        let patients = self.generate_patients(&mut rng)?;
        let workflow = self.generate_workflow(&mut rng);

        let dataset = Dataset {
            seed: self.seed,
            reference_date: self.reference_date,
            patients,
            workflow,
        };
        dataset.validate()?;

        info!(
            "Generated synthetic dataset: {} patients, {} workflow steps (seed {}, reference date {})",
            dataset.patients.len(),
            dataset.workflow.len(),
            self.seed,
            self.reference_date
        );
        Ok(dataset)
    }

    fn generate_patients(&self, rng: &mut StdRng) -> Result<Vec<PatientRecord>> {
        let priorities = WeightedChoice::new(&PRIORITY_WEIGHTS)?;
        let findings = WeightedChoice::new(&FINDINGS_WEIGHTS)?;

        let mut patients = Vec::with_capacity(PATIENT_COUNT);
        for i in 0..PATIENT_COUNT {
            let days_ago = rng.gen_range(EXAM_AGE_DAYS.0..EXAM_AGE_DAYS.1);
            let exam_date = shift_date(self.reference_date, -days_ago)?;
            let follow_up_due = shift_date(exam_date, FOLLOW_UP_DAYS)?;
            let status = if rng.gen::<f64>() > PENDING_THRESHOLD {
                ExamStatus::Completed
            } else {
                ExamStatus::Pending
            };

            let record = PatientRecord {
                id: format!("P{}", PATIENT_ID_BASE + i),
                name: format!("Patient {}", i + 1),
                age: rng.gen_range(AGE_RANGE.0..AGE_RANGE.1),
                exam_type: ExamType::ALL[rng.gen_range(0..ExamType::ALL.len())],
                exam_date,
                follow_up_due,
                status,
                priority: priorities.sample(rng),
                ai_confidence: round2(rng.gen_range(AI_CONFIDENCE_RANGE.0..AI_CONFIDENCE_RANGE.1)),
                findings: findings.sample(rng),
            };
            debug!("Generated patient record {}", record.id);
            patients.push(record);
        }

        Ok(patients)
    }

    fn generate_workflow(&self, rng: &mut StdRng) -> Vec<WorkflowStepRecord> {
        WorkflowStage::ALL
            .iter()
            .map(|&step| WorkflowStepRecord {
                step,
                avg_duration_hours: rng.gen_range(DURATION_HOURS_RANGE.0..DURATION_HOURS_RANGE.1),
                completion_rate: round2(
                    rng.gen_range(COMPLETION_RATE_RANGE.0..COMPLETION_RATE_RANGE.1),
                ),
                ai_assistance: rng.gen_bool(AI_ASSISTANCE_PROBABILITY),
            })
            .collect()
    }
}

/// 以给定种子和基准日期生成数据集
pub fn generate_dataset(seed: u64, reference_date: NaiveDate) -> Result<Dataset> {
    SyntheticDataGenerator::new(seed, reference_date).generate()
}

impl Dataset {
    /// 校验生成契约
    pub fn validate(&self) -> Result<()> {
        if self.patients.len() != PATIENT_COUNT {
            return Err(violation(format!(
                "expected {} patients, found {}",
                PATIENT_COUNT,
                self.patients.len()
            )));
        }

        let mut seen = HashSet::with_capacity(self.patients.len());
        for (i, patient) in self.patients.iter().enumerate() {
            let expected_id = format!("P{}", PATIENT_ID_BASE + i);
            if patient.id != expected_id {
                return Err(violation(format!(
                    "patient #{} has id {}, expected {}",
                    i, patient.id, expected_id
                )));
            }
            if !seen.insert(patient.id.as_str()) {
                return Err(violation(format!("duplicate patient id {}", patient.id)));
            }
            if !(AGE_RANGE.0..AGE_RANGE.1).contains(&patient.age) {
                return Err(violation(format!(
                    "patient {} age {} out of range",
                    patient.id, patient.age
                )));
            }
            if !(AI_CONFIDENCE_RANGE.0..=AI_CONFIDENCE_RANGE.1).contains(&patient.ai_confidence)
                || !is_rounded2(patient.ai_confidence)
            {
                return Err(violation(format!(
                    "patient {} ai_confidence {} out of contract",
                    patient.id, patient.ai_confidence
                )));
            }
            if patient.follow_up_due != shift_date(patient.exam_date, FOLLOW_UP_DAYS)? {
                return Err(violation(format!(
                    "patient {} follow-up {} is not exam date {} + {} days",
                    patient.id, patient.follow_up_due, patient.exam_date, FOLLOW_UP_DAYS
                )));
            }
            if patient.exam_date >= self.reference_date {
                return Err(violation(format!(
                    "patient {} exam date {} is not before {}",
                    patient.id, patient.exam_date, self.reference_date
                )));
            }
        }

        if self.workflow.len() != WorkflowStage::ALL.len() {
            return Err(violation(format!(
                "expected {} workflow steps, found {}",
                WorkflowStage::ALL.len(),
                self.workflow.len()
            )));
        }
        for (record, expected) in self.workflow.iter().zip(WorkflowStage::ALL) {
            if record.step != *expected {
                return Err(violation(format!(
                    "workflow step {} found where {} was expected",
                    record.step, expected
                )));
            }
            if !(DURATION_HOURS_RANGE.0..DURATION_HOURS_RANGE.1).contains(&record.avg_duration_hours)
            {
                return Err(violation(format!(
                    "workflow step {} duration {}h out of range",
                    record.step, record.avg_duration_hours
                )));
            }
            if !(COMPLETION_RATE_RANGE.0..=COMPLETION_RATE_RANGE.1).contains(&record.completion_rate)
                || !is_rounded2(record.completion_rate)
            {
                return Err(violation(format!(
                    "workflow step {} completion rate {} out of contract",
                    record.step, record.completion_rate
                )));
            }
        }

        Ok(())
    }
}

/// 带权重的分类抽样
struct WeightedChoice<T: Copy> {
    items: Vec<T>,
    index: WeightedIndex<f64>,
}

impl<T: Copy> WeightedChoice<T> {
    fn new(entries: &[(T, f64)]) -> Result<Self> {
        let index = WeightedIndex::new(entries.iter().map(|(_, weight)| *weight))
            .map_err(|e| DashboardError::Internal(format!("Invalid category weights: {}", e)))?;
        Ok(Self {
            items: entries.iter().map(|(item, _)| *item).collect(),
            index,
        })
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        self.items[self.index.sample(rng)]
    }
}

fn shift_date(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
        .ok_or_else(|| violation(format!("date {} shifted by {} days overflows", date, days)))
}

fn violation(message: String) -> DashboardError {
    DashboardError::InvariantViolation(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn reference_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn dataset() -> Dataset {
        generate_dataset(DEFAULT_SEED, reference_date()).unwrap()
    }

    #[test]
    fn test_patient_ranges() {
        let dataset = dataset();
        for patient in &dataset.patients {
            assert!((25..85).contains(&patient.age), "age {}", patient.age);
            assert!((0.70..=0.98).contains(&patient.ai_confidence));
            assert!(is_rounded2(patient.ai_confidence));
            assert_eq!(patient.follow_up_due, patient.exam_date + Duration::days(90));
            let days_ago = (reference_date() - patient.exam_date).num_days();
            assert!((1..365).contains(&days_ago));
        }
    }

    #[test]
    fn test_patient_ids() {
        let dataset = dataset();
        assert_eq!(dataset.patients.len(), 50);

        let ids: Vec<&str> = dataset.patients.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.first(), Some(&"P1000"));
        assert_eq!(ids.last(), Some(&"P1049"));

        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), 50);
        assert_eq!(dataset.patients[9].name, "Patient 10");
    }

    #[test]
    fn test_workflow_records() {
        let dataset = dataset();
        let steps: Vec<WorkflowStage> = dataset.workflow.iter().map(|w| w.step).collect();
        assert_eq!(steps, WorkflowStage::ALL.to_vec());

        for record in &dataset.workflow {
            assert!((1..48).contains(&record.avg_duration_hours));
            assert!((0.85..=0.99).contains(&record.completion_rate));
            assert!(is_rounded2(record.completion_rate));
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let first = dataset();
        let second = dataset();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );

        let other = generate_dataset(7, reference_date()).unwrap();
        assert_ne!(first.patients, other.patients);
    }

    #[test]
    fn test_weighted_choice_follows_weights() {
        let choice = WeightedChoice::new(&FINDINGS_WEIGHTS).unwrap();
        let mut rng = StdRng::seed_from_u64(DEFAULT_SEED);
        let samples = 20_000;

        let mut counts: HashMap<Finding, usize> = HashMap::new();
        for _ in 0..samples {
            *counts.entry(choice.sample(&mut rng)).or_insert(0) += 1;
        }

        for (finding, weight) in FINDINGS_WEIGHTS {
            let observed = counts.get(&finding).copied().unwrap_or(0) as f64 / samples as f64;
            assert!(
                (observed - weight).abs() < 0.02,
                "{finding}: observed {observed}, expected {weight}"
            );
        }
    }

    #[test]
    fn test_validate_rejects_contract_violations() {
        let mut bad_age = dataset();
        bad_age.patients[3].age = 90;
        assert!(matches!(
            bad_age.validate(),
            Err(DashboardError::InvariantViolation(_))
        ));

        let mut bad_follow_up = dataset();
        bad_follow_up.patients[0].follow_up_due = bad_follow_up.patients[0].exam_date;
        assert!(bad_follow_up.validate().is_err());

        let mut bad_confidence = dataset();
        bad_confidence.patients[1].ai_confidence = 0.755;
        assert!(bad_confidence.validate().is_err());

        let mut swapped = dataset();
        swapped.workflow.swap(0, 1);
        assert!(swapped.validate().is_err());

        let mut truncated = dataset();
        truncated.patients.pop();
        assert!(truncated.validate().is_err());
    }
}
