//! # 看板数据模块
//!
//! 提供看板所需的全部数据：
//! - 合成数据生成器：按固定种子生成患者检查表与工作流阶段表
//! - 指标聚合：从患者表推导汇总指标与图表分布

pub mod generator;
pub mod metrics;

// 重新导出主要类型
pub use generator::{
    generate_dataset, Dataset, SyntheticDataGenerator, DEFAULT_SEED, FOLLOW_UP_DAYS,
    PATIENT_COUNT,
};
pub use metrics::{
    confidence_histogram, cumulative_completion, exam_type_distribution, findings_by_priority,
    CountBucket, DashboardMetrics, GroupedCount, HistogramBin, WaterfallStep,
};
