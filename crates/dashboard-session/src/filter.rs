//! 患者表筛选
//!
//! 三个筛选器各自为 `All` 或一个合法枚举值。可见子集是通过全部启用谓词（逻辑与）的记录，
//! 保持原始顺序；底层患者表从不被修改。

use dashboard_core::{DashboardError, ExamType, Finding, PatientRecord, Priority, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const ALL_LABEL: &str = "All";

/// 单个筛选器的取值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterSelection<T> {
    All,
    Only(T),
}

impl<T> Default for FilterSelection<T> {
    fn default() -> Self {
        FilterSelection::All
    }
}

impl<T: PartialEq> FilterSelection<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            FilterSelection::All => true,
            FilterSelection::Only(expected) => expected == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, FilterSelection::All)
    }
}

impl<T: fmt::Display> fmt::Display for FilterSelection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterSelection::All => f.write_str(ALL_LABEL),
            FilterSelection::Only(value) => value.fmt(f),
        }
    }
}

impl<T> FromStr for FilterSelection<T>
where
    T: FromStr<Err = DashboardError>,
{
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case(ALL_LABEL) {
            Ok(FilterSelection::All)
        } else {
            s.parse().map(FilterSelection::Only)
        }
    }
}

impl<T: fmt::Display> Serialize for FilterSelection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, T> Deserialize<'de> for FilterSelection<T>
where
    T: FromStr<Err = DashboardError>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// 会话内的筛选状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub exam_type: FilterSelection<ExamType>,
    pub priority: FilterSelection<Priority>,
    pub findings: FilterSelection<Finding>,
}

impl FilterState {
    /// 从三个筛选器的原始字符串解析，缺省值视为 `All`
    pub fn parse(
        exam_type: Option<&str>,
        priority: Option<&str>,
        findings: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            exam_type: parse_selection(exam_type)?,
            priority: parse_selection(priority)?,
            findings: parse_selection(findings)?,
        })
    }

    /// 记录是否通过全部启用的谓词
    pub fn matches(&self, record: &PatientRecord) -> bool {
        self.exam_type.matches(&record.exam_type)
            && self.priority.matches(&record.priority)
            && self.findings.matches(&record.findings)
    }

    pub fn is_unfiltered(&self) -> bool {
        self.exam_type.is_all() && self.priority.is_all() && self.findings.is_all()
    }

    /// 可见子集在患者表中的下标，保持原始顺序
    pub fn visible_indices(&self, patients: &[PatientRecord]) -> Vec<usize> {
        patients
            .iter()
            .enumerate()
            .filter(|(_, record)| self.matches(record))
            .map(|(index, _)| index)
            .collect()
    }

    /// 应用筛选，返回可见记录
    pub fn apply<'a>(&self, patients: &'a [PatientRecord]) -> Vec<&'a PatientRecord> {
        patients.iter().filter(|record| self.matches(record)).collect()
    }
}

fn parse_selection<T>(raw: Option<&str>) -> Result<FilterSelection<T>>
where
    T: FromStr<Err = DashboardError>,
{
    match raw {
        None => Ok(FilterSelection::All),
        Some(value) if value.trim().is_empty() => Ok(FilterSelection::All),
        Some(value) => value.parse(),
    }
}

/// 分页查询（JSON接口使用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientQuery {
    pub filters: FilterState,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl Default for PatientQuery {
    fn default() -> Self {
        Self {
            filters: FilterState::default(),
            limit: Some(50),
            offset: Some(0),
        }
    }
}

impl PatientQuery {
    /// 返回 (总匹配数, 当前页记录)
    pub fn run<'a>(&self, patients: &'a [PatientRecord]) -> (usize, Vec<&'a PatientRecord>) {
        let items = self.filters.apply(patients);

        // 应用分页
        let offset = self.offset.unwrap_or(0);
        let limit = self.limit.unwrap_or(50);

        let total_items = items.len();
        let start = offset.min(total_items);
        let end = start.saturating_add(limit).min(total_items);

        (total_items, items[start..end].to_vec())
    }
}

/// 筛选下拉框的可选项，`All` 总是第一项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub exam_types: Vec<FilterSelection<ExamType>>,
    pub priorities: Vec<FilterSelection<Priority>>,
    pub findings: Vec<FilterSelection<Finding>>,
}

/// 检查类型选项取自数据集中实际出现的类型（按首次出现顺序），优先级与所见取全集
pub fn filter_options(patients: &[PatientRecord]) -> FilterOptions {
    let mut exam_types = vec![FilterSelection::All];
    for record in patients {
        let option = FilterSelection::Only(record.exam_type);
        if !exam_types.contains(&option) {
            exam_types.push(option);
        }
    }

    FilterOptions {
        exam_types,
        priorities: std::iter::once(FilterSelection::All)
            .chain(Priority::ALL.iter().copied().map(FilterSelection::Only))
            .collect(),
        findings: std::iter::once(FilterSelection::All)
            .chain(Finding::ALL.iter().copied().map(FilterSelection::Only))
            .collect(),
    }
}
