//! 会话状态
//!
//! 一个浏览器连接的全部界面状态。数据集在会话创建时生成，之后只读；
//! 交互事件通过 [`SessionState::apply`] 分派到对应的更新规则。

use crate::filter::{filter_options, FilterOptions, FilterState};
use crate::rules::{ActionButton, ActiveTab, Interaction, RenderTarget, UpdateRule};
use chrono::{DateTime, Local, NaiveDate};
use dashboard_core::{utils::format_timestamp, PatientRecord, Result, WorkflowStepRecord};
use dashboard_data::{generate_dataset, Dataset, DashboardMetrics};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// 报告编辑器的默认内容
pub const DEFAULT_REPORT_TEXT: &str = "CLINICAL HISTORY: 65-year-old female with history of breast cancer, now with back pain.\n\nCOMPARISON: None provided.\n\nTECHNIQUE: CT chest, abdomen, and pelvis without contrast.\n\nFINDINGS:\nLUNGS: Clear. No focal consolidation, mass, or effusion.\nMEDIASTINUM: Normal cardiomediastinal silhouette.\nLIVER: Normal in size and attenuation. No focal lesions.\nKIDNEYS: Normal. No hydronephrosis or stones.\nBONES: Multiple sclerotic lesions throughout the spine, consistent with metastatic disease.\n\nIMPRESSION:\nMultiple osseous metastases, stable compared to prior.\nNo new lung nodules or abdominal metastases.\n\nRECOMMENDATION:\nContinue oncologic follow-up. Consider bone scan for further evaluation if clinically indicated.";

/// 规则执行结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleOutcome {
    pub rule: UpdateRule,
    pub targets: &'static [RenderTarget],
}

/// 单个会话的状态
#[derive(Debug, Clone)]
pub struct SessionState {
    id: Uuid,
    created_at: DateTime<Local>,
    dataset: Dataset,
    metrics: DashboardMetrics,
    filter_options: FilterOptions,
    active_tab: ActiveTab,
    filters: FilterState,
    visible: Vec<usize>,
    report_draft: String,
    last_updated: DateTime<Local>,
}

impl SessionState {
    /// 基于已生成的数据集创建会话
    pub fn new(id: Uuid, dataset: Dataset, now: DateTime<Local>) -> Self {
        let metrics = DashboardMetrics::compute(&dataset.patients);
        let filter_options = filter_options(&dataset.patients);
        let filters = FilterState::default();
        let visible = filters.visible_indices(&dataset.patients);

        Self {
            id,
            created_at: now,
            dataset,
            metrics,
            filter_options,
            active_tab: ActiveTab::default(),
            filters,
            visible,
            report_draft: DEFAULT_REPORT_TEXT.to_string(),
            last_updated: now,
        }
    }

    /// 生成数据集并创建会话，数据契约被破坏时直接失败
    pub fn generate(
        id: Uuid,
        seed: u64,
        reference_date: NaiveDate,
        now: DateTime<Local>,
    ) -> Result<Self> {
        let dataset = generate_dataset(seed, reference_date)?;
        Ok(Self::new(id, dataset, now))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn patients(&self) -> &[PatientRecord] {
        &self.dataset.patients
    }

    pub fn workflow(&self) -> &[WorkflowStepRecord] {
        &self.dataset.workflow
    }

    pub fn metrics(&self) -> &DashboardMetrics {
        &self.metrics
    }

    pub fn filter_options(&self) -> &FilterOptions {
        &self.filter_options
    }

    pub fn active_tab(&self) -> ActiveTab {
        self.active_tab
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn report_draft(&self) -> &str {
        &self.report_draft
    }

    pub fn last_updated(&self) -> DateTime<Local> {
        self.last_updated
    }

    /// "最后更新"的显示值
    pub fn last_updated_display(&self) -> String {
        format_timestamp(&self.last_updated)
    }

    /// 当前可见的患者记录，保持原始顺序
    pub fn visible_patients(&self) -> Vec<&PatientRecord> {
        self.visible
            .iter()
            .filter_map(|&index| self.dataset.patients.get(index))
            .collect()
    }

    /// 执行一次交互
    ///
    /// 规则只会写入自己声明的输出切片。`now` 仅被按钮规则使用。
    pub fn apply(&mut self, interaction: Interaction, now: DateTime<Local>) -> RuleOutcome {
        let rule = interaction.rule();
        match interaction {
            Interaction::SelectTab(tab) => self.select_tab(tab),
            Interaction::ChangeFilters(filters) => self.change_filters(filters),
            Interaction::ClickButton(button) => self.click_button(button, now),
            Interaction::EditReport(text) => self.edit_report(text),
        }

        debug!("Session {} applied rule {}", self.id, rule);
        RuleOutcome {
            rule,
            targets: rule.render_targets(),
        }
    }

    fn select_tab(&mut self, tab: ActiveTab) {
        if self.active_tab != tab {
            info!("Session {} switched tab from {} to {}", self.id, self.active_tab, tab);
        }
        self.active_tab = tab;
    }

    fn change_filters(&mut self, filters: FilterState) {
        self.filters = filters;
        self.visible = filters.visible_indices(&self.dataset.patients);
        info!(
            "Session {} filters changed (exam type: {}, priority: {}, findings: {}): {} of {} records visible",
            self.id,
            filters.exam_type,
            filters.priority,
            filters.findings,
            self.visible.len(),
            self.dataset.patients.len()
        );
    }

    fn click_button(&mut self, button: ActionButton, now: DateTime<Local>) {
        self.last_updated = now;
        info!(
            "Session {} clicked {}, last updated {}",
            self.id,
            button.label(),
            self.last_updated_display()
        );
    }

    fn edit_report(&mut self, text: String) {
        debug!("Session {} report draft updated ({} chars)", self.id, text.chars().count());
        self.report_draft = text;
    }

    /// 可序列化的会话快照
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            created_at: format_timestamp(&self.created_at),
            seed: self.dataset.seed,
            reference_date: self.dataset.reference_date,
            active_tab: self.active_tab,
            filters: self.filters,
            visible_patient_ids: self
                .visible_patients()
                .iter()
                .map(|record| record.id.clone())
                .collect(),
            report_draft: self.report_draft.clone(),
            last_updated: self.last_updated_display(),
            metrics: self.metrics.clone(),
        }
    }
}

/// 会话快照
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub created_at: String,
    pub seed: u64,
    pub reference_date: NaiveDate,
    pub active_tab: ActiveTab,
    pub filters: FilterState,
    pub visible_patient_ids: Vec<String>,
    pub report_draft: String,
    pub last_updated: String,
    pub metrics: DashboardMetrics,
}
