//! HTTP处理器

use crate::error::{ApiError, ApiResult};
use crate::server::AppState;
use crate::session::SessionHandle;
use axum::{
    extract::{Form, Path, Query, State},
    http::{HeaderMap, Uri},
    response::{Html, IntoResponse, Json, Redirect, Response},
};
use dashboard_core::DashboardError;
use dashboard_data::{
    confidence_histogram, cumulative_completion, exam_type_distribution, findings_by_priority,
};
use dashboard_session::{
    ActionButton, ActiveTab, FilterState, Interaction, PatientQuery, RenderTarget,
};
use dashboard_view::{paths, render_document, render_page, render_target, to_html, TITLE};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

const HISTOGRAM_BINS: usize = 10;

/// 标签页表单
#[derive(Debug, Deserialize)]
pub struct TabForm {
    pub tab: Option<String>,
}

/// 筛选表单，缺省字段视为 `All`
#[derive(Debug, Default, Deserialize)]
pub struct FilterForm {
    pub exam_type: Option<String>,
    pub priority: Option<String>,
    pub findings: Option<String>,
}

impl FilterForm {
    fn parse(&self) -> ApiResult<FilterState> {
        Ok(FilterState::parse(
            self.exam_type.as_deref(),
            self.priority.as_deref(),
            self.findings.as_deref(),
        )?)
    }
}

/// 报告编辑表单
#[derive(Debug, Default, Deserialize)]
pub struct ReportForm {
    #[serde(default)]
    pub report: String,
}

/// 患者查询参数
#[derive(Debug, Default, Deserialize)]
pub struct PatientQueryParams {
    pub exam_type: Option<String>,
    pub priority: Option<String>,
    pub findings: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

async fn resolve(state: &AppState, headers: &HeaderMap) -> ApiResult<SessionHandle> {
    Ok(SessionHandle::resolve(state.store.as_ref(), headers, &state.cookie_name).await?)
}

/// 执行交互后重定向回页面
async fn interact(
    state: &AppState,
    headers: &HeaderMap,
    interaction: Interaction,
) -> ApiResult<Response> {
    let handle = resolve(state, headers).await?;
    let outcome = {
        let mut session = handle.session.lock().await;
        session.apply(interaction, chrono::Local::now())
    };

    debug!(
        "Session {} rule {} invalidated {:?}",
        handle.id, outcome.rule, outcome.targets
    );
    Ok(handle.respond(&state.cookie_name, Redirect::to(paths::PAGE)))
}

/// 页面
pub async fn page(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let handle = resolve(&state, &headers).await?;
    let html = {
        let session = handle.session.lock().await;
        render_document(TITLE, paths::STYLESHEET, &render_page(&session))
    };

    Ok(handle.respond(&state.cookie_name, Html(html)))
}

/// 单个可重新渲染的子树
pub async fn fragment(
    State(state): State<AppState>,
    Path(target): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let target: RenderTarget = target.parse()?;
    let handle = resolve(&state, &headers).await?;
    let html = {
        let session = handle.session.lock().await;
        to_html(&render_target(target, &session))
    };

    Ok(handle.respond(&state.cookie_name, Html(html)))
}

/// 切换标签页
pub async fn select_tab(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<TabForm>,
) -> ApiResult<Response> {
    let raw = form
        .tab
        .ok_or_else(|| DashboardError::Validation("Missing form field: tab".to_string()))?;
    let tab: ActiveTab = raw.parse()?;

    interact(&state, &headers, Interaction::SelectTab(tab)).await
}

/// 修改筛选
pub async fn change_filters(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<FilterForm>,
) -> ApiResult<Response> {
    let filters = form.parse()?;
    interact(&state, &headers, Interaction::ChangeFilters(filters)).await
}

/// 点击动作按钮
pub async fn click_button(
    State(state): State<AppState>,
    Path(button): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let button: ActionButton = button.parse()?;
    interact(&state, &headers, Interaction::ClickButton(button)).await
}

/// 保存报告草稿
pub async fn edit_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ReportForm>,
) -> ApiResult<Response> {
    // 浏览器以CRLF提交textarea
    let text = form.report.replace("\r\n", "\n");
    interact(&state, &headers, Interaction::EditReport(text)).await
}

/// API根路径
pub async fn api_root() -> impl IntoResponse {
    Json(json!({
        "service": "Radiology AI Workflow Dashboard",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "health": "/health",
            "patients": "/api/v1/patients",
            "metrics": "/api/v1/metrics",
            "workflow": "/api/v1/workflow",
            "session": "/api/v1/session",
            "view": "/api/v1/view",
            "fragments": "/fragments/{last-updated|tabs|tab-content|patient-table}"
        }
    }))
}

/// 健康检查
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": state.store.count().await
    }))
}

/// 患者查询
pub async fn list_patients(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<PatientQueryParams>,
) -> ApiResult<Response> {
    let filters = FilterState::parse(
        params.exam_type.as_deref(),
        params.priority.as_deref(),
        params.findings.as_deref(),
    )?;
    let query = PatientQuery {
        filters,
        limit: params.limit,
        offset: params.offset,
    };
    let defaults = PatientQuery::default();

    let handle = resolve(&state, &headers).await?;
    let body = {
        let session = handle.session.lock().await;
        let (total, patients) = query.run(session.patients());
        info!("Patient query returned {} of {} matches", patients.len(), total);
        json!({
            "patients": patients,
            "total": total,
            "offset": query.offset.or(defaults.offset),
            "limit": query.limit.or(defaults.limit)
        })
    };

    Ok(handle.respond(&state.cookie_name, Json(body)))
}

/// 汇总指标与图表数据
pub async fn metrics(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let handle = resolve(&state, &headers).await?;
    let body = {
        let session = handle.session.lock().await;
        let patients = session.patients();
        json!({
            "metrics": session.metrics(),
            "exam_types": exam_type_distribution(patients),
            "findings_by_priority": findings_by_priority(patients),
            "confidence_histogram": confidence_histogram(patients, HISTOGRAM_BINS)
        })
    };

    Ok(handle.respond(&state.cookie_name, Json(body)))
}

/// 工作流统计
pub async fn workflow(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let handle = resolve(&state, &headers).await?;
    let body = {
        let session = handle.session.lock().await;
        json!({
            "steps": session.workflow(),
            "cumulative": cumulative_completion(session.workflow())
        })
    };

    Ok(handle.respond(&state.cookie_name, Json(body)))
}

/// 会话快照
pub async fn session_snapshot(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let handle = resolve(&state, &headers).await?;
    let snapshot = handle.session.lock().await.snapshot();

    Ok(handle.respond(&state.cookie_name, Json(snapshot)))
}

/// 整页显示树
pub async fn view_tree(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let handle = resolve(&state, &headers).await?;
    let tree = render_page(&*handle.session.lock().await);

    Ok(handle.respond(&state.cookie_name, Json(tree)))
}

/// 未匹配的路由
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError(DashboardError::NotFound(format!("No route for {}", uri.path())))
}
