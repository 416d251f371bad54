//! Web服务器

use axum::{
    routing::{get, post},
    Router,
};
use dashboard_core::Result;
use dashboard_session::SessionStore;
use dashboard_view::paths;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::assets::stylesheet;
use crate::handlers::{
    api_root, change_filters, click_button, edit_report, fragment, health, list_patients,
    metrics, not_found, page, select_tab, session_snapshot, view_tree, workflow,
};

/// 处理器共享状态
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SessionStore>,
    pub cookie_name: String,
}

impl AppState {
    pub fn new(store: Arc<dyn SessionStore>, cookie_name: impl Into<String>) -> Self {
        Self {
            store,
            cookie_name: cookie_name.into(),
        }
    }
}

pub struct WebServer {
    addr: SocketAddr,
    app: Router,
}

impl WebServer {
    pub fn new(addr: SocketAddr, state: AppState) -> Self {
        let app = create_app(state);
        Self { addr, app }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn run(self) -> Result<()> {
        info!("Starting dashboard server on http://{}", self.addr);

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(listener, self.app).await?;

        Ok(())
    }
}

/// 构建路由
pub fn create_app(state: AppState) -> Router {
    Router::new()
        // 页面与片段
        .route(paths::PAGE, get(page))
        .route("/fragments/:target", get(fragment))

        // 交互
        .route(paths::TAB, post(select_tab))
        .route(paths::FILTERS, post(change_filters))
        .route("/actions/:button", post(click_button))
        .route(paths::REPORT, post(edit_report))

        // 静态资源
        .route(paths::STYLESHEET, get(stylesheet))

        // 健康检查
        .route("/health", get(health))

        // API路由
        .nest("/api/v1", api_routes())
        .fallback(not_found)
        .with_state(state)

        // 全局中间件
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
}

/// API v1 路由
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(api_root))
        .route("/patients", get(list_patients))
        .route("/metrics", get(metrics))
        .route("/workflow", get(workflow))
        .route("/session", get(session_snapshot))
        .route("/view", get(view_tree))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, Response, StatusCode};
    use chrono::NaiveDate;
    use dashboard_session::{InMemorySessionStore, SessionSettings};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    const COOKIE: &str = "dashboard_session";
    const FORM: &str = "application/x-www-form-urlencoded";

    fn test_app() -> Router {
        let store = InMemorySessionStore::new(SessionSettings {
            reference_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            max_sessions: 16,
            ..Default::default()
        })
        .unwrap();
        create_app(AppState::new(Arc::new(store), COOKIE))
    }

    fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn form_request(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, FORM);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn session_cookie(response: &Response<Body>) -> Option<String> {
        response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(str::to_string)
    }

    async fn body_text(response: Response<Body>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: Response<Body>) -> Value {
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    /// 打开页面并返回会话Cookie
    async fn open_session(app: &Router) -> String {
        let response = app.clone().oneshot(get_request("/", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        session_cookie(&response).unwrap()
    }

    #[tokio::test]
    async fn page_creates_session() {
        let app = test_app();
        let response = app.oneshot(get_request("/", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = session_cookie(&response).unwrap();
        assert!(cookie.starts_with("dashboard_session="));
        assert!(response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/html"));

        let html = body_text(response).await;
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Radiology AI Workflow Dashboard"));
        assert!(html.contains("id=\"tabs-content\""));
        assert!(html.contains("id=\"overview-view\""));
        assert!(!html.contains("id=\"patient-table\""));
    }

    #[tokio::test]
    async fn existing_session_is_reused() {
        let app = test_app();
        let cookie = open_session(&app).await;

        let response = app
            .clone()
            .oneshot(get_request("/", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(session_cookie(&response).is_none());

        let stale = format!("{}={}", COOKIE, uuid::Uuid::new_v4());
        let response = app.oneshot(get_request("/", Some(&stale))).await.unwrap();
        assert!(session_cookie(&response).is_some());
    }

    #[tokio::test]
    async fn tab_selection_redirects_and_switches_content() {
        let app = test_app();
        let cookie = open_session(&app).await;

        let response = app
            .clone()
            .oneshot(form_request("/tab", "tab=patients", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");

        let response = app
            .clone()
            .oneshot(get_request("/fragments/tab-content", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("id=\"patients-view\""));
        assert!(html.contains("id=\"patient-table\""));
        assert!(!html.contains("id=\"overview-view\""));

        let response = app
            .oneshot(get_request("/fragments/tabs", Some(&cookie)))
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(html.contains("class=\"tab active\" id=\"tab-patients\""));
    }

    #[tokio::test]
    async fn invalid_tab_is_rejected() {
        let app = test_app();
        let response = app
            .clone()
            .oneshot(form_request("/tab", "tab=settings", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], true);
        assert_eq!(json["status"], 400);

        let response = app.oneshot(form_request("/tab", "", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn filters_drive_visible_patients() {
        let app = test_app();
        let cookie = open_session(&app).await;

        let response = app
            .clone()
            .oneshot(form_request(
                "/filters",
                "exam_type=MRI&priority=All&findings=Critical",
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let snapshot = body_json(
            app.clone()
                .oneshot(get_request("/api/v1/session", Some(&cookie)))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(snapshot["filters"]["exam_type"], "MRI");
        assert_eq!(snapshot["filters"]["priority"], "All");

        let queried = body_json(
            app.clone()
                .oneshot(get_request(
                    "/api/v1/patients?exam_type=MRI&findings=Critical",
                    Some(&cookie),
                ))
                .await
                .unwrap(),
        )
        .await;

        let visible: Vec<&str> = snapshot["visible_patient_ids"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        let queried_ids: Vec<&str> = queried["patients"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|p| p["id"].as_str())
            .collect();
        assert_eq!(visible, queried_ids);
        assert_eq!(queried["total"], visible.len());

        let response = app
            .clone()
            .oneshot(get_request("/fragments/patient-table", Some(&cookie)))
            .await
            .unwrap();
        let html = body_text(response).await;
        assert_eq!(html.matches("data-patient-id=").count(), visible.len());
    }

    #[tokio::test]
    async fn invalid_filter_value_is_rejected() {
        let app = test_app();
        let response = app
            .oneshot(form_request("/filters", "priority=Urgent", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn action_buttons_leave_data_untouched() {
        let app = test_app();
        let cookie = open_session(&app).await;

        let before = body_json(
            app.clone()
                .oneshot(get_request("/api/v1/patients", Some(&cookie)))
                .await
                .unwrap(),
        )
        .await;

        for action in ["run-ai-analysis", "generate-reports"] {
            let response = app
                .clone()
                .oneshot(form_request(&format!("/actions/{}", action), "", Some(&cookie)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER);
        }

        let after = body_json(
            app.clone()
                .oneshot(get_request("/api/v1/patients", Some(&cookie)))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(before, after);

        let response = app
            .oneshot(form_request("/actions/delete-everything", "", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn report_draft_is_saved() {
        let app = test_app();
        let cookie = open_session(&app).await;

        let response = app
            .clone()
            .oneshot(form_request(
                "/report",
                "report=IMPRESSION%3A+stable%0D%0ANo+change",
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let snapshot = body_json(
            app.oneshot(get_request("/api/v1/session", Some(&cookie)))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(snapshot["report_draft"], "IMPRESSION: stable\nNo change");
    }

    #[tokio::test]
    async fn sessions_do_not_share_state() {
        let app = test_app();
        let first = open_session(&app).await;
        let second = open_session(&app).await;
        assert_ne!(first, second);

        app.clone()
            .oneshot(form_request("/tab", "tab=workflow", Some(&first)))
            .await
            .unwrap();

        let snapshot = body_json(
            app.oneshot(get_request("/api/v1/session", Some(&second)))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(snapshot["active_tab"], "overview");
    }

    #[tokio::test]
    async fn unknown_fragment_and_route_return_404() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(get_request("/fragments/sidebar", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app.oneshot(get_request("/nowhere", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"], true);
    }

    #[tokio::test]
    async fn api_endpoints() {
        let app = test_app();

        let response = app.clone().oneshot(get_request("/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "healthy");

        let response = app.clone().oneshot(get_request("/api/v1", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let metrics = body_json(
            app.clone()
                .oneshot(get_request("/api/v1/metrics", None))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(metrics["metrics"]["total_patients"], 50);
        assert_eq!(metrics["confidence_histogram"].as_array().unwrap().len(), 10);

        let workflow = body_json(
            app.clone()
                .oneshot(get_request("/api/v1/workflow", None))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(workflow["steps"].as_array().unwrap().len(), 6);
        assert_eq!(workflow["steps"][0]["step"], "Order Received");

        let page = body_json(
            app.clone()
                .oneshot(get_request("/api/v1/patients?limit=5&offset=10", None))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(page["total"], 50);
        assert_eq!(page["patients"].as_array().unwrap().len(), 5);
        assert_eq!(page["patients"][0]["id"], "P1010");

        let view = body_json(app.oneshot(get_request("/api/v1/view", None)).await.unwrap()).await;
        assert_eq!(view["type"], "element");
        assert_eq!(view["attrs"]["id"], "app");
    }

    #[tokio::test]
    async fn stylesheet_is_served() {
        let app = test_app();
        let response = app
            .oneshot(get_request("/static/dashboard.css", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/css; charset=utf-8"
        );
        assert!(body_text(response).await.contains(".metric-box"));
    }
}
