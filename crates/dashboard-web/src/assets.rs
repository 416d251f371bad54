//! 内嵌静态资源

use axum::{http::header, response::IntoResponse};

/// 看板样式表
pub const DASHBOARD_CSS: &str = r#"* {
    margin: 0;
    padding: 0;
    box-sizing: border-box;
}

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    background: #f5f7fa;
    color: #2c3e50;
}

.header {
    display: flex;
    justify-content: space-between;
    align-items: center;
    padding: 16px 24px;
    background: #1f3b57;
    color: white;
}

.header h1 {
    font-size: 1.6rem;
}

.timestamp {
    font-weight: 600;
}

.main {
    display: grid;
    grid-template-columns: 280px 1fr;
    gap: 20px;
    padding: 20px;
}

.panel {
    background: white;
    border-radius: 8px;
    padding: 16px;
    margin-bottom: 16px;
    box-shadow: 0 2px 6px rgba(0, 0, 0, 0.08);
}

.panel-title {
    margin-bottom: 12px;
}

.metric-grid {
    display: grid;
    grid-template-columns: 1fr 1fr;
    gap: 10px;
}

.metric-box {
    background: #eef3f8;
    border-radius: 6px;
    padding: 10px;
    text-align: center;
}

.metric-value {
    font-size: 1.4rem;
    color: #1f3b57;
}

.metric-label {
    font-size: 0.8rem;
    color: #607080;
}

.field {
    margin-bottom: 10px;
}

.field label {
    display: block;
    font-size: 0.85rem;
    margin-bottom: 4px;
}

.field select,
textarea {
    width: 100%;
    padding: 6px;
    border: 1px solid #c8d2dc;
    border-radius: 4px;
    font-family: inherit;
}

button {
    padding: 6px 12px;
    margin: 4px 4px 4px 0;
    border: none;
    border-radius: 4px;
    background: #2e6da4;
    color: white;
    cursor: pointer;
}

button:hover {
    background: #245a88;
}

button[type="button"] {
    background: #7a8a99;
}

.action-button {
    width: 100%;
}

.tabs {
    display: flex;
    gap: 4px;
    margin-bottom: 16px;
}

.tab {
    background: #dfe6ee;
    color: #2c3e50;
}

.tab.active {
    background: #1f3b57;
    color: white;
}

.tab-view {
    background: white;
    border-radius: 8px;
    padding: 16px;
}

.tab-intro {
    margin-bottom: 16px;
}

.chart-grid {
    display: grid;
    grid-template-columns: 1fr 1fr;
    gap: 16px;
    margin-bottom: 20px;
}

.chart {
    padding: 12px;
    border: 1px solid #e3e8ee;
    border-radius: 6px;
}

.chart-title {
    margin-bottom: 8px;
}

.bar-row {
    display: grid;
    grid-template-columns: 160px 1fr 90px;
    align-items: center;
    gap: 8px;
    font-size: 0.8rem;
    margin-bottom: 4px;
}

.bar-track {
    background: #eef1f4;
    height: 12px;
    border-radius: 6px;
}

.bar-fill {
    background: #2e6da4;
    height: 100%;
    border-radius: 6px;
}

.ai-yes .bar-fill {
    background: #2e9d5b;
}

.ai-no .bar-fill {
    background: #c0392b;
}

.finding-suspicious .bar-fill {
    background: #e08e0b;
}

.finding-critical .bar-fill {
    background: #c0392b;
}

.alerts .alert,
.card,
.suggestion {
    border-left: 4px solid #2e6da4;
    padding: 10px;
    margin: 8px 0;
    background: #fafbfc;
}

.tone-info { border-color: #2e86c1; }
.tone-success { border-color: #2e9d5b; }
.tone-warning { border-color: #e08e0b; }
.tone-danger { border-color: #c0392b; }
.tone-critical { border-color: #8e1b10; }

.alert-tag {
    font-size: 0.75rem;
    color: #607080;
}

.data-table {
    width: 100%;
    border-collapse: collapse;
    margin: 12px 0;
    font-size: 0.85rem;
}

.data-table th,
.data-table td {
    padding: 6px 8px;
    border-bottom: 1px solid #e3e8ee;
    text-align: left;
}

.data-table th {
    background: #eef3f8;
}

.row-critical {
    background: #fdecea;
}

.row-suspicious {
    background: #fff6e5;
}

.row-pending td:nth-child(7) {
    font-weight: 600;
}

.result-count {
    font-size: 0.85rem;
    color: #607080;
}
"#;

const CSS_CONTENT_TYPE: &str = "text/css; charset=utf-8";

/// 样式表处理器
pub async fn stylesheet() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, CSS_CONTENT_TYPE),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        DASHBOARD_CSS,
    )
}
