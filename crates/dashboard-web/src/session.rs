//! 会话Cookie
//!
//! 请求通过Cookie携带会话ID。Cookie缺失、格式错误或会话已被淘汰时创建新会话，
//! 并在响应上附带 `Set-Cookie`。

use axum::{
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};
use dashboard_core::Result;
use dashboard_session::{SessionStore, SharedSession};
use tracing::{debug, warn};
use uuid::Uuid;

/// 当前请求对应的会话
pub struct SessionHandle {
    pub id: Uuid,
    pub session: SharedSession,
    pub created: bool,
}

impl SessionHandle {
    /// 获取或创建请求对应的会话
    pub async fn resolve(
        store: &dyn SessionStore,
        headers: &HeaderMap,
        cookie_name: &str,
    ) -> Result<Self> {
        let requested = session_id_from_headers(headers, cookie_name);
        let (id, session, created) = store.get_or_create(requested).await?;

        if created {
            if let Some(stale) = requested {
                debug!("Session {} not found, replaced with {}", stale, id);
            }
        }

        Ok(Self {
            id,
            session,
            created,
        })
    }

    /// 新建会话时在响应上写入Cookie
    pub fn respond(&self, cookie_name: &str, response: impl IntoResponse) -> Response {
        let mut response = response.into_response();
        if self.created {
            match HeaderValue::from_str(&session_cookie(cookie_name, self.id)) {
                Ok(value) => {
                    response.headers_mut().append(header::SET_COOKIE, value);
                }
                Err(e) => warn!("Invalid session cookie header: {}", e),
            }
        }
        response
    }
}

/// 从Cookie头中取出会话ID
pub fn session_id_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

pub fn session_cookie(cookie_name: &str, id: Uuid) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", cookie_name, id)
}
