//! 会话存储
//!
//! 每个会话独立生成自己的数据集，不与其他会话共享任何可变状态。
//! 同一会话内的交互通过互斥锁串行执行。

use crate::state::SessionState;
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use dashboard_core::{DashboardError, Result};
use dashboard_data::{generate_dataset, DEFAULT_SEED};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

/// 共享的会话句柄
pub type SharedSession = Arc<Mutex<SessionState>>;

/// 会话创建参数
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// 数据生成种子
    pub seed: u64,
    /// 检查日期基准，缺省为会话创建当天
    pub reference_date: Option<NaiveDate>,
    /// 最大会话数，超出时淘汰最久未访问的会话
    pub max_sessions: usize,
}

impl SessionSettings {
    /// 生效的日期基准
    pub fn reference_date_or(&self, today: NaiveDate) -> NaiveDate {
        self.reference_date.unwrap_or(today)
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            reference_date: None,
            max_sessions: 1000,
        }
    }
}

/// 会话存储接口
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// 创建新会话
    async fn create(&self) -> Result<(Uuid, SharedSession)>;

    /// 获取会话
    async fn get(&self, id: &Uuid) -> Option<SharedSession>;

    /// 删除会话
    async fn remove(&self, id: &Uuid) -> bool;

    /// 当前会话数
    async fn count(&self) -> usize;

    /// 获取已有会话，不存在时创建；返回值的布尔量表示是否新建
    async fn get_or_create(&self, id: Option<Uuid>) -> Result<(Uuid, SharedSession, bool)> {
        if let Some(id) = id {
            if let Some(session) = self.get(&id).await {
                return Ok((id, session, false));
            }
        }

        let (id, session) = self.create().await?;
        Ok((id, session, true))
    }
}

#[derive(Debug, Default)]
struct StoreInner {
    sessions: HashMap<Uuid, SharedSession>,
    // 按最近访问排序的会话ID，队首最久未访问
    order: VecDeque<Uuid>,
}

/// 内存会话存储
#[derive(Debug)]
pub struct InMemorySessionStore {
    settings: SessionSettings,
    inner: RwLock<StoreInner>,
}

impl InMemorySessionStore {
    /// 创建存储，并用当前设置试生成一次数据集，违反生成契约时直接失败
    pub fn new(settings: SessionSettings) -> Result<Self> {
        if settings.max_sessions == 0 {
            return Err(DashboardError::Config(
                "max_sessions must be greater than zero".to_string(),
            ));
        }

        let reference_date = settings.reference_date_or(Local::now().date_naive());
        generate_dataset(settings.seed, reference_date)?;
        info!(
            "Session store ready (seed {}, reference date {})",
            settings.seed, reference_date
        );

        Ok(Self {
            settings,
            inner: RwLock::new(StoreInner::default()),
        })
    }

    fn build_session(&self, id: Uuid) -> Result<SessionState> {
        let now = Local::now();
        let reference_date = self.settings.reference_date_or(now.date_naive());
        SessionState::generate(id, self.settings.seed, reference_date, now)
    }
}

impl StoreInner {
    fn touch(&mut self, id: &Uuid) {
        if let Some(position) = self.order.iter().position(|existing| existing == id) {
            self.order.remove(position);
            self.order.push_back(*id);
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self) -> Result<(Uuid, SharedSession)> {
        let id = Uuid::new_v4();
        // 数据集在锁外生成
        let session = Arc::new(Mutex::new(self.build_session(id)?));

        let mut inner = self.inner.write().await;
        while inner.sessions.len() >= self.settings.max_sessions {
            match inner.order.pop_front() {
                Some(evicted) => {
                    inner.sessions.remove(&evicted);
                    warn!("Session store full, evicted session {}", evicted);
                }
                None => break,
            }
        }

        inner.sessions.insert(id, session.clone());
        inner.order.push_back(id);

        info!("Created session {} ({} active)", id, inner.sessions.len());
        Ok((id, session))
    }

    async fn get(&self, id: &Uuid) -> Option<SharedSession> {
        let mut inner = self.inner.write().await;
        let session = inner.sessions.get(id).cloned()?;
        inner.touch(id);
        Some(session)
    }

    async fn remove(&self, id: &Uuid) -> bool {
        let mut inner = self.inner.write().await;
        let removed = inner.sessions.remove(id).is_some();
        if removed {
            inner.order.retain(|existing| existing != id);
            info!("Removed session {}", id);
        }
        removed
    }

    async fn count(&self) -> usize {
        self.inner.read().await.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterSelection, FilterState};
    use crate::rules::{ActiveTab, Interaction};
    use dashboard_core::Priority;

    fn store(max_sessions: usize) -> InMemorySessionStore {
        InMemorySessionStore::new(SessionSettings {
            reference_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            max_sessions,
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let store = store(10);
        let (first_id, first) = store.create().await.unwrap();
        let (second_id, second) = store.create().await.unwrap();
        assert_ne!(first_id, second_id);

        {
            let mut first = first.lock().await;
            first.apply(Interaction::SelectTab(ActiveTab::Workflow), Local::now());
            first.apply(
                Interaction::ChangeFilters(FilterState {
                    priority: FilterSelection::Only(Priority::High),
                    ..Default::default()
                }),
                Local::now(),
            );
            first.apply(Interaction::EditReport("changed".to_string()), Local::now());
        }

        let second = second.lock().await;
        assert_eq!(second.active_tab(), ActiveTab::Overview);
        assert!(second.filters().is_unfiltered());
        assert_eq!(second.visible_patients().len(), 50);
        assert_eq!(second.report_draft(), crate::state::DEFAULT_REPORT_TEXT);

        // 相同种子得到相同数据，但各自持有一份
        let first = first.lock().await;
        assert_eq!(first.patients(), second.patients());
    }

    #[tokio::test]
    async fn test_get_or_create() {
        let store = store(10);

        let (id, _, created) = store.get_or_create(None).await.unwrap();
        assert!(created);

        let (same_id, _, created) = store.get_or_create(Some(id)).await.unwrap();
        assert!(!created);
        assert_eq!(same_id, id);

        let (other_id, _, created) = store.get_or_create(Some(Uuid::new_v4())).await.unwrap();
        assert!(created);
        assert_ne!(other_id, id);
        assert_eq!(store.count().await, 2);
    }

    #[tokio::test]
    async fn test_oldest_session_is_evicted() {
        let store = store(2);
        let (first, _) = store.create().await.unwrap();
        let (second, _) = store.create().await.unwrap();
        let (third, _) = store.create().await.unwrap();

        assert_eq!(store.count().await, 2);
        assert!(store.get(&first).await.is_none());
        assert!(store.get(&second).await.is_some());
        assert!(store.get(&third).await.is_some());
    }

    #[tokio::test]
    async fn test_recently_used_session_survives_eviction() {
        let store = store(2);
        let (active, _) = store.create().await.unwrap();
        let (idle, _) = store.create().await.unwrap();

        let session = store.get(&active).await.unwrap();
        session
            .lock()
            .await
            .apply(Interaction::SelectTab(ActiveTab::Reports), Local::now());

        let (newest, _) = store.create().await.unwrap();
        assert_eq!(store.count().await, 2);
        assert!(store.get(&idle).await.is_none());
        assert!(store.get(&newest).await.is_some());

        let session = store.get(&active).await.unwrap();
        assert_eq!(session.lock().await.active_tab(), ActiveTab::Reports);
    }

    #[test]
    fn test_unusable_reference_date_is_rejected_at_construction() {
        for date in [NaiveDate::MAX, NaiveDate::MIN] {
            let result = InMemorySessionStore::new(SessionSettings {
                reference_date: Some(date),
                ..Default::default()
            });
            assert!(matches!(result, Err(DashboardError::InvariantViolation(_))));
        }
    }

    #[tokio::test]
    async fn test_remove() {
        let store = store(2);
        let (id, _) = store.create().await.unwrap();
        assert!(store.remove(&id).await);
        assert!(!store.remove(&id).await);
        assert_eq!(store.count().await, 0);
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let result = InMemorySessionStore::new(SessionSettings {
            max_sessions: 0,
            ..Default::default()
        });
        assert!(matches!(result, Err(DashboardError::Config(_))));
    }
}
