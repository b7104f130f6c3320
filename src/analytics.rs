//! Per-session visit and conversion tracking.
//!
//! Each browser session gets its own [`SessionAnalytics`], created on first
//! use and dropped on logout through [`AnalyticsStore::end_session`].
//! Anonymous visitors never log out, so sessions also expire after a period
//! of inactivity and the store holds a bounded number of them.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::events::{AnalyticsEvent, DomainEvent};

/// Upper bound on a session's lifetime, however active it is.
const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAnalytics {
    visited_paths: HashSet<String>,
    page_views: u64,
    conversions: u64,
}

impl SessionAnalytics {
    /// Counts a view; returns `true` only the first time `path` is seen.
    pub fn record_visit(&mut self, path: &str) -> bool {
        self.page_views += 1;
        self.visited_paths.insert(normalize_path(path))
    }

    /// Undoes a first visit that could not be stored.
    pub fn forget_visit(&mut self, path: &str) -> bool {
        let removed = self.visited_paths.remove(&normalize_path(path));
        if removed {
            self.page_views = self.page_views.saturating_sub(1);
        }
        removed
    }

    pub fn record_conversion(&mut self) { self.conversions += 1; }

    pub fn unique_pages(&self) -> usize { self.visited_paths.len() }
    pub fn page_views(&self) -> u64 { self.page_views }
    pub fn conversions(&self) -> u64 { self.conversions }
}

/// Query strings and trailing slashes do not make a page distinct.
fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/".to_string() } else { trimmed.to_string() }
}

/// Session id -> analytics, bounded in size and expiring idle sessions.
#[derive(Clone)]
pub struct AnalyticsStore {
    sessions: Cache<String, Arc<Mutex<SessionAnalytics>>>,
}

impl AnalyticsStore {
    pub fn with_limits(max_sessions: u64, idle_timeout: Duration) -> Self {
        Self {
            sessions: Cache::builder()
                .max_capacity(max_sessions)
                .time_to_live(SESSION_TTL)
                .time_to_idle(idle_timeout)
                .build(),
        }
    }

    async fn session_entry(&self, session_id: &str) -> Arc<Mutex<SessionAnalytics>> {
        self.sessions
            .get_with(session_id.to_string(), async { Arc::new(Mutex::new(SessionAnalytics::default())) })
            .await
    }

    /// Records a page view. A first visit yields the event to publish.
    pub async fn record_visit(&self, session_id: &str, path: &str) -> Option<DomainEvent> {
        let first = self.session_entry(session_id).await.lock().await.record_visit(path);
        debug!(session_id, path, first, "page visit recorded");
        first.then(|| DomainEvent::Analytics(AnalyticsEvent::PageVisited {
            session_id: session_id.to_string(),
            path: normalize_path(path),
        }))
    }

    /// Rolls back [`Self::record_visit`] so the next view counts as first again.
    pub async fn forget_visit(&self, session_id: &str, path: &str) {
        if let Some(session) = self.sessions.get(session_id).await {
            session.lock().await.forget_visit(path);
        }
    }

    pub async fn record_conversion(&self, session_id: &str) {
        self.session_entry(session_id).await.lock().await.record_conversion();
    }

    /// Snapshot of a live session.
    pub async fn session(&self, session_id: &str) -> Option<SessionAnalytics> {
        let session = self.sessions.get(session_id).await?;
        let snapshot = session.lock().await.clone();
        Some(snapshot)
    }

    /// Forgets everything recorded for the session. Returns whether it existed.
    pub async fn end_session(&self, session_id: &str) -> bool {
        let removed = self.sessions.remove(session_id).await.is_some();
        debug!(session_id, removed, "analytics session ended");
        removed
    }
}
