use crate::providers::base::ChatHistory;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Per-user conversational context. The history handle is shared between the
/// store's record and any in-flight dispatch; locking it serializes requests
/// for the same user.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub history: Arc<Mutex<ChatHistory>>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: Option<DateTime<Utc>>,
}

impl Session {
    fn new(user_id: String, history: ChatHistory) -> Self {
        Self {
            user_id,
            history: Arc::new(Mutex::new(history)),
            created_at: Utc::now(),
            last_activity_at: None,
        }
    }

    /// Reference point for idle-time calculation: last activity, or creation
    /// time for sessions that never carried a message.
    pub fn idle_since(&self) -> DateTime<Utc> {
        self.last_activity_at.unwrap_or(self.created_at)
    }
}

/// In-memory map from user identity to [`Session`]; the single source of
/// truth for "does this user have an open conversation". At most one session
/// exists per user at any time.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, user_id: &str) -> Option<Session> {
        self.sessions.lock().await.get(user_id).cloned()
    }

    /// Insert a fresh session for `user_id` unless one already exists; the
    /// existing session is returned untouched in that case, never replaced.
    pub async fn create_if_absent(&self, user_id: &str, history: ChatHistory) -> Session {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(user_id.to_string())
            .or_insert_with(|| {
                info!(user_id, "created new chat session");
                Session::new(user_id.to_string(), history)
            })
            .clone()
    }

    /// Mark activity on an existing session. A missing session is a no-op:
    /// it may have been evicted while a dispatch was in flight, and touching
    /// must never resurrect it.
    pub async fn touch(&self, user_id: &str, now: DateTime<Utc>) {
        let mut sessions = self.sessions.lock().await;
        match sessions.get_mut(user_id) {
            Some(session) => session.last_activity_at = Some(now),
            None => debug!(user_id, "touch on missing session ignored"),
        }
    }

    pub async fn remove(&self, user_id: &str) -> Option<Session> {
        let removed = self.sessions.lock().await.remove(user_id);
        if removed.is_some() {
            info!(user_id, "chat session removed");
        }
        removed
    }

    pub async fn remove_all(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        let count = sessions.len();
        sessions.clear();
        info!(sessions_removed = count, "all chat sessions erased");
        count
    }

    /// Point-in-time view of every session, for the eviction sweep.
    pub async fn snapshot(&self) -> Vec<(String, Session)> {
        self.sessions
            .lock()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}
