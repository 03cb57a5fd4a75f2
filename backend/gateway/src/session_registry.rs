//! Live sessions, keyed by id.
//!
//! Each session sits behind its own mutex so one slow question never blocks
//! another user. A session nobody has touched for the idle timeout is
//! dropped along with its history and insights.

use std::sync::Arc;
use std::time::Duration;

use insightbot_agent::Session;
use moka::future::Cache;
use tokio::sync::Mutex;

pub type SessionHandle = Arc<Mutex<Session>>;

#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Cache<String, SessionHandle>,
}

impl SessionRegistry {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Cache::builder().time_to_idle(idle_timeout).build(),
        }
    }

    pub async fn insert(&self, session: Session) -> SessionHandle {
        let id = session.id.clone();
        let handle = Arc::new(Mutex::new(session));
        self.sessions.insert(id, handle.clone()).await;
        handle
    }

    /// Looking a session up counts as activity.
    pub async fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.get(id).await
    }

    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.remove(id).await.is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.run_pending_tasks().await;
        self.sessions.entry_count() as usize
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
