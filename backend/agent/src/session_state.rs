//! Per-user conversation state.
//!
//! Owned by exactly one caller at a time; the gateway wraps each session in
//! its own mutex.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use insightbot_core::ChatMessage;
use serde::{Deserialize, Serialize};

/// Memoized key-insights text for one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightsEntry {
    pub text: String,
    /// False when the text is an error report rather than a summary.
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub authenticated: bool,
    history: Vec<ChatMessage>,
    active_dataset: Option<String>,
    insights: HashMap<String, InsightsEntry>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string())
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: Utc::now(),
            authenticated: false,
            history: Vec::new(),
            active_dataset: None,
            insights: HashMap::new(),
        }
    }

    /// Conversation so far, oldest first. Only ever appended to.
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.history.push(message);
    }

    pub fn active_dataset(&self) -> Option<&str> {
        self.active_dataset.as_deref()
    }

    /// Switch datasets; returns true when the key actually changed.
    pub fn set_active_dataset(&mut self, key: &str) -> bool {
        if self.active_dataset.as_deref() == Some(key) {
            return false;
        }
        self.active_dataset = Some(key.to_string());
        true
    }

    pub fn insights(&self, key: &str) -> Option<&InsightsEntry> {
        self.insights.get(key)
    }

    pub fn remember_insights(&mut self, key: &str, entry: InsightsEntry) {
        self.insights.insert(key.to_string(), entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_unauthenticated_and_empty() {
        let session = Session::new();
        assert!(!session.authenticated);
        assert!(session.history().is_empty());
        assert!(session.active_dataset().is_none());
        assert!(uuid::Uuid::parse_str(&session.id).is_ok());
    }

    #[test]
    fn dataset_switch_reports_change() {
        let mut session = Session::new();
        assert!(session.set_active_dataset("A"));
        assert!(!session.set_active_dataset("A"));
        assert!(session.set_active_dataset("B"));
        assert_eq!(session.active_dataset(), Some("B"));
    }

    #[test]
    fn insights_are_keyed_by_dataset() {
        let mut session = Session::new();
        session.remember_insights(
            "A",
            InsightsEntry {
                text: "summary".into(),
                ok: true,
            },
        );
        assert_eq!(session.insights("A").map(|e| e.text.as_str()), Some("summary"));
        assert!(session.insights("B").is_none());
    }
}
