//! Reasoning event trail.
//!
//! Every thought, action, observation and final answer of a run is written
//! under the `reasoning_events` target, tagged with its session.

use chrono::{DateTime, Utc};
use insightbot_core::{EventSink, ReasoningEvent};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::redact::redact_sensitive_data;

pub const EVENT_TARGET: &str = "reasoning_events";

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub kind: String,
    pub payload: Value,
}

impl EventLogEntry {
    pub fn from_event(session_id: &str, event: &ReasoningEvent) -> Self {
        Self {
            session_id: session_id.into(),
            timestamp: event.timestamp,
            kind: event.kind.to_string(),
            payload: redact_value(&event.payload),
        }
    }
}

fn redact_value(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(redact_sensitive_data(s)),
        Value::Array(items) => Value::Array(items.iter().map(redact_value).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), redact_value(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

pub struct EventLogger;

impl EventLogger {
    pub fn log_event(session_id: &str, event: &ReasoningEvent) {
        let entry = EventLogEntry::from_event(session_id, event);
        let payload = serde_json::to_string(&entry.payload).unwrap_or_default();
        info!(
            target: EVENT_TARGET,
            session_id = %entry.session_id,
            kind = %entry.kind,
            at = %entry.timestamp.to_rfc3339(),
            payload = %payload,
            "reasoning event"
        );
    }
}

/// Create a sink whose events are logged for `session_id` until every
/// sender is dropped.
pub fn spawn_event_drain(session_id: impl Into<String>) -> (EventSink, JoinHandle<usize>) {
    let session_id = session_id.into();
    let (tx, mut rx) = mpsc::unbounded_channel::<ReasoningEvent>();
    let handle = tokio::spawn(async move {
        let mut count = 0;
        while let Some(event) = rx.recv().await {
            EventLogger::log_event(&session_id, &event);
            count += 1;
        }
        count
    });
    (tx, handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_redacts_nested_payload() {
        let event = ReasoningEvent::action("query_powerbi", "EVALUATE X // token=abc123");
        let entry = EventLogEntry::from_event("s-1", &event);
        assert_eq!(entry.kind, "action");
        let text = entry.payload.to_string();
        assert!(text.contains("token=[REDACTED]"));
        assert!(!text.contains("abc123"));
    }

    #[tokio::test]
    async fn test_drain_logs_until_senders_drop() {
        let (sink, handle) = spawn_event_drain("s-2");
        ReasoningEvent::thought("look at Tracker").emit(Some(&sink));
        ReasoningEvent::final_answer("42").emit(Some(&sink));
        drop(sink);
        assert_eq!(handle.await.unwrap(), 2);
    }
}
