use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Channel end the reasoning loop publishes intermediate steps to.
///
/// Nobody is required to listen; a closed or absent receiver never changes
/// what the loop does.
pub type EventSink = mpsc::UnboundedSender<ReasoningEvent>;

/// An intermediate step emitted while answering a question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningEvent {
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
    pub payload: serde_json::Value,
}

/// Categories of reasoning steps.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The model's free-text reasoning before it picked an action
    Thought,
    /// A tool call chosen by the model
    Action,
    /// The text a tool call (or a parse failure) fed back to the model
    Observation,
    /// The terminal answer
    Final,
}

impl ReasoningEvent {
    pub fn new(kind: EventKind, payload: serde_json::Value) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
            payload,
        }
    }

    pub fn thought(text: impl Into<String>) -> Self {
        Self::new(EventKind::Thought, serde_json::json!({ "text": text.into() }))
    }

    pub fn action(tool: &str, input: &str) -> Self {
        Self::new(
            EventKind::Action,
            serde_json::json!({ "tool": tool, "input": input }),
        )
    }

    pub fn observation(text: impl Into<String>) -> Self {
        Self::new(EventKind::Observation, serde_json::json!({ "text": text.into() }))
    }

    pub fn final_answer(text: impl Into<String>) -> Self {
        Self::new(EventKind::Final, serde_json::json!({ "text": text.into() }))
    }

    /// Send to an optional sink, ignoring a dropped receiver.
    pub fn emit(self, sink: Option<&EventSink>) {
        if let Some(tx) = sink {
            let _ = tx.send(self);
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_else(|| format!("{:?}", self));
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_payload() {
        let event = ReasoningEvent::action("query_powerbi", "EVALUATE CALCULATE( COUNTROWS(Tracker) )");
        assert_eq!(event.kind, EventKind::Action);
        assert_eq!(event.payload["tool"], "query_powerbi");
    }

    #[test]
    fn test_emit_without_receiver_is_silent() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        ReasoningEvent::thought("still fine").emit(Some(&tx));
        ReasoningEvent::thought("no sink").emit(None);
    }

    #[test]
    fn test_event_kind_display() {
        assert_eq!(EventKind::Observation.to_string(), "observation");
        assert_eq!(EventKind::Final.to_string(), "final");
    }
}
