//! Structured logging for insightbot.
//!
//! Console plus rolling NDJSON file output, secret scrubbing, and the
//! reasoning-event trail for each session.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{spawn_event_drain, EventLogEntry, EventLogger};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
