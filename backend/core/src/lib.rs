pub mod error;
pub mod event;
pub mod message;
pub mod tools;
pub mod traits;

pub use error::InsightError;
pub use event::{EventKind, EventSink, ReasoningEvent};
pub use message::{ChatMessage, Role};
pub use tools::ToolRegistry;
pub use traits::{LlmProvider, LlmRequest, LlmResponse, Tool};
