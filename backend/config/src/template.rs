//! The instruction template handed to the LLM.
//!
//! The template text is the behavioral contract for query formatting (scalar
//! `EVALUATE CALCULATE(...)` versus table `EVALUATE <table expr>`). Keep it
//! byte-for-byte; edit `promptTemplatePath` to experiment instead.

/// Slot filled once per dataset with its schema description.
pub const SCHEMA_CONTEXT_SLOT: &str = "schema_context";

/// Slots filled by the reasoning loop on every invocation.
pub const RUNTIME_SLOTS: [&str; 5] = ["tools", "tool_names", "chat_history", "input", "agent_scratchpad"];

/// Built-in ReAct template.
pub const CORE_TEMPLATE: &str = include_str!("../assets/react_template.txt");
