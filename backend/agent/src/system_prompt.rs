//! ReAct prompt assembly.
//!
//! The template carries `{name}` slots. Dataset-specific text is bound once
//! per dataset as a partial; the runtime slots are filled on every turn. All
//! slots are substituted in a single pass over the original template, so
//! values never get re-scanned for slot syntax.

use std::collections::HashMap;

use insightbot_config::SCHEMA_CONTEXT_SLOT;
use insightbot_core::ChatMessage;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static SLOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("slot pattern is valid"));

/// Replace each `{name}` whose name is in `values`; leave every other brace
/// sequence untouched.
pub fn fill_slots(template: &str, values: &HashMap<&str, &str>) -> String {
    SLOT.replace_all(template, |caps: &Captures<'_>| match values.get(&caps[1]) {
        Some(value) => (*value).to_string(),
        None => caps[0].to_string(),
    })
    .into_owned()
}

pub struct PromptComposer;

impl PromptComposer {
    /// Fill the schema-context slot and leave runtime slots for the loop.
    pub fn compose(template: &str, schema_context: &str) -> String {
        PromptTemplate::for_dataset(template, schema_context).composed()
    }
}

/// Per-turn values for the runtime slots.
#[derive(Debug, Clone, Default)]
pub struct PromptVars<'a> {
    pub tools: &'a str,
    pub tool_names: &'a str,
    pub chat_history: &'a str,
    pub input: &'a str,
    pub agent_scratchpad: &'a str,
}

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    partials: Vec<(String, String)>,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            partials: Vec::new(),
        }
    }

    pub fn for_dataset(template: impl Into<String>, schema_context: impl Into<String>) -> Self {
        Self::new(template).partial(SCHEMA_CONTEXT_SLOT, schema_context)
    }

    /// Bind a slot that stays fixed for the lifetime of this template.
    pub fn partial(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.partials.retain(|(existing, _)| *existing != name);
        self.partials.push((name, value.into()));
        self
    }

    fn partial_values(&self) -> HashMap<&str, &str> {
        self.partials
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    /// Template text with only the partials filled in.
    pub fn composed(&self) -> String {
        fill_slots(&self.template, &self.partial_values())
    }

    pub fn render(&self, vars: &PromptVars<'_>) -> String {
        let mut values = self.partial_values();
        values.insert("tools", vars.tools);
        values.insert("tool_names", vars.tool_names);
        values.insert("chat_history", vars.chat_history);
        values.insert("input", vars.input);
        values.insert("agent_scratchpad", vars.agent_scratchpad);
        fill_slots(&self.template, &values)
    }
}

/// One `role: content` line per prior message.
pub fn format_history(history: &[ChatMessage]) -> String {
    history
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n")
}
