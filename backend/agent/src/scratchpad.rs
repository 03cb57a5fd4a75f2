//! Intermediate steps of a single ReAct run, rendered back into the prompt.

use crate::react_parser::AgentAction;

const OBSERVATION_PREFIX: &str = "Observation: ";
const THOUGHT_PREFIX: &str = "Thought: ";

#[derive(Debug, Clone, Default)]
pub struct Scratchpad {
    steps: Vec<(String, String)>,
}

impl Scratchpad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, action: &AgentAction, observation: impl Into<String>) {
        self.record_raw(action.log.clone(), observation);
    }

    /// Record a turn that produced no usable action, keyed by its raw text.
    pub fn record_raw(&mut self, log: impl Into<String>, observation: impl Into<String>) {
        self.steps.push((log.into(), observation.into()));
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for (log, observation) in &self.steps {
            out.push_str(log);
            out.push('\n');
            out.push_str(OBSERVATION_PREFIX);
            out.push_str(observation);
            out.push('\n');
            out.push_str(THOUGHT_PREFIX);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scratchpad_renders_nothing() {
        assert_eq!(Scratchpad::new().render(), "");
    }

    #[test]
    fn steps_render_in_order_with_observation_and_thought_cue() {
        let mut pad = Scratchpad::new();
        let action = AgentAction {
            tool: "list_tables_powerbi".into(),
            input: String::new(),
            log: "Thought: look\nAction: list_tables_powerbi\nAction Input: ".into(),
        };
        pad.record(&action, "Tracker");
        pad.record_raw("garbage", "Invalid or incomplete response");

        assert_eq!(pad.len(), 2);
        assert_eq!(
            pad.render(),
            "Thought: look\nAction: list_tables_powerbi\nAction Input: \nObservation: Tracker\nThought: \
             garbage\nObservation: Invalid or incomplete response\nThought: "
        );
    }
}
