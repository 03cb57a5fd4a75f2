//! Parser for ReAct-formatted model output.
//!
//! A turn either names a tool (`Action:` / `Action Input:`) or ends the run
//! (`Final Answer:`). Output that does both, or neither, is a parse error.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

pub const FINAL_ANSWER_MARKER: &str = "Final Answer:";

static ACTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)")
        .expect("action pattern is valid")
});
static ACTION_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Action\s*\d*\s*:").expect("label pattern is valid"));
static ACTION_INPUT_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Action\s*\d*\s*Input\s*\d*\s*:").expect("input label pattern is valid")
});

/// A tool invocation requested by the model. `log` is the raw turn text and
/// is replayed verbatim into the scratchpad.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentAction {
    pub tool: String,
    pub input: String,
    pub log: String,
}

impl AgentAction {
    /// Reasoning text that precedes the action line, without the `Thought:` label.
    pub fn thought(&self) -> Option<String> {
        thought_text(&self.log)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentDecision {
    Action(AgentAction),
    Finish { output: String, log: String },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Parsing LLM output produced both a final answer and a parse-able action: {0}")]
    FinalAndAction(String),
    #[error("Missing 'Action:' after 'Thought:'")]
    MissingAction(String),
    #[error("Missing 'Action Input:' after 'Action:'")]
    MissingActionInput(String),
    #[error("Could not parse LLM output: `{0}`")]
    Unparseable(String),
}

impl ParseError {
    /// The model text that failed to parse.
    pub fn raw(&self) -> &str {
        match self {
            Self::FinalAndAction(raw)
            | Self::MissingAction(raw)
            | Self::MissingActionInput(raw)
            | Self::Unparseable(raw) => raw,
        }
    }
}

pub fn parse(text: &str) -> Result<AgentDecision, ParseError> {
    let has_final = text.contains(FINAL_ANSWER_MARKER);

    if let Some(caps) = ACTION.captures(text) {
        if has_final {
            return Err(ParseError::FinalAndAction(text.to_string()));
        }
        let tool = caps[1].trim().to_string();
        let input = clean_input(&caps[2]);
        return Ok(AgentDecision::Action(AgentAction {
            tool,
            input,
            log: text.to_string(),
        }));
    }

    if has_final {
        let output = text
            .rsplit(FINAL_ANSWER_MARKER)
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        return Ok(AgentDecision::Finish {
            output,
            log: text.to_string(),
        });
    }

    if !ACTION_LABEL.is_match(text) {
        Err(ParseError::MissingAction(text.to_string()))
    } else if !ACTION_INPUT_LABEL.is_match(text) {
        Err(ParseError::MissingActionInput(text.to_string()))
    } else {
        Err(ParseError::Unparseable(text.to_string()))
    }
}

// Surrounding quotes are dropped only as a pair, so a query ending in a
// string literal keeps its closing quote.
fn clean_input(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        Some(inner) if !inner.contains('"') => inner.trim().to_string(),
        _ => trimmed.to_string(),
    }
}

/// Reasoning text ahead of the first action or final-answer label.
pub fn thought_text(log: &str) -> Option<String> {
    let end = ACTION_LABEL
        .find(log)
        .map(|m| m.start())
        .or_else(|| log.find(FINAL_ANSWER_MARKER))
        .unwrap_or(log.len());
    let head = log[..end].trim();
    let head = head.strip_prefix("Thought:").unwrap_or(head).trim();
    (!head.is_empty()).then(|| head.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_action_and_input() {
        let text = "Thought: I should count open incidents\nAction: query_powerbi\nAction Input: EVALUATE ROW(\"n\", COUNTROWS(Tracker))";
        let AgentDecision::Action(action) = parse(text).unwrap() else {
            panic!("expected action");
        };
        assert_eq!(action.tool, "query_powerbi");
        assert_eq!(action.input, "EVALUATE ROW(\"n\", COUNTROWS(Tracker))");
        assert_eq!(action.log, text);
        assert_eq!(action.thought().as_deref(), Some("I should count open incidents"));
    }

    #[test]
    fn strips_paired_quotes_only() {
        let text = "Action: list_tables_powerbi\nAction Input: \"\"";
        let AgentDecision::Action(action) = parse(text).unwrap() else {
            panic!("expected action");
        };
        assert_eq!(action.input, "");

        let text = "Action: query_powerbi\nAction Input: \"EVALUATE Tracker\"";
        let AgentDecision::Action(action) = parse(text).unwrap() else {
            panic!("expected action");
        };
        assert_eq!(action.input, "EVALUATE Tracker");
    }

    #[test]
    fn parses_final_answer() {
        let text = "Thought: I now know the final answer\nFinal Answer: There are 42 open incidents.";
        assert_eq!(
            parse(text).unwrap(),
            AgentDecision::Finish {
                output: "There are 42 open incidents.".into(),
                log: text.into(),
            }
        );
    }

    #[test]
    fn final_answer_with_action_is_an_error() {
        let text = "Action: query_powerbi\nAction Input: x\nFinal Answer: 3";
        assert!(matches!(parse(text), Err(ParseError::FinalAndAction(_))));
    }

    #[test]
    fn missing_action_is_reported() {
        let err = parse("I am not sure what to do").unwrap_err();
        assert!(matches!(err, ParseError::MissingAction(_)));
        assert_eq!(err.raw(), "I am not sure what to do");
        assert_eq!(err.to_string(), "Missing 'Action:' after 'Thought:'");
    }

    #[test]
    fn missing_action_input_is_reported() {
        let err = parse("Thought: hmm\nAction: query_powerbi").unwrap_err();
        assert!(matches!(err, ParseError::MissingActionInput(_)));
    }

    #[test]
    fn numbered_labels_are_accepted() {
        let text = "Action 1: schema_powerbi\nAction 1 Input: Tracker";
        let AgentDecision::Action(action) = parse(text).unwrap() else {
            panic!("expected action");
        };
        assert_eq!(action.tool, "schema_powerbi");
        assert_eq!(action.input, "Tracker");
    }
}
