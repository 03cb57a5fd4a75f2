use std::time::Duration;

use thiserror::Error;

/// Top-level error type for the insightbot runtime.
///
/// Every failure below the session level is eventually converted to
/// user-facing text; only `ConfigMissing` is meant to stop the process.
#[derive(Debug, Error)]
pub enum InsightError {
    #[error("authentication required")]
    AuthRequired,

    #[error("invalid token")]
    AuthInvalid,

    #[error("token expired (age {age_secs}s, limit {max_skew_secs}s)")]
    AuthExpired { age_secs: i64, max_skew_secs: u64 },

    #[error("missing configuration: {0}")]
    ConfigMissing(String),

    #[error("unknown dataset: {0}")]
    UnknownDataset(String),

    #[error("{name} is not a valid tool, try one of [{available}].")]
    UnknownTool { name: String, available: String },

    #[error("tool execution failed: {0}")]
    ToolExecution(String),

    #[error("could not parse LLM output: {0}")]
    ParseMalformed(String),

    #[error("agent stopped after {iterations} iterations in {elapsed:?}")]
    ReasoningExhausted { iterations: usize, elapsed: Duration },

    #[error("LLM provider error ({provider}): {message}")]
    Llm { provider: String, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl InsightError {
    /// Stable snake_case identifier, used in API error bodies and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            InsightError::AuthRequired => "auth_required",
            InsightError::AuthInvalid => "auth_invalid",
            InsightError::AuthExpired { .. } => "auth_expired",
            InsightError::ConfigMissing(_) => "config_missing",
            InsightError::UnknownDataset(_) => "unknown_dataset",
            InsightError::UnknownTool { .. } => "unknown_tool",
            InsightError::ToolExecution(_) => "tool_execution_error",
            InsightError::ParseMalformed(_) => "parse_malformed",
            InsightError::ReasoningExhausted { .. } => "reasoning_exhausted",
            InsightError::Llm { .. } => "llm_error",
            InsightError::Other(_) => "internal",
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            InsightError::AuthRequired | InsightError::AuthInvalid | InsightError::AuthExpired { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_tool_message() {
        let err = InsightError::UnknownTool {
            name: "drop_tables".into(),
            available: "query_powerbi, list_tables_powerbi".into(),
        };
        assert_eq!(
            err.to_string(),
            "drop_tables is not a valid tool, try one of [query_powerbi, list_tables_powerbi]."
        );
        assert_eq!(err.kind(), "unknown_tool");
    }

    #[test]
    fn test_auth_classification() {
        assert!(InsightError::AuthInvalid.is_auth());
        assert!(InsightError::AuthExpired { age_secs: 10, max_skew_secs: 5 }.is_auth());
        assert!(!InsightError::UnknownDataset("x".into()).is_auth());
    }
}
