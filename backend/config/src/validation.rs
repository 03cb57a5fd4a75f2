//! Config validation: semantic checks with user-friendly error messages.

use crate::schema::AppConfig;
use thiserror::Error;

/// One day; a longer token window is accepted but flagged.
const LONG_SKEW_SECS: u64 = 24 * 60 * 60;

/// One day per question is the most the reasoning loop may be given.
pub const MAX_EXECUTION_SECS_LIMIT: u64 = 24 * 60 * 60;

/// Idle sessions may be kept for at most a week.
pub const MAX_IDLE_TIMEOUT_SECS: u64 = 7 * 24 * 60 * 60;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &AppConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_auth(config, &mut report);
    validate_llm(config, &mut report);
    validate_agent(config, &mut report);
    validate_session(config, &mut report);
    validate_powerbi(config, &mut report);
    report
}

fn validate_auth(config: &AppConfig, report: &mut ValidationReport) {
    let skew = config.auth.max_skew_secs;
    if skew == 0 {
        report.error("auth.maxSkewSecs", "maxSkewSecs must be > 0 or every token expires");
    } else if skew > LONG_SKEW_SECS {
        report.warn(
            "auth.maxSkewSecs",
            format!("Tokens stay valid for {} hours; consider a shorter window", skew / 3600),
        );
    }
}

fn validate_llm(config: &AppConfig, report: &mut ValidationReport) {
    let llm = &config.llm;
    if llm.model.trim().is_empty() {
        report.error("llm.model", "Model name cannot be empty");
    }
    if !llm.base_url.starts_with("http://") && !llm.base_url.starts_with("https://") {
        report.error("llm.baseUrl", format!("'{}' is not an http(s) URL", llm.base_url));
    }
    if !(0.0..=2.0).contains(&llm.temperature) {
        report.error("llm.temperature", "temperature must be within 0.0..=2.0");
    } else if llm.temperature > 1.0 {
        report.warn("llm.temperature", "High temperature makes query formatting unreliable");
    }
    if llm.max_tokens == 0 {
        report.error("llm.maxTokens", "maxTokens must be > 0");
    }
}

fn validate_agent(config: &AppConfig, report: &mut ValidationReport) {
    let agent = &config.agent;
    if agent.max_iterations == 0 {
        report.error("agent.maxIterations", "maxIterations must be >= 1");
    }
    if agent.max_execution_secs == 0 {
        report.error("agent.maxExecutionSecs", "maxExecutionSecs must be >= 1");
    } else if agent.max_execution_secs > MAX_EXECUTION_SECS_LIMIT {
        report.error(
            "agent.maxExecutionSecs",
            format!("maxExecutionSecs must be <= {MAX_EXECUTION_SECS_LIMIT}"),
        );
    }
    if agent.handle_parsing_errors && agent.parsing_error_note.trim().is_empty() {
        report.warn(
            "agent.parsingErrorNote",
            "Empty note gives the model no hint about its formatting mistake",
        );
    }
}

fn validate_session(config: &AppConfig, report: &mut ValidationReport) {
    if config.session.default_dataset.trim().is_empty() {
        report.error("session.defaultDataset", "defaultDataset cannot be empty");
    }
    let idle = config.session.idle_timeout_secs;
    if idle == 0 || idle > MAX_IDLE_TIMEOUT_SECS {
        report.error(
            "session.idleTimeoutSecs",
            format!("idleTimeoutSecs must be within 1..={MAX_IDLE_TIMEOUT_SECS}"),
        );
    }
}

fn validate_powerbi(config: &AppConfig, report: &mut ValidationReport) {
    if config.powerbi.sample_rows == 0 {
        report.warn("powerbi.sampleRows", "sampleRows = 0 makes schema_powerbi return headers only");
    }
}
