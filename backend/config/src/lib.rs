//! `insightbot-config`: runtime configuration for the insightbot service.
//!
//! Provides:
//! - Typed config schema with defaults
//! - YAML loading with `${ENV_VAR}` substitution
//! - Required secrets, loaded from the environment and checked all at once
//! - The process-wide dataset registry
//! - The built-in ReAct instruction template
//! - Validation and redaction for safe logging

pub mod datasets;
pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod secrets;
pub mod template;
pub mod validation;

pub use datasets::{DatasetDescriptor, DatasetRegistry};
pub use env::{resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_file_path, load_config, load_template};
pub use redact::{redact, redacted_snapshot};
pub use schema::{
    AgentConfig, AppConfig, AuthConfig, InsightsCachePolicy, LlmConfig, LoggingConfig,
    PowerBiConfig, ServerConfig, SessionConfig, SignatureScheme,
};
pub use secrets::{MissingSecretError, Secrets};
pub use template::{CORE_TEMPLATE, RUNTIME_SLOTS, SCHEMA_CONTEXT_SLOT};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Result};

/// Log every validation finding and fail if any of them is an error.
pub fn ensure_valid(config: &AppConfig) -> Result<()> {
    let report = validate(config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if !report.is_valid() {
        bail!("configuration has {} error(s)", report.errors.len());
    }
    Ok(())
}
