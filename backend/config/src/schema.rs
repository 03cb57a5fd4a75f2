//! insightbot configuration schema.
//!
//! Typed for serde YAML/JSON deserialization. Every section is optional in the
//! file; missing values fall back to the constants in [`crate::defaults`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// HTTP listener
    pub server: ServerConfig,

    /// Access-token checks
    pub auth: AuthConfig,

    /// LLM completion endpoint
    pub llm: LlmConfig,

    /// Reasoning loop budgets
    pub agent: AgentConfig,

    /// Session greeting, default dataset, insights caching
    pub session: SessionConfig,

    /// BI backend endpoints
    pub powerbi: PowerBiConfig,

    /// Dataset descriptor file; the built-in file is used when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datasets_path: Option<PathBuf>,

    /// Instruction template file; the built-in template is used when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_template_path: Option<PathBuf>,

    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthConfig {
    /// Tokens older than this many seconds are rejected as expired.
    pub max_skew_secs: u64,
    pub scheme: SignatureScheme,
}

/// How the expected token signature is derived from the timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SignatureScheme {
    /// hex(SHA-256(timestamp ++ secret)), what existing host applications send
    #[default]
    Sha256Concat,
    /// hex(HMAC-SHA-256(key = secret, message = timestamp))
    HmacSha256,
}

// ---------------------------------------------------------------------------
// LLM
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Appended to the API key as `key:project` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    pub timeout_secs: u64,
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentConfig {
    pub max_iterations: usize,
    pub max_execution_secs: u64,
    /// Feed malformed model output back as an observation instead of failing.
    pub handle_parsing_errors: bool,
    pub parsing_error_note: String,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    pub assistant_name: String,
    pub user_name: String,
    pub default_dataset: String,
    pub insights_cache_policy: InsightsCachePolicy,
    /// Shown in place of an answer when the reasoning loop fails.
    pub failure_message: String,
    /// A session untouched for this long is dropped by the gateway.
    pub idle_timeout_secs: u64,
}

/// Whether failed insights summaries are memoized alongside successful ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InsightsCachePolicy {
    #[default]
    CacheAll,
    SuccessOnly,
}

// ---------------------------------------------------------------------------
// Power BI
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PowerBiConfig {
    pub api_base_url: String,
    pub authority_host: String,
    pub timeout_secs: u64,
    /// Rows fetched per table by `schema_powerbi`.
    pub sample_rows: u32,
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingConfig {
    pub level: String,
    pub dir: PathBuf,
}
