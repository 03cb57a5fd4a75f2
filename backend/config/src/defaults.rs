//! Config defaults.

use std::path::PathBuf;

use crate::schema::{
    AgentConfig, AuthConfig, InsightsCachePolicy, LlmConfig, LoggingConfig, PowerBiConfig,
    ServerConfig, SessionConfig, SignatureScheme,
};

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8501;

/// 100 hours.
pub const DEFAULT_MAX_SKEW_SECS: u64 = 360_000;

pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_MAX_ITERATIONS: usize = 25;
pub const DEFAULT_MAX_EXECUTION_SECS: u64 = 180;
pub const DEFAULT_PARSING_ERROR_NOTE: &str = "Invalid or incomplete response";

pub const DEFAULT_ASSISTANT_NAME: &str = "Straibot";
pub const DEFAULT_USER_NAME: &str = "there";
pub const DEFAULT_DATASET: &str = "Incident_Tracker";
pub const DEFAULT_FAILURE_MESSAGE: &str = "Sorry, I encountered an error.";
/// 30 minutes.
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 1_800;

pub const DEFAULT_POWERBI_API: &str = "https://api.powerbi.com/v1.0/myorg";
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
pub const DEFAULT_POWERBI_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_SAMPLE_ROWS: u32 = 3;

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_DIR: &str = "logs";

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            max_skew_secs: DEFAULT_MAX_SKEW_SECS,
            scheme: SignatureScheme::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            project: None,
            timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_execution_secs: DEFAULT_MAX_EXECUTION_SECS,
            handle_parsing_errors: true,
            parsing_error_note: DEFAULT_PARSING_ERROR_NOTE.to_string(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            assistant_name: DEFAULT_ASSISTANT_NAME.to_string(),
            user_name: DEFAULT_USER_NAME.to_string(),
            default_dataset: DEFAULT_DATASET.to_string(),
            insights_cache_policy: InsightsCachePolicy::default(),
            failure_message: DEFAULT_FAILURE_MESSAGE.to_string(),
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
        }
    }
}

impl Default for PowerBiConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_POWERBI_API.to_string(),
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            timeout_secs: DEFAULT_POWERBI_TIMEOUT_SECS,
            sample_rows: DEFAULT_SAMPLE_ROWS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}
