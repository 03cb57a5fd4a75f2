pub mod openai;
pub mod scripted;

use std::sync::Arc;

use anyhow::Result;
use insightbot_config::LlmConfig;
use insightbot_core::LlmProvider;

/// Build the configured completion provider.
pub fn build_provider(config: &LlmConfig, api_key: &str) -> Result<Arc<dyn LlmProvider>> {
    let key = match &config.project {
        Some(project) => format!("{api_key}:{project}"),
        None => api_key.to_string(),
    };
    let provider = openai::OpenAiProvider::new(key, config.timeout_secs)?.with_base_url(&config.base_url);
    Ok(Arc::new(provider))
}
