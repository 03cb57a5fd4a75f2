use anyhow::Result;
use async_trait::async_trait;

/// A named capability the reasoning loop can invoke with a single string input.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name of the tool (e.g., "query_powerbi").
    fn name(&self) -> &str;

    /// Description for the LLM prompt.
    fn description(&self) -> &str;

    /// Execute the tool. Errors are reported back to the model as text.
    async fn invoke(&self, input: &str) -> Result<String>;
}

/// Trait for LLM completion endpoints.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a completion request and return the response text.
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse>;
}

/// Request to an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Generation halts before any of these sequences.
    pub stop: Vec<String>,
}

/// Response from an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub provider: String,
    pub model: String,
    pub tokens_used: u64,
    pub latency_ms: u64,
}
