//! Routes the model's tool requests to the dataset-scoped registry.
//!
//! Every outcome becomes observation text; the loop never fails on a tool.

use insightbot_core::{InsightError, ToolRegistry};
use tracing::{debug, warn};

pub struct ToolDispatcher {
    registry: ToolRegistry,
}

impl ToolDispatcher {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub async fn execute(&self, name: &str, input: &str) -> Result<String, InsightError> {
        let tool = self.registry.get(name)?;
        tool.invoke(input)
            .await
            .map_err(|e| InsightError::ToolExecution(format!("{e:#}")))
    }

    /// Run the tool and render any failure as the observation.
    pub async fn observe(&self, name: &str, input: &str) -> String {
        match self.execute(name, input).await {
            Ok(output) => {
                debug!(tool = name, bytes = output.len(), "tool completed");
                output
            }
            Err(err @ InsightError::UnknownTool { .. }) => {
                warn!(tool = name, "model requested unknown tool");
                err.to_string()
            }
            Err(InsightError::ToolExecution(message)) => {
                warn!(tool = name, error = %message, "tool failed");
                format!("Error: {message}")
            }
            Err(other) => format!("Error: {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use insightbot_core::Tool;
    use std::sync::Arc;

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "echoes input"
        }
        async fn invoke(&self, input: &str) -> anyhow::Result<String> {
            Ok(format!("echo:{input}"))
        }
    }

    struct Broken;

    #[async_trait]
    impl Tool for Broken {
        fn name(&self) -> &str {
            "broken"
        }
        fn description(&self) -> &str {
            "always fails"
        }
        async fn invoke(&self, _input: &str) -> anyhow::Result<String> {
            anyhow::bail!("syntax error near EVALUATE")
        }
    }

    fn dispatcher() -> ToolDispatcher {
        ToolDispatcher::new(ToolRegistry::new().with(Arc::new(Echo)).with(Arc::new(Broken)))
    }

    #[tokio::test]
    async fn known_tool_output_is_the_observation() {
        assert_eq!(dispatcher().observe("echo", "hi").await, "echo:hi");
    }

    #[tokio::test]
    async fn unknown_tool_lists_available_names() {
        let obs = dispatcher().observe("drop_tables", "").await;
        assert_eq!(
            obs,
            "drop_tables is not a valid tool, try one of [echo, broken]."
        );
    }

    #[tokio::test]
    async fn tool_failure_becomes_error_observation() {
        let obs = dispatcher().observe("broken", "x").await;
        assert_eq!(obs, "Error: syntax error near EVALUATE");
    }
}
