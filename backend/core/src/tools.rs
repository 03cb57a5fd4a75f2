use std::sync::Arc;

use crate::error::InsightError;
use crate::traits::Tool;

/// Tools available to one reasoning run, in registration order.
///
/// Order matters: it is the order tools are listed to the model.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool, replacing any earlier tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        if let Some(slot) = self.tools.iter_mut().find(|t| t.name() == tool.name()) {
            *slot = tool;
        } else {
            self.tools.push(tool);
        }
    }

    pub fn with(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    /// Look up a tool by exact name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Tool>, InsightError> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .cloned()
            .ok_or_else(|| InsightError::UnknownTool {
                name: name.to_string(),
                available: self.names().join(", "),
            })
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    /// `name: description` lines, as listed in the prompt.
    pub fn describe(&self) -> String {
        self.tools
            .iter()
            .map(|t| format!("{}: {}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;

    struct EchoTool {
        name: &'static str,
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            self.name
        }
        fn description(&self) -> &str {
            "Echoes its input."
        }
        async fn invoke(&self, input: &str) -> Result<String> {
            Ok(input.to_string())
        }
    }

    #[test]
    fn test_registry_preserves_order() {
        let registry = ToolRegistry::new()
            .with(Arc::new(EchoTool { name: "b" }))
            .with(Arc::new(EchoTool { name: "a" }))
            .with(Arc::new(EchoTool { name: "b" }));
        assert_eq!(registry.names(), vec!["b", "a"]);
        assert_eq!(registry.describe(), "b: Echoes its input.\na: Echoes its input.");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_typed_error() {
        let registry = ToolRegistry::new().with(Arc::new(EchoTool { name: "echo" }));
        assert!(registry.get("echo").is_ok());
        match registry.get("nope") {
            Err(InsightError::UnknownTool { name, available }) => {
                assert_eq!(name, "nope");
                assert_eq!(available, "echo");
            }
            _ => panic!("expected UnknownTool"),
        }
        let out = registry.get("echo").unwrap().invoke("hi").await.unwrap();
        assert_eq!(out, "hi");
    }
}
