//! Builds a dataset-scoped reasoning loop on demand.

use std::sync::Arc;

use insightbot_config::DatasetDescriptor;
use insightbot_core::LlmProvider;
use insightbot_tools::BiToolkit;

use crate::agent_loop::{LoopLimits, ModelSettings, Reasoner, ReasoningLoop};
use crate::prompt_cache::PromptCache;
use crate::tool_dispatcher::ToolDispatcher;

/// Supplies the reasoner for a dataset. The controller only sees this seam,
/// so tests can swap the whole loop out.
pub trait ReasonerFactory: Send + Sync {
    fn for_dataset(&self, dataset: &DatasetDescriptor) -> Arc<dyn Reasoner>;
}

pub struct AgentFactory {
    llm: Arc<dyn LlmProvider>,
    toolkit: BiToolkit,
    prompts: PromptCache,
    model: ModelSettings,
    limits: LoopLimits,
}

impl AgentFactory {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        toolkit: BiToolkit,
        template: impl Into<String>,
        model: ModelSettings,
        limits: LoopLimits,
    ) -> Self {
        Self {
            llm,
            toolkit,
            prompts: PromptCache::new(template),
            model,
            limits,
        }
    }
}

impl ReasonerFactory for AgentFactory {
    fn for_dataset(&self, dataset: &DatasetDescriptor) -> Arc<dyn Reasoner> {
        Arc::new(ReasoningLoop::new(
            self.llm.clone(),
            ToolDispatcher::new(self.toolkit.tools_for(dataset)),
            self.prompts.for_dataset(dataset),
            self.model.clone(),
            self.limits.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use insightbot_planner::ScriptedProvider;
    use insightbot_tools::{BiError, QueryBackend, QueryResult};
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingBackend {
        seen: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl QueryBackend for RecordingBackend {
        async fn execute(&self, dataset_id: &str, query: &str) -> Result<QueryResult, BiError> {
            self.seen
                .lock()
                .unwrap()
                .push((dataset_id.to_string(), query.to_string()));
            QueryResult::from_response(&json!({
                "results": [{ "tables": [{ "rows": [{ "[Open]": 42 }] }] }]
            }))
        }
    }

    #[tokio::test]
    async fn built_loop_queries_the_selected_dataset() {
        let backend = Arc::new(RecordingBackend::default());
        let llm = Arc::new(
            ScriptedProvider::new("scripted")
                .with_reply("Action: query_powerbi\nAction Input: EVALUATE ROW(\"Open\", 42)")
                .with_reply("Final Answer: 42 open"),
        );
        let factory = AgentFactory::new(
            llm.clone(),
            BiToolkit::new(backend.clone(), 3),
            "{schema_context}\n{tools}\n{input}\n{agent_scratchpad}",
            ModelSettings {
                model: "gpt-4o-mini".into(),
                temperature: 0.2,
                max_tokens: 256,
            },
            LoopLimits::default(),
        );
        let dataset = DatasetDescriptor {
            key: "Incident_Tracker".into(),
            dataset_id: "ds-1".into(),
            table_names: vec!["Tracker".into()],
            persona: "Incident Management Analytics".into(),
            schema_context: "Tracker has Status".into(),
            faqs: Vec::new(),
            key_insights_query: "Summarize".into(),
        };

        let outcome = factory
            .for_dataset(&dataset)
            .run("How many open?", &[], None)
            .await
            .unwrap();

        assert_eq!(outcome.output, "42 open");
        assert_eq!(outcome.steps[0].observation, "42");
        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen[0].0, "ds-1");
        assert!(llm.requests()[0].user_prompt.starts_with("Tracker has Status\n"));
        assert!(llm.requests()[0].user_prompt.contains("list_tables_powerbi"));
    }
}
