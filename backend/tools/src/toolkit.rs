//! The three BI tools the instruction template refers to by name.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use moka::sync::Cache;
use tracing::{debug, info};

use insightbot_config::DatasetDescriptor;
use insightbot_core::{Tool, ToolRegistry};

use crate::powerbi::QueryBackend;

pub const QUERY_TOOL: &str = "query_powerbi";
pub const SCHEMA_TOOL: &str = "schema_powerbi";
pub const LIST_TABLES_TOOL: &str = "list_tables_powerbi";

/// Process-wide factory for dataset-bound tool sets.
///
/// Holds the shared backend and a sample-row cache keyed by dataset and table.
#[derive(Clone)]
pub struct BiToolkit {
    backend: Arc<dyn QueryBackend>,
    sample_rows: u32,
    schema_cache: Cache<String, String>,
}

impl BiToolkit {
    pub fn new(backend: Arc<dyn QueryBackend>, sample_rows: u32) -> Self {
        Self {
            backend,
            sample_rows,
            schema_cache: Cache::builder().max_capacity(256).build(),
        }
    }

    /// Tools routed to one dataset, in prompt order.
    pub fn tools_for(&self, dataset: &DatasetDescriptor) -> ToolRegistry {
        debug!(dataset = %dataset.key, "Building BI tool set");
        ToolRegistry::new()
            .with(Arc::new(QueryTool {
                backend: Arc::clone(&self.backend),
                dataset_id: dataset.dataset_id.clone(),
            }))
            .with(Arc::new(SchemaTool {
                backend: Arc::clone(&self.backend),
                dataset_id: dataset.dataset_id.clone(),
                table_names: dataset.table_names.clone(),
                sample_rows: self.sample_rows,
                cache: self.schema_cache.clone(),
            }))
            .with(Arc::new(ListTablesTool {
                table_names: dataset.table_names.clone(),
            }))
    }
}

// ---------------------------------------------------------------------------
// query_powerbi
// ---------------------------------------------------------------------------

/// Runs the model's DAX verbatim; shape rules are enforced by the prompt only.
pub struct QueryTool {
    backend: Arc<dyn QueryBackend>,
    dataset_id: String,
}

#[async_trait]
impl Tool for QueryTool {
    fn name(&self) -> &str {
        QUERY_TOOL
    }

    fn description(&self) -> &str {
        "Input to this tool is a single well-formed DAX query starting with EVALUATE, \
         output is the result from the dataset. If the query is not correct, an error \
         message will be returned; rewrite the query and try again."
    }

    async fn invoke(&self, input: &str) -> Result<String> {
        let query = input.trim();
        if query.is_empty() {
            anyhow::bail!("empty query; provide a DAX query starting with EVALUATE");
        }
        let result = self.backend.execute(&self.dataset_id, query).await?;
        info!(dataset_id = %self.dataset_id, rows = result.rows.len(), "DAX query executed");
        Ok(result.to_text())
    }
}

// ---------------------------------------------------------------------------
// schema_powerbi
// ---------------------------------------------------------------------------

pub struct SchemaTool {
    backend: Arc<dyn QueryBackend>,
    dataset_id: String,
    table_names: Vec<String>,
    sample_rows: u32,
    cache: Cache<String, String>,
}

impl SchemaTool {
    async fn describe_table(&self, table: &str) -> String {
        if !self.table_names.iter().any(|t| t == table) {
            return format!(
                "Table '{table}' is not part of this dataset. Available: {}.",
                self.table_names.join(", ")
            );
        }

        let key = format!("{}/{}", self.dataset_id, table);
        if let Some(hit) = self.cache.get(&key) {
            return hit;
        }

        let query = format!("EVALUATE TOPN({}, '{}')", self.sample_rows, table.replace('\'', "''"));
        match self.backend.execute(&self.dataset_id, &query).await {
            Ok(result) => {
                let text = format!("Table '{table}' sample rows:\n{}", result.to_text());
                self.cache.insert(key, text.clone());
                text
            }
            Err(e) => format!("Table '{table}': could not fetch schema ({e})"),
        }
    }
}

#[async_trait]
impl Tool for SchemaTool {
    fn name(&self) -> &str {
        SCHEMA_TOOL
    }

    fn description(&self) -> &str {
        "Input to this tool is a comma-separated list of tables, output is the schema and \
         sample rows for those tables. Be sure that the tables actually exist by calling \
         list_tables_powerbi first! Example Input: \"table1, table2, table3\""
    }

    async fn invoke(&self, input: &str) -> Result<String> {
        let tables: Vec<&str> = input
            .split(',')
            .map(|t| t.trim().trim_matches(|c: char| c == '"' || c == '\''))
            .filter(|t| !t.is_empty())
            .collect();
        if tables.is_empty() {
            anyhow::bail!("no table names given");
        }

        let mut sections = Vec::with_capacity(tables.len());
        for table in tables {
            sections.push(self.describe_table(table).await);
        }
        Ok(sections.join("\n\n"))
    }
}

// ---------------------------------------------------------------------------
// list_tables_powerbi
// ---------------------------------------------------------------------------

pub struct ListTablesTool {
    table_names: Vec<String>,
}

#[async_trait]
impl Tool for ListTablesTool {
    fn name(&self) -> &str {
        LIST_TABLES_TOOL
    }

    fn description(&self) -> &str {
        "Input is an empty string, output is a comma separated list of tables in the database."
    }

    async fn invoke(&self, _input: &str) -> Result<String> {
        Ok(self.table_names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::powerbi::{BiError, QueryResult};
    use serde_json::json;
    use std::sync::Mutex;

    /// Records queries and answers from a fixed response.
    struct FakeBackend {
        queries: Mutex<Vec<(String, String)>>,
        response: serde_json::Value,
    }

    impl FakeBackend {
        fn new(response: serde_json::Value) -> Arc<Self> {
            Arc::new(Self {
                queries: Mutex::new(Vec::new()),
                response,
            })
        }

        fn queries(&self) -> Vec<(String, String)> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QueryBackend for FakeBackend {
        async fn execute(&self, dataset_id: &str, query: &str) -> Result<QueryResult, BiError> {
            self.queries
                .lock()
                .unwrap()
                .push((dataset_id.to_string(), query.to_string()));
            QueryResult::from_response(&self.response)
        }
    }

    fn dataset() -> DatasetDescriptor {
        DatasetDescriptor {
            key: "Incident_Tracker".into(),
            dataset_id: "ds-1".into(),
            table_names: vec!["Tracker".into()],
            persona: "Incident Management Analytics".into(),
            schema_context: String::new(),
            faqs: vec![],
            key_insights_query: String::new(),
        }
    }

    #[tokio::test]
    async fn test_tool_set_names_and_routing() {
        let backend = FakeBackend::new(json!({"results":[{"tables":[{"rows":[{"[Value]": 17}]}]}]}));
        let toolkit = BiToolkit::new(backend.clone(), 3);
        let tools = toolkit.tools_for(&dataset());
        assert_eq!(tools.names(), vec![QUERY_TOOL, SCHEMA_TOOL, LIST_TABLES_TOOL]);

        let out = tools
            .get(QUERY_TOOL)
            .unwrap()
            .invoke("  EVALUATE CALCULATE( COUNTROWS(Tracker) ) ")
            .await
            .unwrap();
        assert_eq!(out, "17");
        assert_eq!(
            backend.queries(),
            vec![("ds-1".to_string(), "EVALUATE CALCULATE( COUNTROWS(Tracker) )".to_string())]
        );
    }

    #[tokio::test]
    async fn test_query_error_propagates() {
        let backend = FakeBackend::new(json!({"error": {"code": "BadRequest", "message": "bad DAX"}}));
        let tools = BiToolkit::new(backend, 3).tools_for(&dataset());
        let err = tools.get(QUERY_TOOL).unwrap().invoke("EVALUATE x").await.unwrap_err();
        assert!(err.to_string().contains("bad DAX"));
    }

    #[tokio::test]
    async fn test_schema_tool_caches_samples() {
        let backend = FakeBackend::new(json!({"results":[{"tables":[{"rows":[
            {"Tracker[Ticket No]": "INC-1", "Tracker[Current status]": "Open"},
            {"Tracker[Ticket No]": "INC-2", "Tracker[Current status]": "Closed"}
        ]}]}]}));
        let tools = BiToolkit::new(backend.clone(), 2).tools_for(&dataset());
        let schema = tools.get(SCHEMA_TOOL).unwrap();

        let first = schema.invoke("\"Tracker\", Unknown").await.unwrap();
        assert!(first.contains("| Ticket No | Current status |"));
        assert!(first.contains("Table 'Unknown' is not part of this dataset."));
        let second = schema.invoke("Tracker").await.unwrap();
        assert!(second.contains("INC-2"));

        assert_eq!(
            backend.queries(),
            vec![("ds-1".to_string(), "EVALUATE TOPN(2, 'Tracker')".to_string())]
        );
    }

    #[tokio::test]
    async fn test_list_tables() {
        let tools = BiToolkit::new(FakeBackend::new(json!({})), 3).tools_for(&dataset());
        let out = tools.get(LIST_TABLES_TOOL).unwrap().invoke("").await.unwrap();
        assert_eq!(out, "Tracker");
    }
}
