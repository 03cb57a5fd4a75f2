//! Process-wide dataset registry.
//!
//! Loaded once at startup and never mutated; sessions share it behind an `Arc`.

use anyhow::{bail, Context, Result};
use insightbot_core::InsightError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Built-in descriptor file.
const BUILTIN_DATASETS: &str = include_str!("../assets/datasets.yaml");

/// Static configuration record for one BI dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetDescriptor {
    /// Selection key shown to users (e.g. `Incident_Tracker`)
    pub key: String,
    /// Backend dataset id the query tool routes to
    pub dataset_id: String,
    /// Queryable tables, in the order they are listed to the model
    pub table_names: Vec<String>,
    /// Label used in greetings and insights headings
    pub persona: String,
    /// Free-text description of the queryable columns
    pub schema_context: String,
    /// Canned questions offered to the user
    #[serde(default)]
    pub faqs: Vec<String>,
    /// Task run once per session to build the insights summary
    pub key_insights_query: String,
}

#[derive(Deserialize)]
struct DatasetFile {
    datasets: Vec<DatasetDescriptor>,
}

/// Read-only mapping from dataset key to descriptor, preserving file order.
#[derive(Debug, Clone)]
pub struct DatasetRegistry {
    entries: Vec<Arc<DatasetDescriptor>>,
    index: HashMap<String, usize>,
}

impl DatasetRegistry {
    /// Build a registry, rejecting empty lists and duplicate keys.
    pub fn new(descriptors: Vec<DatasetDescriptor>) -> Result<Self> {
        if descriptors.is_empty() {
            bail!("dataset registry is empty");
        }
        let mut index = HashMap::with_capacity(descriptors.len());
        for (i, d) in descriptors.iter().enumerate() {
            if d.key.trim().is_empty() {
                bail!("dataset #{i} has an empty key");
            }
            if index.insert(d.key.clone(), i).is_some() {
                bail!("duplicate dataset key: {}", d.key);
            }
        }
        Ok(Self {
            entries: descriptors.into_iter().map(Arc::new).collect(),
            index,
        })
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let file: DatasetFile = serde_yaml::from_str(raw).context("Invalid dataset file")?;
        Self::new(file.datasets)
    }

    /// The descriptors shipped with the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_DATASETS)
    }

    /// Load from `path`, or the built-in file when `None`.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let registry = match path {
            Some(path) => {
                let raw = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read dataset file: {}", path.display()))?;
                Self::from_yaml(&raw)
                    .with_context(|| format!("Failed to load datasets from: {}", path.display()))?
            }
            None => Self::builtin()?,
        };
        info!(count = registry.entries.len(), keys = ?registry.keys(), "Loaded dataset registry");
        Ok(registry)
    }

    pub fn lookup(&self, key: &str) -> Result<Arc<DatasetDescriptor>, InsightError> {
        self.index
            .get(key)
            .map(|&i| Arc::clone(&self.entries[i]))
            .ok_or_else(|| InsightError::UnknownDataset(key.to_string()))
    }

    /// Dataset keys in file order.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|d| d.key.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<DatasetDescriptor>> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(key: &str) -> DatasetDescriptor {
        DatasetDescriptor {
            key: key.into(),
            dataset_id: format!("{key}-id"),
            table_names: vec!["T".into()],
            persona: format!("{key} persona"),
            schema_context: "T[x]".into(),
            faqs: vec![],
            key_insights_query: "summarize".into(),
        }
    }

    #[test]
    fn test_builtin_incident_tracker() {
        let registry = DatasetRegistry::builtin().unwrap();
        let d = registry.lookup("Incident_Tracker").unwrap();
        assert_eq!(d.dataset_id, "b0da0357-f866-4c6e-abb9-4976b5ef03a4");
        assert_eq!(d.table_names, vec!["Tracker"]);
        assert_eq!(d.persona, "Incident Management Analytics");
        assert_eq!(d.faqs.len(), 3);
        assert!(d.schema_context.contains("Tracker[Severity {Low Medium High}]"));
        assert!(d.key_insights_query.contains("EVALUATE CALCULATE( COUNTROWS(FILTER(Tracker"));
    }

    #[test]
    fn test_unknown_key() {
        let registry = DatasetRegistry::builtin().unwrap();
        assert!(matches!(
            registry.lookup("Sales"),
            Err(InsightError::UnknownDataset(k)) if k == "Sales"
        ));
    }

    #[test]
    fn test_keys_keep_order() {
        let registry =
            DatasetRegistry::new(vec![descriptor("b"), descriptor("a"), descriptor("c")]).unwrap();
        assert_eq!(registry.keys(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_rejects_duplicates_and_empty() {
        assert!(DatasetRegistry::new(vec![descriptor("a"), descriptor("a")]).is_err());
        assert!(DatasetRegistry::new(vec![]).is_err());
    }
}
