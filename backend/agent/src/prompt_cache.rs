//! Composed prompt templates, one per dataset.

use std::sync::Arc;

use insightbot_config::DatasetDescriptor;
use moka::sync::Cache;

use crate::system_prompt::PromptTemplate;

pub struct PromptCache {
    template: String,
    cache: Cache<String, Arc<PromptTemplate>>,
}

impl PromptCache {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            cache: Cache::builder().max_capacity(64).build(),
        }
    }

    /// Template with this dataset's schema context bound.
    pub fn for_dataset(&self, dataset: &DatasetDescriptor) -> Arc<PromptTemplate> {
        self.cache.get_with(dataset.key.clone(), || {
            Arc::new(PromptTemplate::for_dataset(
                self.template.clone(),
                dataset.schema_context.clone(),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(key: &str, schema: &str) -> DatasetDescriptor {
        DatasetDescriptor {
            key: key.into(),
            dataset_id: format!("{key}-id"),
            table_names: vec!["Tracker".into()],
            persona: "Analytics".into(),
            schema_context: schema.into(),
            faqs: Vec::new(),
            key_insights_query: "Summarize".into(),
        }
    }

    #[test]
    fn same_dataset_reuses_template() {
        let cache = PromptCache::new("ctx: {schema_context}");
        let a = cache.for_dataset(&dataset("A", "alpha"));
        let again = cache.for_dataset(&dataset("A", "alpha"));
        assert!(Arc::ptr_eq(&a, &again));
        assert_eq!(a.composed(), "ctx: alpha");
    }

    #[test]
    fn datasets_get_their_own_context() {
        let cache = PromptCache::new("ctx: {schema_context}");
        assert_eq!(cache.for_dataset(&dataset("A", "alpha")).composed(), "ctx: alpha");
        assert_eq!(cache.for_dataset(&dataset("B", "beta")).composed(), "ctx: beta");
    }
}
