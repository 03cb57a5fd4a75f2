//! `insightbot datasets`

use anyhow::Result;
use insightbot_config::{AppConfig, DatasetRegistry};

use crate::terminal_output::render_table;

pub async fn run(config: &AppConfig) -> Result<()> {
    let registry = DatasetRegistry::load(config.datasets_path.as_deref()).await?;
    let rows: Vec<Vec<String>> = registry
        .iter()
        .map(|d| {
            vec![
                d.key.clone(),
                d.persona.clone(),
                d.table_names.join(", "),
                d.faqs.len().to_string(),
                if d.key == config.session.default_dataset { "yes".into() } else { String::new() },
            ]
        })
        .collect();
    print!("{}", render_table(&["Key", "Persona", "Tables", "FAQs", "Default"], &rows));
    if let Ok(default) = registry.lookup(&config.session.default_dataset) {
        for faq in &default.faqs {
            println!("  - {faq}");
        }
    }
    Ok(())
}
