//! `insightbot check-config`: report what startup would complain about,
//! without starting anything.

use std::path::Path;

use anyhow::{bail, Result};
use insightbot_config::{redacted_snapshot, validate, AppConfig, DatasetRegistry, Secrets};

use crate::terminal_output::{note_error, note_info, note_success, note_warn};

pub async fn run(path: &Path, config: &AppConfig) -> Result<()> {
    note_info(&format!("config file: {}", path.display()));
    println!("{}", serde_json::to_string_pretty(&redacted_snapshot(config))?);

    let report = validate(config);
    for w in &report.warnings {
        note_warn(&format!("{}: {}", w.path, w.message));
    }
    for e in &report.errors {
        note_error(&format!("{}: {}", e.path, e.message));
    }
    let mut failures = report.errors.len();

    match Secrets::from_env() {
        Ok(_) => note_success("all secrets present"),
        Err(err) => {
            note_error(&err.to_string());
            failures += 1;
        }
    }

    match DatasetRegistry::load(config.datasets_path.as_deref()).await {
        Ok(registry) => {
            note_success(&format!("datasets: {}", registry.keys().join(", ")));
            if registry.lookup(&config.session.default_dataset).is_err() {
                note_error(&format!(
                    "default dataset {} is not registered",
                    config.session.default_dataset
                ));
                failures += 1;
            }
        }
        Err(err) => {
            note_error(&format!("{err:#}"));
            failures += 1;
        }
    }

    if failures > 0 {
        bail!("{failures} problem(s) found");
    }
    note_success("configuration looks good");
    Ok(())
}
