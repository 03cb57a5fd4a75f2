//! Config and asset file loading.

use crate::env::resolve_env_vars;
use crate::schema::AppConfig;
use crate::template::CORE_TEMPLATE;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Default config file name.
const CONFIG_FILE_NAME: &str = "insightbot.yaml";

/// Resolve the config file path.
/// Priority: explicit argument > `INSIGHTBOT_CONFIG` env > `./insightbot.yaml`
pub fn config_file_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var("INSIGHTBOT_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

/// Load and parse the config from disk, resolving `${VAR}` references.
///
/// Returns defaults if the file doesn't exist.
pub async fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(AppConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = parse_config(&raw)
        .with_context(|| format!("Failed to load config at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Parse YAML text into a config, substituting env vars first.
pub fn parse_config(raw: &str) -> Result<AppConfig> {
    if raw.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    let yaml: serde_json::Value = serde_yaml::from_str(raw).context("Invalid config YAML")?;
    // A comment-only document parses to null.
    if yaml.is_null() {
        return Ok(AppConfig::default());
    }
    let value = resolve_env_vars(&yaml)?;
    serde_json::from_value(value).context("Config does not match the expected schema")
}

/// Load the instruction template, falling back to the built-in one.
pub async fn load_template(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read prompt template: {}", path.display())),
        None => Ok(CORE_TEMPLATE.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.yaml")).await.unwrap();
        assert_eq!(config.server.port, 8501);
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  port: 9000\nsession:\n  insightsCachePolicy: successOnly").unwrap();
        let config = load_config(file.path()).await.unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(
            config.session.insights_cache_policy,
            crate::schema::InsightsCachePolicy::SuccessOnly
        );
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = parse_config("").unwrap();
        assert_eq!(config.agent.max_iterations, 25);
    }

    #[test]
    fn test_unknown_enum_value_is_rejected() {
        assert!(parse_config("auth:\n  scheme: md5\n").is_err());
    }

    #[tokio::test]
    async fn test_builtin_template_when_no_path() {
        let template = load_template(None).await.unwrap();
        assert_eq!(template, CORE_TEMPLATE);
    }
}
