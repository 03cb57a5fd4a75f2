//! Wires configuration, secrets and remote clients into a session controller.

use std::sync::Arc;

use anyhow::{Context, Result};
use insightbot_agent::{AgentFactory, LoopLimits, ModelSettings, SessionController};
use insightbot_config::{
    ensure_valid, load_template, redacted_snapshot, AppConfig, DatasetRegistry, Secrets,
};
use insightbot_planner::providers::build_provider;
use insightbot_security::TokenValidator;
use insightbot_tools::{BiToolkit, PowerBiClient};
use tracing::info;

pub struct Runtime {
    pub config: AppConfig,
    pub controller: Arc<SessionController>,
    pub validator: TokenValidator,
}

impl Runtime {
    /// Validate `config`, read secrets from the environment, and build
    /// every component. Any missing piece stops startup.
    pub async fn start(config: AppConfig) -> Result<Self> {
        ensure_valid(&config)?;
        info!(config = %redacted_snapshot(&config), "effective configuration");
        let secrets = Secrets::from_env()?;
        Self::with_secrets(config, secrets).await
    }

    pub async fn with_secrets(config: AppConfig, secrets: Secrets) -> Result<Self> {
        let datasets = Arc::new(DatasetRegistry::load(config.datasets_path.as_deref()).await?);
        datasets
            .lookup(&config.session.default_dataset)
            .context("session.defaultDataset must name a registered dataset")?;

        let template = load_template(config.prompt_template_path.as_deref()).await?;
        let llm = build_provider(&config.llm, &secrets.llm_api_key)?;
        let backend = PowerBiClient::new(
            &config.powerbi,
            &secrets.tenant_id,
            &secrets.client_id,
            &secrets.client_secret,
        )?;
        let toolkit = BiToolkit::new(Arc::new(backend), config.powerbi.sample_rows);

        let factory = AgentFactory::new(
            llm,
            toolkit,
            template,
            ModelSettings::from(&config.llm),
            LoopLimits::from(&config.agent),
        );
        let validator = TokenValidator::new(secrets.shared_secret.clone(), &config.auth);
        let controller = SessionController::new(
            datasets.clone(),
            validator.clone(),
            Arc::new(factory),
            config.session.clone(),
        );

        info!(
            datasets = datasets.keys().len(),
            default_dataset = %config.session.default_dataset,
            model = %config.llm.model,
            "runtime ready"
        );
        Ok(Self {
            config,
            controller: Arc::new(controller),
            validator,
        })
    }
}
