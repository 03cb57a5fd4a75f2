use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use insightbot_config::PowerBiConfig;

use super::credential::ClientSecretCredential;
use super::result::{error_text, QueryResult};
use super::{BiError, QueryBackend};

/// Executes DAX queries through the Power BI REST API.
pub struct PowerBiClient {
    http: Client,
    api_base_url: String,
    credential: ClientSecretCredential,
}

impl PowerBiClient {
    pub fn new(
        config: &PowerBiConfig,
        tenant_id: &str,
        client_id: &str,
        client_secret: &str,
    ) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build Power BI HTTP client")?;
        let credential = ClientSecretCredential::new(
            http.clone(),
            &config.authority_host,
            tenant_id,
            client_id,
            client_secret,
        );
        Ok(Self {
            http,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            credential,
        })
    }

    fn execute_url(&self, dataset_id: &str) -> String {
        format!("{}/datasets/{}/executeQueries", self.api_base_url, dataset_id)
    }
}

fn request_body(query: &str) -> Value {
    json!({
        "queries": [{ "query": query }],
        "serializerSettings": { "includeNulls": true }
    })
}

#[async_trait]
impl QueryBackend for PowerBiClient {
    #[instrument(skip(self, query), fields(query_len = query.len()))]
    async fn execute(&self, dataset_id: &str, query: &str) -> Result<QueryResult, BiError> {
        let token = self.credential.token().await?;

        debug!("Executing DAX query");
        let response = self
            .http
            .post(self.execute_url(dataset_id))
            .bearer_auth(token)
            .json(&request_body(query))
            .send()
            .await?;

        let status = response.status();
        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) if status.is_success() => return Err(BiError::Malformed(e.to_string())),
            Err(_) => Value::Null,
        };

        if !status.is_success() {
            let message = body
                .get("error")
                .map(error_text)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
            warn!(status = status.as_u16(), %message, "Power BI rejected query");
            return Err(BiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        QueryResult::from_response(&body)
    }
}
