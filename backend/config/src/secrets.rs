//! Credentials required before the service can do anything useful.

use std::fmt;

pub const TENANT_ID_VAR: &str = "POWERBI_TENANT_ID";
pub const CLIENT_ID_VAR: &str = "POWERBI_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "POWERBI_CLIENT_SECRET";
pub const LLM_API_KEY_VAR: &str = "OPEN_API_KEY";
pub const SHARED_SECRET_VAR: &str = "INSIGHTBOT_SHARED_SECRET";

/// Every required secret that was absent, reported in one go.
#[derive(Debug, thiserror::Error)]
#[error("Missing secret(s): {}. Set them in the environment before starting.", .names.join(", "))]
pub struct MissingSecretError {
    pub names: Vec<String>,
}

#[derive(Clone)]
pub struct Secrets {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub llm_api_key: String,
    /// Shared with the host application that signs access tokens.
    pub shared_secret: String,
}

impl Secrets {
    pub fn from_env() -> Result<Self, MissingSecretError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve every secret through `lookup`; blank values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, MissingSecretError> {
        let mut missing = Vec::new();
        let mut take = |name: &str| match lookup(name) {
            Some(v) if !v.trim().is_empty() => v,
            _ => {
                missing.push(name.to_string());
                String::new()
            }
        };

        let secrets = Self {
            tenant_id: take(TENANT_ID_VAR),
            client_id: take(CLIENT_ID_VAR),
            client_secret: take(CLIENT_SECRET_VAR),
            llm_api_key: take(LLM_API_KEY_VAR),
            shared_secret: take(SHARED_SECRET_VAR),
        };

        if missing.is_empty() {
            Ok(secrets)
        } else {
            Err(MissingSecretError { names: missing })
        }
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("llm_api_key", &"***")
            .field("shared_secret", &"***")
            .finish()
    }
}
