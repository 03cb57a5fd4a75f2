//! How the assistant introduces itself.

use insightbot_config::SessionConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantIdentity {
    pub name: String,
    pub user_name: String,
}

impl Default for AssistantIdentity {
    fn default() -> Self {
        Self::from(&SessionConfig::default())
    }
}

impl From<&SessionConfig> for AssistantIdentity {
    fn from(config: &SessionConfig) -> Self {
        Self::new(&config.assistant_name, &config.user_name)
    }
}

impl AssistantIdentity {
    pub fn new(name: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            user_name: user_name.into(),
        }
    }

    /// Opening assistant message for a dataset persona.
    pub fn greeting(&self, persona: &str) -> String {
        format!(
            "Hello {}! I am {}, your Power BI Assistant for **{}**. How can I help you?",
            self.user_name, self.name, persona
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_names_user_assistant_and_persona() {
        let identity = AssistantIdentity::new("Straibot", "Dana");
        assert_eq!(
            identity.greeting("Incident Management Analytics"),
            "Hello Dana! I am Straibot, your Power BI Assistant for **Incident Management Analytics**. How can I help you?"
        );
    }

    #[test]
    fn default_identity_follows_session_defaults() {
        let identity = AssistantIdentity::default();
        assert_eq!(identity.name, "Straibot");
    }
}
