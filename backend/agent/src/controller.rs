//! Session controller: gates a session on its access token, then drives the
//! greeting, dataset selection with key insights, and question answering.

use std::sync::Arc;

use insightbot_config::{DatasetDescriptor, DatasetRegistry, InsightsCachePolicy, SessionConfig};
use insightbot_core::{ChatMessage, EventSink, InsightError};
use insightbot_security::TokenValidator;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use crate::agent_loop::Outcome;
use crate::assistant_identity::AssistantIdentity;
use crate::factory::ReasonerFactory;
use crate::session_state::{InsightsEntry, Session};

/// Entry parameters carried by the link that opened the session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryParams {
    pub token: Option<String>,
    pub timestamp: Option<String>,
}

impl EntryParams {
    pub fn new(token: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            timestamp: Some(timestamp.into()),
        }
    }
}

/// Reply to a user question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    /// Present only when the reasoning loop completed.
    pub outcome: Option<Outcome>,
}

pub struct SessionController {
    datasets: Arc<DatasetRegistry>,
    validator: TokenValidator,
    reasoners: Arc<dyn ReasonerFactory>,
    identity: AssistantIdentity,
    settings: SessionConfig,
}

impl SessionController {
    pub fn new(
        datasets: Arc<DatasetRegistry>,
        validator: TokenValidator,
        reasoners: Arc<dyn ReasonerFactory>,
        settings: SessionConfig,
    ) -> Self {
        Self {
            datasets,
            validator,
            reasoners,
            identity: AssistantIdentity::from(&settings),
            settings,
        }
    }

    pub fn datasets(&self) -> &DatasetRegistry {
        &self.datasets
    }

    pub fn default_dataset(&self) -> &str {
        &self.settings.default_dataset
    }

    /// Check the entry token once and greet. Already authenticated sessions
    /// pass straight through.
    #[instrument(skip_all, fields(session_id = %session.id))]
    pub fn authenticate(&self, session: &mut Session, params: &EntryParams) -> Result<(), InsightError> {
        if session.authenticated {
            return Ok(());
        }

        let token = params
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(InsightError::AuthRequired)?;
        let timestamp = params.timestamp.as_deref().unwrap_or_default();

        self.validator.validate(token, timestamp).map_err(|err| {
            warn!(error = %err, "entry token rejected");
            InsightError::from(err)
        })?;

        let key = session
            .active_dataset()
            .unwrap_or(&self.settings.default_dataset)
            .to_string();
        let dataset = self.datasets.lookup(&key)?;

        session.authenticated = true;
        if session.history().is_empty() {
            session.push(ChatMessage::assistant(self.identity.greeting(&dataset.persona)));
        }
        info!(dataset = %key, "session authenticated");
        Ok(())
    }

    /// Authenticate, then activate the current (or default) dataset.
    /// Returns that dataset's key insights.
    pub async fn bootstrap(
        &self,
        session: &mut Session,
        params: &EntryParams,
        events: Option<&EventSink>,
    ) -> Result<String, InsightError> {
        self.authenticate(session, params)?;
        let key = session
            .active_dataset()
            .unwrap_or(&self.settings.default_dataset)
            .to_string();
        self.select_dataset(session, &key, events).await
    }

    /// Make `key` the active dataset and return its key insights, generating
    /// them at most once per session under the configured cache policy.
    #[instrument(skip(self, session, events), fields(session_id = %session.id))]
    pub async fn select_dataset(
        &self,
        session: &mut Session,
        key: &str,
        events: Option<&EventSink>,
    ) -> Result<String, InsightError> {
        require_auth(session)?;
        let dataset = self.datasets.lookup(key)?;
        if session.set_active_dataset(key) {
            info!(dataset = key, "active dataset changed");
        }

        if let Some(entry) = session.insights(key) {
            return Ok(entry.text.clone());
        }

        let entry = self.generate_insights(session, &dataset, events).await;
        let keep = entry.ok || self.settings.insights_cache_policy == InsightsCachePolicy::CacheAll;
        let text = entry.text.clone();
        if keep {
            session.remember_insights(key, entry);
        }
        Ok(text)
    }

    async fn generate_insights(
        &self,
        session: &Session,
        dataset: &DatasetDescriptor,
        events: Option<&EventSink>,
    ) -> InsightsEntry {
        let reasoner = self.reasoners.for_dataset(dataset);
        match reasoner
            .run(&dataset.key_insights_query, session.history(), events)
            .await
        {
            Ok(outcome) => InsightsEntry {
                text: outcome.output,
                ok: true,
            },
            Err(err) => {
                error!(dataset = %dataset.key, error = %err, "key insights failed");
                InsightsEntry {
                    text: format!("Error generating insights for {}: {}", dataset.persona, err),
                    ok: false,
                }
            }
        }
    }

    /// Answer a question against the active dataset. The question and the
    /// reply are both appended to history; reasoning failures become the
    /// configured failure message.
    #[instrument(skip(self, session, question, events), fields(session_id = %session.id))]
    pub async fn ask(
        &self,
        session: &mut Session,
        question: &str,
        events: Option<&EventSink>,
    ) -> Result<Answer, InsightError> {
        require_auth(session)?;
        let key = session
            .active_dataset()
            .unwrap_or(&self.settings.default_dataset)
            .to_string();
        let dataset = self.datasets.lookup(&key)?;
        session.set_active_dataset(&key);

        session.push(ChatMessage::user(question));
        let reasoner = self.reasoners.for_dataset(&dataset);
        let answer = match reasoner.run(question, session.history(), events).await {
            Ok(outcome) => Answer {
                text: outcome.output.clone(),
                outcome: Some(outcome),
            },
            Err(err) => {
                error!(dataset = %key, kind = err.kind(), error = %err, "question failed");
                Answer {
                    text: self.settings.failure_message.clone(),
                    outcome: None,
                }
            }
        };
        session.push(ChatMessage::assistant(answer.text.clone()));
        Ok(answer)
    }
}

fn require_auth(session: &Session) -> Result<(), InsightError> {
    if session.authenticated {
        Ok(())
    } else {
        Err(InsightError::AuthRequired)
    }
}
