//! Session and dataset endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use insightbot_agent::{EntryParams, Session, StepRecord};
use insightbot_core::ChatMessage;
use insightbot_logging::spawn_event_drain;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::server::GatewayState;
use crate::session_registry::SessionHandle;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
    pub key: String,
    pub persona: String,
    pub table_names: Vec<String>,
    pub faqs: Vec<String>,
    pub is_default: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: String,
    pub authenticated: bool,
    pub active_dataset: Option<String>,
    pub history: Vec<ChatMessage>,
    pub insights: Option<String>,
}

impl SessionView {
    fn of(session: &Session) -> Self {
        let insights = session
            .active_dataset()
            .and_then(|key| session.insights(key))
            .map(|entry| entry.text.clone());
        Self {
            id: session.id.clone(),
            authenticated: session.authenticated,
            active_dataset: session.active_dataset().map(str::to_string),
            history: session.history().to_vec(),
            insights,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SelectDataset {
    pub key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSelected {
    pub active_dataset: String,
    pub insights: String,
}

#[derive(Debug, Deserialize)]
pub struct PostMessage {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct MessageReply {
    pub answer: String,
    pub iterations: Option<usize>,
    pub steps: Vec<StepRecord>,
}

async fn session_handle(state: &GatewayState, id: &str) -> Result<SessionHandle, ApiError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| ApiError::SessionNotFound(id.to_string()))
}

/// `GET /api/datasets`
pub async fn list_datasets(State(state): State<GatewayState>) -> Json<Vec<DatasetSummary>> {
    let default = state.controller.default_dataset();
    let summaries = state
        .controller
        .datasets()
        .iter()
        .map(|d| DatasetSummary {
            key: d.key.clone(),
            persona: d.persona.clone(),
            table_names: d.table_names.clone(),
            faqs: d.faqs.clone(),
            is_default: d.key == default,
        })
        .collect();
    Json(summaries)
}

/// `POST /api/sessions`
///
/// Entry parameters may come as query string, JSON body, or both; body
/// fields win. A session that fails authentication is not kept.
pub async fn create_session(
    State(state): State<GatewayState>,
    Query(query): Query<EntryParams>,
    body: Option<Json<EntryParams>>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let params = EntryParams {
        token: body.token.or(query.token),
        timestamp: body.timestamp.or(query.timestamp),
    };

    let mut session = Session::new();
    let (sink, _drain) = spawn_event_drain(session.id.clone());
    state
        .controller
        .bootstrap(&mut session, &params, Some(&sink))
        .await?;

    let view = SessionView::of(&session);
    state.sessions.insert(session).await;
    info!(session_id = %view.id, "session opened");
    Ok((StatusCode::CREATED, Json(view)))
}

/// `GET /api/sessions/:id`
pub async fn get_session(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let handle = session_handle(&state, &id).await?;
    let session = handle.lock().await;
    Ok(Json(SessionView::of(&session)))
}

/// `DELETE /api/sessions/:id`
pub async fn delete_session(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.sessions.remove(&id).await {
        info!(session_id = %id, "session closed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::SessionNotFound(id))
    }
}

/// `PUT /api/sessions/:id/dataset`
pub async fn select_dataset(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(req): Json<SelectDataset>,
) -> Result<Json<DatasetSelected>, ApiError> {
    let handle = session_handle(&state, &id).await?;
    let mut session = handle.lock().await;
    let (sink, _drain) = spawn_event_drain(id.clone());
    let insights = state
        .controller
        .select_dataset(&mut session, &req.key, Some(&sink))
        .await?;
    Ok(Json(DatasetSelected {
        active_dataset: req.key,
        insights,
    }))
}

/// `POST /api/sessions/:id/messages`
pub async fn post_message(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(req): Json<PostMessage>,
) -> Result<Json<MessageReply>, ApiError> {
    let question = req.content.trim();
    if question.is_empty() {
        return Err(ApiError::BadRequest("message content is empty".into()));
    }

    let handle = session_handle(&state, &id).await?;
    let mut session = handle.lock().await;
    let (sink, _drain) = spawn_event_drain(id.clone());
    let answer = state
        .controller
        .ask(&mut session, question, Some(&sink))
        .await?;

    let (iterations, steps) = match answer.outcome {
        Some(outcome) => (Some(outcome.iterations), outcome.steps),
        None => (None, Vec::new()),
    };
    Ok(Json(MessageReply {
        answer: answer.text,
        iterations,
        steps,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use axum::Router;
    use insightbot_agent::{Outcome, Reasoner, ReasonerFactory, SessionController};
    use insightbot_config::{AuthConfig, DatasetDescriptor, DatasetRegistry, SessionConfig};
    use insightbot_core::{EventSink, InsightError, ReasoningEvent};
    use insightbot_security::TokenValidator;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::server::{router, GatewayState};

    const SECRET: &str = "gateway-secret";

    struct EchoReasoner;

    #[async_trait]
    impl Reasoner for EchoReasoner {
        async fn run(
            &self,
            goal: &str,
            _history: &[insightbot_core::ChatMessage],
            events: Option<&EventSink>,
        ) -> Result<Outcome, InsightError> {
            ReasoningEvent::final_answer(goal).emit(events);
            Ok(Outcome {
                output: format!("answer: {goal}"),
                iterations: 1,
                steps: Vec::new(),
            })
        }
    }

    struct EchoFactory;

    impl ReasonerFactory for EchoFactory {
        fn for_dataset(&self, _dataset: &DatasetDescriptor) -> Arc<dyn Reasoner> {
            Arc::new(EchoReasoner)
        }
    }

    fn state() -> GatewayState {
        let controller = SessionController::new(
            Arc::new(DatasetRegistry::builtin().unwrap()),
            TokenValidator::new(SECRET, &AuthConfig::default()),
            Arc::new(EchoFactory),
            SessionConfig::default(),
        );
        GatewayState::new(Arc::new(controller), std::time::Duration::from_secs(60))
    }

    fn entry_body() -> Value {
        let token = TokenValidator::new(SECRET, &AuthConfig::default())
            .mint(chrono::Utc::now().timestamp());
        json!({ "token": token.token, "timestamp": token.timestamp })
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (u16, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let resp = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = resp.status().as_u16();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn health_and_datasets() {
        let app = router(state());
        let (status, body) = call(&app, Method::GET, "/api/health", None).await;
        assert_eq!(status, 200);
        assert_eq!(body["status"], "ok");

        let (status, body) = call(&app, Method::GET, "/api/datasets", None).await;
        assert_eq!(status, 200);
        assert_eq!(body[0]["key"], "Incident_Tracker");
        assert_eq!(body[0]["isDefault"], true);
    }

    #[tokio::test]
    async fn session_without_token_is_unauthorized_and_not_kept() {
        let state = state();
        let app = router(state.clone());
        let (status, body) = call(&app, Method::POST, "/api/sessions", Some(json!({}))).await;
        assert_eq!(status, 401);
        assert_eq!(body["error"], "auth_required");
        assert!(state.sessions.is_empty().await);
    }

    #[tokio::test]
    async fn token_in_query_string_is_accepted() {
        let app = router(state());
        let entry = entry_body();
        let uri = format!(
            "/api/sessions?token={}&timestamp={}",
            entry["token"].as_str().unwrap(),
            entry["timestamp"].as_str().unwrap()
        );
        let (status, body) = call(&app, Method::POST, &uri, None).await;
        assert_eq!(status, 201);
        assert_eq!(body["authenticated"], true);
    }

    #[tokio::test]
    async fn full_conversation_flow() {
        let app = router(state());
        let (status, body) = call(&app, Method::POST, "/api/sessions", Some(entry_body())).await;
        assert_eq!(status, 201);
        let id = body["id"].as_str().unwrap().to_string();
        assert_eq!(body["activeDataset"], "Incident_Tracker");
        assert_eq!(body["history"][0]["role"], "assistant");
        assert!(body["insights"].as_str().unwrap().starts_with("answer: "));

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/sessions/{id}/messages"),
            Some(json!({ "content": "How many incidents are open?" })),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["answer"], "answer: How many incidents are open?");
        assert_eq!(body["iterations"], 1);

        let (status, body) = call(&app, Method::GET, &format!("/api/sessions/{id}"), None).await;
        assert_eq!(status, 200);
        assert_eq!(body["history"].as_array().unwrap().len(), 3);

        let (status, body) = call(
            &app,
            Method::PUT,
            &format!("/api/sessions/{id}/dataset"),
            Some(json!({ "key": "Nope" })),
        )
        .await;
        assert_eq!(status, 404);
        assert_eq!(body["error"], "unknown_dataset");

        let (status, _) = call(&app, Method::DELETE, &format!("/api/sessions/{id}"), None).await;
        assert_eq!(status, 204);
        let (status, body) = call(&app, Method::GET, &format!("/api/sessions/{id}"), None).await;
        assert_eq!(status, 404);
        assert_eq!(body["error"], "session_not_found");
    }

    #[tokio::test]
    async fn empty_message_is_bad_request() {
        let app = router(state());
        let (_, body) = call(&app, Method::POST, "/api/sessions", Some(entry_body())).await;
        let id = body["id"].as_str().unwrap().to_string();
        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/sessions/{id}/messages"),
            Some(json!({ "content": "   " })),
        )
        .await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "bad_request");
    }
}
