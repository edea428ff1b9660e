//! HTTP surface — REST API the widget front-end drives.
//!
//! One route per UI affordance: free text, service selection, binary
//! choice, contact form. Every action returns a fresh snapshot so the
//! front-end re-renders from transcript + state.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::catalog::{SERVICES, Service};
use crate::config::FlowConfig;
use crate::engine::{EngineDeps, SessionEngine};
use crate::flow::{ConversationState, InputMode};
use crate::session::{ContactInfo, Message};

type SessionMap = Arc<RwLock<HashMap<String, Arc<Mutex<SessionEngine>>>>>;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    sessions: SessionMap,
    deps: EngineDeps,
    flow: FlowConfig,
}

impl AppState {
    pub fn new(flow: FlowConfig, deps: EngineDeps) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            deps,
            flow,
        }
    }
}

/// Build the widget API router. CORS is permissive: the widget is embedded
/// on third-party pages.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/session", post(create_session))
        .route("/api/session/{id}", get(get_session))
        .route("/api/session/{id}/message", post(post_message))
        .route("/api/session/{id}/select", post(post_select))
        .route("/api/session/{id}/decision", post(post_decision))
        .route("/api/session/{id}/contact", post(post_contact))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Wire types ──────────────────────────────────────────────────────

/// Snapshot the front-end renders from.
#[derive(Debug, serde::Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub state: ConversationState,
    pub input_mode: InputMode,
    pub transcript: Vec<Message>,
    /// The catalog, present only while a selection is expected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<&'static [Service]>,
    pub completed: bool,
}

fn snapshot(engine: &SessionEngine) -> SessionSnapshot {
    let session = engine.session();
    SessionSnapshot {
        session_id: session.id.clone(),
        state: session.state,
        input_mode: session.state.input_mode(),
        transcript: session.transcript().to_vec(),
        services: (session.state == ConversationState::ServiceSelection).then_some(SERVICES),
        completed: session.state.is_terminal(),
    }
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    text: String,
}

#[derive(Debug, Deserialize)]
struct SelectBody {
    service_id: String,
}

#[derive(Debug, Deserialize)]
struct DecisionBody {
    yes: bool,
}

// ── Handlers ────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    "ok"
}

async fn create_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    let mut engine = SessionEngine::new(state.flow.clone(), state.deps.clone());
    engine.start().await;

    let snap = snapshot(&engine);
    let id = snap.session_id.clone();
    state
        .sessions
        .write()
        .await
        .insert(id.clone(), Arc::new(Mutex::new(engine)));
    info!(session = %id, "Session created");
    Json(snap)
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, StatusCode> {
    let engine = lookup(&state, &id).await?;
    let engine = engine.lock().await;
    Ok(Json(snapshot(&engine)))
}

async fn post_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<MessageBody>,
) -> Result<Json<SessionSnapshot>, StatusCode> {
    let engine = lookup(&state, &id).await?;
    let mut engine = engine.lock().await;
    engine.send_text(&body.text).await;
    Ok(Json(snapshot(&engine)))
}

async fn post_select(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SelectBody>,
) -> Result<Json<SessionSnapshot>, StatusCode> {
    let engine = lookup(&state, &id).await?;
    let mut engine = engine.lock().await;
    engine.select_service(&body.service_id).await;
    Ok(Json(snapshot(&engine)))
}

async fn post_decision(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<DecisionBody>,
) -> Result<Json<SessionSnapshot>, StatusCode> {
    let engine = lookup(&state, &id).await?;
    let mut engine = engine.lock().await;
    engine.decide(body.yes).await;
    Ok(Json(snapshot(&engine)))
}

async fn post_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(contact): Json<ContactInfo>,
) -> Result<Json<SessionSnapshot>, StatusCode> {
    let engine = lookup(&state, &id).await?;
    let mut engine = engine.lock().await;
    engine.submit_contact(contact).await;
    Ok(Json(snapshot(&engine)))
}

async fn lookup(
    state: &AppState,
    id: &str,
) -> Result<Arc<Mutex<SessionEngine>>, StatusCode> {
    state
        .sessions
        .read()
        .await
        .get(id)
        .cloned()
        .ok_or(StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReplyError;
    use crate::reply::ReplySource;
    use async_trait::async_trait;

    struct CannedReply;

    #[async_trait]
    impl ReplySource for CannedReply {
        async fn reply(
            &self,
            _history: &[Message],
            _local_time: &str,
            _service: Option<&str>,
        ) -> Result<String, ReplyError> {
            Ok("Bonjour, je suis Ruby.".to_string())
        }
    }

    fn test_state() -> AppState {
        AppState::new(
            FlowConfig::classic().instant(),
            EngineDeps {
                store: None,
                reply: Arc::new(CannedReply),
                notifier: None,
            },
        )
    }

    #[tokio::test]
    async fn create_then_fetch_session() {
        let state = test_state();
        let Json(created) = create_session(State(state.clone())).await;

        assert_eq!(created.state, ConversationState::ServiceSelection);
        assert_eq!(created.input_mode, InputMode::FreeText);
        assert!(created.services.is_some());
        assert_eq!(created.transcript.len(), 1);

        let fetched = get_session(State(state), Path(created.session_id.clone()))
            .await
            .unwrap();
        assert_eq!(fetched.0.session_id, created.session_id);
    }

    #[tokio::test]
    async fn unknown_session_is_404() {
        let state = test_state();
        let result = get_session(State(state), Path("missing".to_string())).await;
        assert!(matches!(result, Err(StatusCode::NOT_FOUND)));
    }

    #[tokio::test]
    async fn select_advances_to_validation() {
        let state = test_state();
        let Json(created) = create_session(State(state.clone())).await;

        let snap = post_select(
            State(state),
            Path(created.session_id),
            Json(SelectBody {
                service_id: "coaching".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(snap.0.state, ConversationState::Validation);
        assert_eq!(snap.0.input_mode, InputMode::Binary);
        assert!(snap.0.services.is_none());
    }
}
