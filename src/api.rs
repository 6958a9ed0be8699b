//! REST API Server for the loan sales assistant
//!
//! Exposes conversations, sanction letters and feedback via HTTP endpoints.
//! Each session is held in memory behind its own lock, so turns of one
//! session are serialized while different sessions run concurrently.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::conversation::{Conversation, LoanAssistant};
use crate::error::LoanAssistantError;
use crate::feedback::FeedbackLog;
use crate::language::Language;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatRequest {
    /// Any string; non-UUID ids are mapped to a stable UUID.
    pub session_id: Option<String>,
    pub message: String,
    /// Language code (`hi`, `ta`, ...) overriding detection.
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FeedbackRequest {
    pub rating: u8,
    #[serde(default)]
    pub feedback: String,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

type ApiResult = (StatusCode, Json<ApiResponse>);

fn failure(status: StatusCode, message: impl Into<String>) -> ApiResult {
    (status, Json(ApiResponse::error(message.into())))
}

/// =============================
/// API State
/// =============================

/// Sessions untouched for this long are dropped on the next new session.
pub const DEFAULT_SESSION_IDLE_TIMEOUT_MINUTES: i64 = 30;

struct SessionSlot {
    conversation: Arc<Mutex<Conversation>>,
    last_active: AtomicI64,
}

impl SessionSlot {
    fn new(id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            conversation: Arc::new(Mutex::new(Conversation::with_id(id))),
            last_active: AtomicI64::new(now.timestamp()),
        }
    }

    fn touch(&self, now: DateTime<Utc>) {
        self.last_active.store(now.timestamp(), Ordering::Relaxed);
    }

    fn idle_since(&self, cutoff: DateTime<Utc>) -> bool {
        self.last_active.load(Ordering::Relaxed) < cutoff.timestamp()
    }
}

type SessionMap = HashMap<Uuid, Arc<SessionSlot>>;

#[derive(Clone)]
pub struct ApiState {
    pub assistant: Arc<LoanAssistant>,
    pub feedback: Arc<FeedbackLog>,
    sessions: Arc<RwLock<SessionMap>>,
    idle_timeout: Duration,
}

impl ApiState {
    pub fn new(assistant: Arc<LoanAssistant>, feedback: Arc<FeedbackLog>) -> Self {
        Self {
            assistant,
            feedback,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout: Duration::minutes(DEFAULT_SESSION_IDLE_TIMEOUT_MINUTES),
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    async fn session(&self, id: Uuid) -> Option<Arc<Mutex<Conversation>>> {
        let sessions = self.sessions.read().await;
        let slot = sessions.get(&id)?;
        slot.touch(Utc::now());
        Some(slot.conversation.clone())
    }

    async fn session_or_create(&self, id: Uuid) -> Arc<Mutex<Conversation>> {
        if let Some(existing) = self.session(id).await {
            return existing;
        }

        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        prune_idle(&mut sessions, now - self.idle_timeout);
        sessions
            .entry(id)
            .or_insert_with(|| {
                info!(session_id = %id, "Opening new session");
                Arc::new(SessionSlot::new(id, now))
            })
            .conversation
            .clone()
    }

    /// Drop every session idle for longer than the timeout as of `now`.
    pub async fn prune_idle_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        prune_idle(&mut sessions, now - self.idle_timeout)
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

fn prune_idle(sessions: &mut SessionMap, cutoff: DateTime<Utc>) -> usize {
    let before = sessions.len();
    sessions.retain(|_, slot| !slot.idle_since(cutoff));
    let pruned = before - sessions.len();
    if pruned > 0 {
        info!(pruned, remaining = sessions.len(), "Pruned idle sessions");
    }
    pruned
}

/// =============================
/// Helpers: Session Ids
/// =============================

fn stable_uuid_from_string(input: &str) -> Uuid {
    use sha2::{Digest, Sha256};

    let hash = Sha256::digest(input.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&hash[..16]);

    // Set UUID version (4) and variant (RFC4122) bits.
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    Uuid::from_bytes(bytes)
}

fn parse_or_stable_uuid(value: &str) -> Uuid {
    let value = value.trim();
    Uuid::parse_str(value).unwrap_or_else(|_| stable_uuid_from_string(value))
}

fn session_id_or_new(value: Option<&str>) -> Uuid {
    match value {
        Some(v) if !v.trim().is_empty() => parse_or_stable_uuid(v),
        _ => Uuid::new_v4(),
    }
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Chat Endpoint
/// =============================

async fn chat_handler(State(state): State<ApiState>, Json(req): Json<ChatRequest>) -> ApiResult {
    if req.message.trim().is_empty() {
        return failure(StatusCode::BAD_REQUEST, "Message must not be empty");
    }

    let language = match req.language.as_deref().filter(|code| !code.trim().is_empty()) {
        Some(code) => match Language::from_code(code) {
            Some(language) => Some(language),
            None => {
                return failure(
                    StatusCode::BAD_REQUEST,
                    format!("Unsupported language: {}", code),
                )
            }
        },
        None => None,
    };

    let session_id = session_id_or_new(req.session_id.as_deref());
    let session = state.session_or_create(session_id).await;
    let mut conversation = session.lock().await;
    if let Some(language) = language {
        conversation.set_language(language);
    }

    match state.assistant.respond(&mut conversation, &req.message).await {
        Ok(turn) => {
            info!(
                session_id = %session_id,
                stage = %turn.stage,
                progress = turn.progress,
                "Turn handled"
            );
            (
                StatusCode::OK,
                Json(ApiResponse::success(serde_json::json!({
                    "session_id": session_id.to_string(),
                    "reply": turn.reply,
                    "stage": turn.stage,
                    "stage_label": turn.stage_label,
                    "progress": turn.progress,
                    "sanction": turn.sanction,
                }))),
            )
        }
        Err(e) => {
            error!(session_id = %session_id, "Turn failed: {}", e);
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Could not process message: {}", e),
            )
        }
    }
}

/// =============================
/// Session Endpoints
/// =============================

async fn get_session(State(state): State<ApiState>, Path(id): Path<String>) -> ApiResult {
    let session_id = parse_or_stable_uuid(&id);
    let Some(session) = state.session(session_id).await else {
        return failure(StatusCode::NOT_FOUND, session_missing(&id));
    };

    let conversation = session.lock().await;
    let stage = conversation.stage();
    (
        StatusCode::OK,
        Json(ApiResponse::success(serde_json::json!({
            "session_id": session_id.to_string(),
            "stage": stage,
            "stage_label": stage.label(),
            "progress": stage.progress(),
            "record": conversation.record(),
            "transcript": conversation.transcript(),
        }))),
    )
}

async fn reset_session(State(state): State<ApiState>, Path(id): Path<String>) -> ApiResult {
    let session_id = parse_or_stable_uuid(&id);
    let Some(session) = state.session(session_id).await else {
        return failure(StatusCode::NOT_FOUND, session_missing(&id));
    };

    let mut conversation = session.lock().await;
    conversation.restart();
    info!(session_id = %session_id, "Session restarted");

    let stage = conversation.stage();
    (
        StatusCode::OK,
        Json(ApiResponse::success(serde_json::json!({
            "session_id": session_id.to_string(),
            "stage": stage,
            "stage_label": stage.label(),
            "progress": stage.progress(),
        }))),
    )
}

async fn sanction_letter(State(state): State<ApiState>, Path(id): Path<String>) -> Response {
    let session_id = parse_or_stable_uuid(&id);
    let Some(session) = state.session(session_id).await else {
        return failure(StatusCode::NOT_FOUND, session_missing(&id)).into_response();
    };

    let file = session.lock().await.record().sanction_file.clone();
    let Some(path) = file else {
        return failure(StatusCode::NOT_FOUND, "No sanction letter for this session")
            .into_response();
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "sanction_letter.pdf".to_string());
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", file_name),
                    ),
                ],
                Body::from(bytes),
            )
                .into_response()
        }
        Err(e) => {
            warn!(path = %path.display(), "Sanction letter unreadable: {}", e);
            failure(StatusCode::NOT_FOUND, "Sanction letter is no longer available")
                .into_response()
        }
    }
}

fn session_missing(id: &str) -> String {
    LoanAssistantError::SessionNotFound(id.to_string()).to_string()
}

/// =============================
/// Feedback Endpoints
/// =============================

async fn submit_feedback(
    State(state): State<ApiState>,
    Json(req): Json<FeedbackRequest>,
) -> ApiResult {
    match state.feedback.submit(req.rating, &req.feedback).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::success(serde_json::json!({ "recorded": true }))),
        ),
        Err(e @ LoanAssistantError::InvalidInput(_)) => {
            failure(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(e) => {
            error!("Feedback could not be recorded: {}", e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn feedback_summary(State(state): State<ApiState>) -> ApiResult {
    match state.feedback.summary().await {
        Ok(summary) => (StatusCode::OK, Json(ApiResponse::success(summary))),
        Err(e) => {
            error!("Feedback summary failed: {}", e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat_handler))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id/reset", post(reset_session))
        .route("/api/sessions/:id/sanction-letter", get(sanction_letter))
        .route("/api/feedback", post(submit_feedback))
        .route("/api/feedback/summary", get(feedback_summary))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    state: ApiState,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
