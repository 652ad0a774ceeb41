//! Route handlers for the observed client contract.
//!
//! Reads resolve the caller's role from the user registry and pass through
//! `medledger_access::scope` before touching the store — the client's
//! `role` query/body field is accepted for contract compatibility but never
//! trusted. Unknown callers fail closed: reads return the empty set, writes
//! and chat return 401.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::debug;

use medledger_access::scope;
use medledger_chat::ChatReply;
use medledger_contracts::{
    Action, AuditEntry, Caller, ClinicalPayload, EntryFilter, LedgerError, LedgerResult, Role,
};

use crate::error::ApiError;
use crate::state::AppState;

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct LogsQuery {
    user_id: String,
    /// Accepted but ignored; the registry is authoritative.
    #[serde(default)]
    #[allow(dead_code)]
    role: Option<Role>,
    #[serde(default)]
    patient_id: Option<String>,
    #[serde(default)]
    patient_name: Option<String>,
}

#[derive(Debug, Serialize)]
struct LogsResponse {
    logs: Vec<AuditEntry>,
}

#[derive(Debug, Deserialize)]
struct AddLogRequest {
    user_id: String,
    patient_id: String,
    action: Action,
    #[serde(default)]
    patient_name: Option<String>,
    #[serde(default)]
    age: Option<i64>,
    #[serde(default)]
    gender: Option<String>,
    #[serde(default)]
    diagnosis: Option<String>,
    #[serde(default)]
    medication: Option<String>,
    /// Free-text notes travel as `data` on the wire.
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    visit_date: Option<String>,
    #[serde(default)]
    vitals: Option<String>,
}

impl AddLogRequest {
    fn into_payload(self) -> ClinicalPayload {
        ClinicalPayload {
            patient_name: self.patient_name,
            age: self.age,
            gender: self.gender,
            diagnosis: self.diagnosis,
            medication: self.medication,
            notes: self.data,
            visit_date: self.visit_date,
            vitals: self.vitals,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ModifyLogRequest {
    user_id: String,
    #[serde(default)]
    patient_name: Option<String>,
    #[serde(default)]
    age: Option<i64>,
    #[serde(default)]
    gender: Option<String>,
    #[serde(default)]
    diagnosis: Option<String>,
    #[serde(default)]
    medication: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    visit_date: Option<String>,
    #[serde(default)]
    vitals: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ActorQuery {
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    user_id: String,
    #[serde(default)]
    #[allow(dead_code)]
    role: Option<Role>,
    question: String,
    #[serde(default)]
    patient_id: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    patient_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    user_id: String,
    password: String,
    role: Role,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    user_id: String,
    password: String,
    #[serde(default)]
    #[allow(dead_code)]
    role: Option<Role>,
}

#[derive(Debug, Serialize)]
struct SessionResponse {
    user_id: String,
    role: Role,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Debug, Serialize)]
struct ValidateResponse {
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    invalid_sequence_ids: Vec<u64>,
}

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the full application router.
///
/// `cors_origin` is the browser client's origin, or `"*"` to allow any.
pub fn router(state: AppState, cors_origin: &str) -> LedgerResult<Router> {
    let cors = if cors_origin == "*" {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origin =
            cors_origin
                .parse::<HeaderValue>()
                .map_err(|e| LedgerError::Config {
                    reason: format!("invalid cors_origin '{cors_origin}': {e}"),
                })?;
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Ok(Router::new()
        .route("/api/audit/logs", get(list_logs))
        .route("/api/audit/add-log", post(add_log))
        .route("/api/audit/modify-log/:id", put(modify_log))
        .route("/api/audit/delete-log/:id", delete(delete_log))
        .route("/api/audit/chat", post(chat))
        .route("/api/audit/validate", get(validate_chain))
        .route("/register", post(register))
        .route("/login", post(login))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

/// Resolve the authenticated caller for `user_id`, or 401.
fn resolve_caller(state: &AppState, user_id: &str) -> Result<Caller, ApiError> {
    let role = state
        .users
        .resolve(user_id)
        .ok_or_else(|| ApiError::unknown_user(user_id))?;
    Ok(Caller::new(user_id, role))
}

// ── Handlers ──────────────────────────────────────────────────────────────────

async fn list_logs(
    State(state): State<AppState>,
    Query(params): Query<LogsQuery>,
) -> Result<Json<LogsResponse>, ApiError> {
    // Unknown callers read nothing, matching the observed "no logs" UI.
    let Some(role) = state.users.resolve(&params.user_id) else {
        debug!(user_id = %params.user_id, "unknown caller; returning empty log set");
        return Ok(Json(LogsResponse { logs: Vec::new() }));
    };
    let caller = Caller::new(params.user_id, role);

    let requested = EntryFilter {
        patient_id: params.patient_id,
        patient_name: params.patient_name,
        ..EntryFilter::default()
    };
    let effective = scope(&caller, &requested);

    let logs = state.store.list(&effective)?;
    Ok(Json(LogsResponse { logs }))
}

async fn add_log(
    State(state): State<AppState>,
    Json(req): Json<AddLogRequest>,
) -> Result<(StatusCode, Json<AuditEntry>), ApiError> {
    let caller = resolve_caller(&state, &req.user_id)?;
    let patient_id = req.patient_id.clone();
    let action = req.action;

    let entry = state
        .lifecycle
        .submit(&caller.actor_id, &patient_id, action, req.into_payload())?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn modify_log(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<ModifyLogRequest>,
) -> Result<Json<AuditEntry>, ApiError> {
    let caller = resolve_caller(&state, &req.user_id)?;

    let patient_id = state
        .lifecycle
        .resolve_patient(id)?
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, format!("no audit entry with id {id}")))?;

    let payload = ClinicalPayload {
        patient_name: req.patient_name,
        age: req.age,
        gender: req.gender,
        diagnosis: req.diagnosis,
        medication: req.medication,
        notes: req.notes,
        visit_date: req.visit_date,
        vitals: req.vitals,
    };

    let entry = state
        .lifecycle
        .submit(&caller.actor_id, &patient_id, Action::Modify, payload)?;
    Ok(Json(entry))
}

async fn delete_log(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(params): Query<ActorQuery>,
) -> Result<Json<MessageResponse>, ApiError> {
    let caller = resolve_caller(&state, &params.user_id)?;

    let patient_id = state
        .lifecycle
        .resolve_patient(id)?
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, format!("no audit entry with id {id}")))?;

    state.lifecycle.submit(
        &caller.actor_id,
        &patient_id,
        Action::Delete,
        ClinicalPayload::default(),
    )?;

    Ok(Json(MessageResponse {
        message: format!("record for patient '{patient_id}' tombstoned"),
    }))
}

async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    let caller = resolve_caller(&state, &req.user_id)?;
    let reply = state
        .chat
        .route(&req.question, &caller, req.patient_id.as_deref());
    Ok(Json(reply))
}

async fn validate_chain(
    State(state): State<AppState>,
) -> Result<Json<ValidateResponse>, ApiError> {
    match state.store.verify_chain() {
        Ok(()) => Ok(Json(ValidateResponse {
            message: "Audit chain is valid".to_string(),
            invalid_sequence_ids: Vec::new(),
        })),
        Err(LedgerError::ChainIntegrity { broken }) => Ok(Json(ValidateResponse {
            message: "Audit chain is broken".to_string(),
            invalid_sequence_ids: broken,
        })),
        Err(other) => Err(other.into()),
    }
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.users.register(&req.user_id, &req.password, req.role)?;
    Ok(Json(MessageResponse {
        message: "User registered successfully".to_string(),
    }))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let role = state.users.login(&req.user_id, &req.password)?;
    Ok(Json(SessionResponse {
        user_id: req.user_id,
        role,
    }))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
