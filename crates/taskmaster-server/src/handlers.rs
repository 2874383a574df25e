//! Endpoint handlers.
//!
//! Each task endpoint follows the same contract: validate request shape,
//! call the store, map the result. Validation happens before any storage
//! access; storage errors collapse into the generic 500 via [`ApiError`].

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;

use taskmaster_core::task::now_rfc3339;
use taskmaster_core::{NewTask, Task, ACTIVE_LIMIT, COMPLETED_LIMIT};

use crate::error::ApiError;
use crate::server::AppState;

/// Create request body. Unknown fields are ignored; a missing title is
/// a validation failure, not a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// POST /tasks
pub async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let Json(req) = payload.map_err(|_| ApiError::Validation("Invalid request body".into()))?;
    let new = NewTask::parse(req.title.as_deref(), req.description.as_deref())?;
    let task = state.store.create(&new)?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /tasks: up to 5 incomplete tasks, newest first.
pub async fn list_active(State(state): State<AppState>) -> Result<Json<Vec<Task>>, ApiError> {
    Ok(Json(state.store.list_recent_incomplete(ACTIVE_LIMIT)?))
}

/// GET /tasks/completed: up to 10 completed tasks, newest first.
pub async fn list_completed(State(state): State<AppState>) -> Result<Json<Vec<Task>>, ApiError> {
    Ok(Json(state.store.list_recent_completed(COMPLETED_LIMIT)?))
}

/// PATCH /tasks/{id}/complete
///
/// The id arrives as a raw path segment and is parsed strictly, so
/// `abc` and `12abc` are both validation failures before any storage
/// access.
pub async fn complete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let id: i64 = id
        .parse()
        .map_err(|_| ApiError::Validation("Invalid task ID".into()))?;
    match state.store.mark_complete(id)? {
        Some(task) => Ok(Json(task)),
        None => Err(ApiError::NotFound(
            "Task not found or already completed".into(),
        )),
    }
}

/// Liveness response body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"healthy"` while the process is serving.
    pub status: String,
    /// Time the report was produced.
    pub timestamp: String,
    /// `"connected"` or `"disconnected"`.
    pub database: String,
    /// Present only when the database is unreachable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Whole seconds since the server started.
    pub uptime: u64,
}

/// Build a liveness report from a probe result.
pub fn health_check(database_ok: bool, started_at: Instant) -> HealthResponse {
    HealthResponse {
        status: "healthy".into(),
        timestamp: now_rfc3339(),
        database: if database_ok {
            "connected".into()
        } else {
            "disconnected".into()
        },
        warning: (!database_ok)
            .then(|| "Database connection failed but service is running".to_string()),
        uptime: started_at.elapsed().as_secs(),
    }
}

/// GET /health: always 200 so infrastructure probes do not restart the
/// process just because the database is down; the body carries the
/// reachability report instead.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database_ok = match state.store.ping() {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "liveness probe: database unreachable");
            false
        }
    };
    Json(health_check(database_ok, state.started_at))
}

/// GET /: the human-facing banner.
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "TaskMaster API",
        "status": "running",
        "timestamp": now_rfc3339(),
    }))
}

/// GET /ping: bare probe, no dependency checks.
pub async fn ping() -> Json<Value> {
    Json(json!({ "status": "ok", "timestamp": now_rfc3339() }))
}

/// Fallback for unrecognized routes.
pub async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".into())
}
