//! Router construction and server lifecycle.

use std::any::Any;
use std::time::Instant;

use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use taskmaster_store::TaskStore;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::handlers;

/// Shared state for Axum handlers. The store is constructed by the
/// bootstrap and injected here, so tests can substitute an in-memory one.
#[derive(Clone)]
pub struct AppState {
    pub store: TaskStore,
    pub started_at: Instant,
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(store: TaskStore) -> Router {
    let state = AppState {
        store,
        started_at: Instant::now(),
    };

    Router::new()
        .route("/", get(handlers::root))
        .route("/ping", get(handlers::ping))
        .route("/health", get(handlers::health))
        .route(
            "/tasks",
            get(handlers::list_active).post(handlers::create_task),
        )
        .route("/tasks/completed", get(handlers::list_completed))
        .route("/tasks/{id}/complete", patch(handlers::complete_task))
        .fallback(handlers::route_not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Turn a caught handler panic into the generic JSON 500. The panic
/// payload is logged, never echoed.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| err.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    tracing::error!(panic = %detail, "request handler panicked");
    ApiError::Internal.into_response()
}

/// Bind the listener and start serving. Returns a handle with the bound
/// port. Bind failure is the one startup error that should be fatal to
/// the caller.
pub async fn start(config: ServerConfig, store: TaskStore) -> Result<ServerHandle, std::io::Error> {
    let router = build_router(store);
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(port = local_addr.port(), "taskmaster server started");

    let server = tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    Ok(ServerHandle {
        port: local_addr.port(),
        server,
    })
}

/// Handle returned by [`start`].
pub struct ServerHandle {
    pub port: u16,
    server: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Stop accepting connections by aborting the serve task.
    pub fn shutdown(&self) {
        self.server.abort();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_router() -> Router {
        build_router(TaskStore::in_memory().unwrap())
    }

    fn get_req(path: &str) -> Request<Body> {
        Request::builder().uri(path).body(Body::empty()).unwrap()
    }

    fn patch_req(path: &str) -> Request<Body> {
        Request::builder()
            .method(Method::PATCH)
            .uri(path)
            .body(Body::empty())
            .unwrap()
    }

    fn post_json(path: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn create(app: &Router, title: &str) -> Value {
        let (status, body) = send(app, post_json("/tasks", &json!({ "title": title }))).await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    // ───── create ─────

    #[tokio::test]
    async fn create_returns_201_with_persisted_row() {
        let app = test_router();
        let (status, body) = send(
            &app,
            post_json("/tasks", &json!({ "title": "Buy milk", "description": "2 liters" })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert!(body["id"].as_i64().unwrap() > 0);
        assert_eq!(body["title"], "Buy milk");
        assert_eq!(body["description"], "2 liters");
        assert_eq!(body["completed"], false);
        assert!(body["created_at"].is_string());
    }

    #[tokio::test]
    async fn create_without_description_returns_null() {
        let app = test_router();
        let (status, body) = send(&app, post_json("/tasks", &json!({ "title": "Buy milk" }))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["description"].is_null());
    }

    #[tokio::test]
    async fn create_trims_title_and_description() {
        let app = test_router();
        let (_, body) = send(
            &app,
            post_json("/tasks", &json!({ "title": "  Buy milk  ", "description": "   " })),
        )
        .await;
        assert_eq!(body["title"], "Buy milk");
        assert!(body["description"].is_null());
    }

    #[tokio::test]
    async fn create_missing_title_is_400() {
        let app = test_router();
        let (status, body) = send(&app, post_json("/tasks", &json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Title is required");
    }

    #[tokio::test]
    async fn create_whitespace_title_is_400_and_persists_nothing() {
        let app = test_router();
        let (status, body) = send(&app, post_json("/tasks", &json!({ "title": "   " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Title is required");

        let (_, active) = send(&app, get_req("/tasks")).await;
        assert_eq!(active.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn create_title_at_255_succeeds_over_255_fails() {
        let app = test_router();

        let ok = "a".repeat(255);
        let (status, _) = send(&app, post_json("/tasks", &json!({ "title": ok }))).await;
        assert_eq!(status, StatusCode::CREATED);

        let too_long = "a".repeat(256);
        let (status, body) = send(&app, post_json("/tasks", &json!({ "title": too_long }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Title must be 255 characters or less");
    }

    #[tokio::test]
    async fn create_non_string_title_is_400() {
        let app = test_router();
        let (status, body) = send(&app, post_json("/tasks", &json!({ "title": 123 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request body");
    }

    #[tokio::test]
    async fn create_malformed_json_is_400() {
        let app = test_router();
        let req = Request::builder()
            .method(Method::POST)
            .uri("/tasks")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request body");
    }

    #[tokio::test]
    async fn create_ignores_unknown_fields() {
        let app = test_router();
        let (status, _) = send(
            &app,
            post_json("/tasks", &json!({ "title": "t", "completed": true, "id": 7 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    // ───── lists ─────

    #[tokio::test]
    async fn empty_lists_return_empty_arrays() {
        let app = test_router();
        let (status, active) = send(&app, get_req("/tasks")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(active, json!([]));

        let (status, completed) = send(&app, get_req("/tasks/completed")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(completed, json!([]));
    }

    #[tokio::test]
    async fn active_list_caps_at_five_newest_first() {
        let app = test_router();
        let mut ids = Vec::new();
        for i in 1..=6 {
            ids.push(create(&app, &format!("task {i}")).await["id"].as_i64().unwrap());
        }

        let (_, active) = send(&app, get_req("/tasks")).await;
        let got: Vec<i64> = active
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["id"].as_i64().unwrap())
            .collect();

        let expected: Vec<i64> = ids.iter().rev().take(5).copied().collect();
        assert_eq!(got, expected);
        assert!(!got.contains(&ids[0]));
    }

    #[tokio::test]
    async fn completed_list_caps_at_ten() {
        let app = test_router();
        for i in 1..=12 {
            let id = create(&app, &format!("task {i}")).await["id"].as_i64().unwrap();
            let (status, _) = send(&app, patch_req(&format!("/tasks/{id}/complete"))).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, completed) = send(&app, get_req("/tasks/completed")).await;
        let items = completed.as_array().unwrap();
        assert_eq!(items.len(), 10);
        assert!(items.iter().all(|t| t["completed"] == true));
    }

    #[tokio::test]
    async fn lists_are_ordered_by_creation_descending() {
        let app = test_router();
        for i in 1..=4 {
            let _ = create(&app, &format!("task {i}")).await;
        }
        let (_, active) = send(&app, get_req("/tasks")).await;
        let stamps: Vec<String> = active
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["created_at"].as_str().unwrap().to_string())
            .collect();
        for pair in stamps.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
    }

    // ───── complete ─────

    #[tokio::test]
    async fn completing_a_task_moves_it_between_lists() {
        let app = test_router();
        let created = create(&app, "Buy milk").await;
        assert!(created["description"].is_null());
        assert_eq!(created["completed"], false);
        let id = created["id"].as_i64().unwrap();

        let (status, updated) = send(&app, patch_req(&format!("/tasks/{id}/complete"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["completed"], true);
        assert_eq!(updated["id"], id);

        let (_, active) = send(&app, get_req("/tasks")).await;
        assert!(active
            .as_array()
            .unwrap()
            .iter()
            .all(|t| t["id"].as_i64() != Some(id)));

        let (_, completed) = send(&app, get_req("/tasks/completed")).await;
        assert!(completed
            .as_array()
            .unwrap()
            .iter()
            .any(|t| t["id"].as_i64() == Some(id)));
    }

    #[tokio::test]
    async fn complete_twice_returns_404_second_time() {
        let app = test_router();
        let id = create(&app, "once").await["id"].as_i64().unwrap();

        let (status, _) = send(&app, patch_req(&format!("/tasks/{id}/complete"))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, patch_req(&format!("/tasks/{id}/complete"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Task not found or already completed");
    }

    #[tokio::test]
    async fn complete_nonexistent_id_is_404() {
        let app = test_router();
        let (status, body) = send(&app, patch_req("/tasks/999999/complete")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Task not found or already completed");
    }

    #[tokio::test]
    async fn complete_unparsable_id_is_400() {
        let app = test_router();
        for bad in ["abc", "12abc", "1.5"] {
            let (status, body) = send(&app, patch_req(&format!("/tasks/{bad}/complete"))).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "id {bad:?}");
            assert_eq!(body["error"], "Invalid task ID");
        }
    }

    // ───── liveness & misc routes ─────

    #[tokio::test]
    async fn health_reports_connected() {
        let app = test_router();
        let (status, body) = send(&app, get_req("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "connected");
        assert!(body.get("warning").is_none());
        assert!(body["uptime"].is_number());
    }

    #[tokio::test]
    async fn health_stays_200_when_database_unreachable() {
        let store = TaskStore::open(
            "/nonexistent-dir/definitely/missing.db",
            &taskmaster_store::ConnectionConfig::default(),
        );
        let app = build_router(store);

        let (status, body) = send(&app, get_req("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["database"], "disconnected");
        assert_eq!(body["warning"], "Database connection failed but service is running");
    }

    #[tokio::test]
    async fn storage_failure_surfaces_as_generic_500() {
        // Reachable file, but the schema was never created, so every
        // statement fails at the driver.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-schema.db");
        let store = TaskStore::open(
            path.to_str().unwrap(),
            &taskmaster_store::ConnectionConfig::default(),
        );
        let app = build_router(store);

        let (status, body) = send(&app, post_json("/tasks", &json!({ "title": "x" }))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");

        let (status, body) = send(&app, get_req("/tasks")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn root_banner_and_ping() {
        let app = test_router();
        let (status, body) = send(&app, get_req("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "TaskMaster API");
        assert_eq!(body["status"], "running");

        let (status, body) = send(&app, get_req("/ping")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn unknown_route_returns_json_404() {
        let app = test_router();
        let (status, body) = send(&app, get_req("/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Route not found");
    }

    // ───── panic containment ─────

    async fn boom() -> axum::Json<Value> {
        panic!("boom");
    }

    #[tokio::test]
    async fn handler_panic_collapses_to_generic_500() {
        let app = Router::new()
            .route("/boom", get(boom))
            .layer(CatchPanicLayer::custom(panic_response));

        let (status, body) = send(&app, get_req("/boom")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    // ───── live server ─────

    #[tokio::test]
    async fn live_server_full_flow() {
        let config = ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            db_path: None,
        };
        let handle = start(config, TaskStore::in_memory().unwrap())
            .await
            .unwrap();
        assert!(handle.port > 0);
        let base = format!("http://127.0.0.1:{}", handle.port);
        let client = reqwest::Client::new();

        let created: Value = client
            .post(format!("{base}/tasks"))
            .json(&json!({ "title": "Buy milk" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let id = created["id"].as_i64().unwrap();

        let resp = client
            .patch(format!("{base}/tasks/{id}/complete"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let completed: Value = reqwest::get(format!("{base}/tasks/completed"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(completed
            .as_array()
            .unwrap()
            .iter()
            .any(|t| t["id"].as_i64() == Some(id)));

        let health: Value = reqwest::get(format!("{base}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health["database"], "connected");

        handle.shutdown();
    }
}
