//! HTTP API gateway for Reagent.
//!
//! Exposes the turn-taking capability plus thread management:
//!
//! - `POST /chat` — run one reasoning turn
//! - `GET /health` — liveness, store health, configured providers
//! - `GET /threads` — list conversation threads
//! - `GET /threads/{id}/messages` — fetch one thread
//! - `DELETE /threads/{id}` — delete one thread
//!
//! Built on Axum. Persistence is best-effort: a store failure is logged and
//! the caller still gets the response.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use reagent_agent::{AgentLoop, ReasoningStep, ToolInvocation, TurnSettings};
use reagent_config::AppConfig;
use reagent_core::message::{ChatMessage, new_thread_id};
use reagent_core::store::{MessageStore, ThreadSummary};
use reagent_providers::ModelGateway;
use reagent_store::{InMemoryDocumentIndex, InMemoryMessageStore, SqliteMessageStore};

/// Shared application state.
pub struct AppState {
    pub agent: AgentLoop,
    pub store: Arc<dyn MessageStore>,
    pub gateway: Arc<ModelGateway>,
}

type SharedState = Arc<AppState>;

/// Build the Axum router with all routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .route("/threads", get(list_threads_handler))
        .route("/threads/{thread_id}/messages", get(get_messages_handler))
        .route("/threads/{thread_id}", delete(delete_thread_handler))
        .layer(CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server: wires the store, tools, providers, and agent
/// loop from configuration, then serves until shutdown.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store: Arc<dyn MessageStore> = match config.store.backend.as_str() {
        "memory" => Arc::new(InMemoryMessageStore::new()),
        _ => Arc::new(SqliteMessageStore::new(&config.store.db_path).await?),
    };

    let index = Arc::new(InMemoryDocumentIndex::new());
    let tools = Arc::new(reagent_tools::default_registry(index));
    let gateway = Arc::new(ModelGateway::from_config(&config)?);
    let agent = AgentLoop::new(gateway.clone(), tools)
        .with_max_iterations(config.agent.max_iterations);

    let state = Arc::new(AppState {
        agent,
        store,
        gateway,
    });

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "Reagent gateway listening");

    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

// ── Request / response types ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub react_settings: Option<ReactSettings>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReactSettings {
    #[serde(default)]
    pub max_iterations: Option<u32>,
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub thread_id: String,
    pub messages: Vec<ChatMessage>,
    pub reasoning_steps: Vec<ReasoningStep>,
    pub tool_results: Vec<ToolInvocation>,
    pub current_step: u32,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub store: &'static str,
    pub providers: Vec<String>,
}

#[derive(Serialize)]
pub struct ThreadListResponse {
    pub threads: Vec<ThreadSummary>,
}

#[derive(Serialize)]
pub struct ThreadMessagesResponse {
    pub thread_id: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn root_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "reagent",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    let store_ok = state.store.health().await;
    Json(HealthResponse {
        status: "ok",
        store: if store_ok { "ok" } else { "degraded" },
        providers: state
            .gateway
            .configured()
            .iter()
            .map(|k| k.to_string())
            .collect(),
    })
}

async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    if payload.message.trim().is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "message must not be empty",
        ));
    }

    let thread_id = payload.thread_id.unwrap_or_else(new_thread_id);

    let history = match state.store.get(&thread_id).await {
        Ok(messages) => messages,
        Err(e) => {
            warn!(%thread_id, error = %e, "Failed to load history, starting empty");
            vec![]
        }
    };

    let settings = payload
        .react_settings
        .map(|s| TurnSettings {
            max_iterations: s.max_iterations,
            provider: s.provider.as_deref().and_then(|name| match name.parse() {
                Ok(kind) => Some(kind),
                Err(_) => {
                    warn!(provider = name, "Ignoring unknown provider override");
                    None
                }
            }),
        })
        .unwrap_or_default();

    let outcome = state
        .agent
        .run_turn(history, &payload.message, &thread_id, &settings)
        .await;

    // Best-effort persistence: the caller still gets a response when the
    // store is down.
    if let Err(e) = state.store.put(&thread_id, &outcome.messages).await {
        error!(%thread_id, error = %e, "Failed to persist thread");
    }

    Ok(Json(ChatResponse {
        response: outcome.final_answer,
        thread_id,
        messages: outcome.messages,
        reasoning_steps: outcome.reasoning_steps,
        tool_results: outcome.tool_results,
        current_step: outcome.current_step,
    }))
}

async fn list_threads_handler(
    State(state): State<SharedState>,
) -> Result<Json<ThreadListResponse>, (StatusCode, Json<ErrorResponse>)> {
    let threads = state
        .store
        .list_threads()
        .await
        .map_err(|e| error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(ThreadListResponse { threads }))
}

async fn get_messages_handler(
    State(state): State<SharedState>,
    Path(thread_id): Path<String>,
) -> Result<Json<ThreadMessagesResponse>, (StatusCode, Json<ErrorResponse>)> {
    let messages = state
        .store
        .get(&thread_id)
        .await
        .map_err(|e| error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(ThreadMessagesResponse {
        thread_id,
        messages,
    }))
}

async fn delete_thread_handler(
    State(state): State<SharedState>,
    Path(thread_id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    use reagent_core::error::StoreError;

    match state.store.delete(&thread_id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(StoreError::ThreadNotFound(_)) => Err(error_response(
            StatusCode::NOT_FOUND,
            format!("thread '{thread_id}' not found"),
        )),
        Err(e) => Err(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            e.to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use reagent_core::tool::ToolRegistry;
    use tower::ServiceExt;

    /// Router over an unconfigured gateway and an in-memory store: every
    /// chat resolves to the fixed degraded text, deterministically.
    fn test_router() -> Router {
        let gateway = Arc::new(ModelGateway::new(vec![]));
        let agent = AgentLoop::new(gateway.clone(), Arc::new(ToolRegistry::new()));
        let state = Arc::new(AppState {
            agent,
            store: Arc::new(InMemoryMessageStore::new()),
            gateway,
        });
        build_router(state)
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_chat(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_store_and_providers() {
        let response = test_router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["store"], "ok");
        assert!(body["providers"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn chat_generates_thread_id_and_persists() {
        let router = test_router();
        let response = router
            .clone()
            .oneshot(post_chat(serde_json::json!({"message": "Hello"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let thread_id = body["thread_id"].as_str().unwrap().to_string();
        assert!(thread_id.starts_with("thread_"));
        assert_eq!(body["messages"].as_array().unwrap().len(), 2);
        assert_eq!(body["current_step"], 1);

        // The turn must be readable back out of the store.
        let response = router
            .oneshot(
                Request::get(format!("/threads/{thread_id}/messages"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["messages"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn chat_rejects_empty_message() {
        let response = test_router()
            .oneshot(post_chat(serde_json::json!({"message": "   "})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn chat_continues_an_existing_thread() {
        let router = test_router();
        let first = json_body(
            router
                .clone()
                .oneshot(post_chat(serde_json::json!({"message": "first"})))
                .await
                .unwrap(),
        )
        .await;
        let thread_id = first["thread_id"].as_str().unwrap();

        let second = json_body(
            router
                .oneshot(post_chat(
                    serde_json::json!({"message": "second", "thread_id": thread_id}),
                ))
                .await
                .unwrap(),
        )
        .await;

        // prior user+assistant, new user, new assistant
        assert_eq!(second["messages"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn react_settings_cap_is_honored() {
        let response = test_router()
            .oneshot(post_chat(serde_json::json!({
                "message": "hi",
                "react_settings": {"max_iterations": 1}
            })))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["current_step"], 1);
    }

    #[tokio::test]
    async fn delete_missing_thread_is_404() {
        let response = test_router()
            .oneshot(
                Request::delete("/threads/thread_missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn thread_lifecycle_list_and_delete() {
        let router = test_router();
        let body = json_body(
            router
                .clone()
                .oneshot(post_chat(serde_json::json!({"message": "hi"})))
                .await
                .unwrap(),
        )
        .await;
        let thread_id = body["thread_id"].as_str().unwrap().to_string();

        let listed = json_body(
            router
                .clone()
                .oneshot(Request::get("/threads").body(Body::empty()).unwrap())
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(listed["threads"].as_array().unwrap().len(), 1);

        let response = router
            .oneshot(
                Request::delete(format!("/threads/{thread_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
