//! HTTP entry point.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/ask` | Route a natural-language question and answer it |
//! | `GET`  | `/health` | Per-dependency health (`store`, `model`) |
//! | `GET`  | `/` | Service information |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "query must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `internal` (500).
//!
//! # Health
//!
//! See [`crate::health`]. `degraded` still answers 200; `unhealthy` answers
//! 503.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use community_guide_core::validate::validate_query;
use community_guide_core::{QueryRouter, RouteResult};

use crate::answer::{self, context_text};
use crate::config::Config;
use crate::health::{self, HealthStatus};
use crate::llm::{self, CompletionProvider};
use crate::service;

#[derive(Clone)]
pub struct AppState {
    router: Arc<QueryRouter>,
    model: Arc<dyn CompletionProvider>,
}

impl AppState {
    pub fn new(router: QueryRouter, model: Arc<dyn CompletionProvider>) -> Self {
        Self {
            router: Arc::new(router),
            model,
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_root))
        .route("/ask", post(handle_ask))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP server on `[server].bind` and runs until the process is
/// terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let router = service::open_router(config).await?;
    let model: Arc<dyn CompletionProvider> = Arc::from(llm::create_provider(&config.model)?);
    tracing::info!(model = model.model_name(), "model provider ready");

    let app = build_app(AppState::new(router, model));

    let bind_addr = &config.server.bind;
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("server listening on http://{}", bind_addr);
    println!("Community guide listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

fn request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

// ============ POST /ask ============

#[derive(Deserialize)]
struct AskRequest {
    #[serde(default)]
    query: Option<String>,
    /// Free-form caller context. Strings pass through; objects are sent to
    /// the model as JSON.
    #[serde(default)]
    context: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct AskResponse {
    query: String,
    response: String,
    results: BTreeMap<String, RouteResult>,
    suggestions: Vec<String>,
    error: Option<String>,
    model: String,
    request_id: String,
    timestamp: String,
}

async fn handle_ask(
    State(state): State<AppState>,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, AppError> {
    let Json(req) = body.map_err(|e| bad_request(e.body_text()))?;
    let raw = req
        .query
        .ok_or_else(|| bad_request("missing required 'query' field"))?;
    let query = validate_query(&raw).map_err(|e| bad_request(e.to_string()))?;

    let request_id = request_id();
    tracing::info!(%request_id, query, "processing query");

    let context = context_text(req.context.as_ref());
    let answer = answer::answer(&state.router, state.model.as_ref(), query, context.as_deref())
        .await
        .map_err(|e| internal(e.to_string()))?;

    if let Some(err) = &answer.error {
        tracing::warn!(%request_id, "query answered with errors: {}", err);
    } else {
        tracing::info!(%request_id, results = answer.results.len(), "query processed");
    }

    Ok(Json(AskResponse {
        query: answer.query,
        response: answer.response,
        results: answer.results,
        suggestions: answer.suggestions,
        error: answer.error,
        model: answer.model,
        request_id,
        timestamp: timestamp(),
    }))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: HealthStatus,
    version: String,
    components: BTreeMap<String, String>,
    timestamp: String,
    request_id: String,
}

async fn handle_health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store = state.router.data_access().store();
    let report = health::check_health(store.as_ref(), state.model.as_ref()).await;

    let code = if report.status == HealthStatus::Unhealthy {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (
        code,
        Json(HealthResponse {
            status: report.status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            components: report.components,
            timestamp: timestamp(),
            request_id: request_id(),
        }),
    )
}

// ============ GET / ============

async fn handle_root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "Richmond Community Guide",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Answers questions about Richmond, VA tech meetups, events, venues and companies",
        "endpoints": {
            "POST /ask": "Submit questions about the Richmond tech community",
            "GET /health": "Health check endpoint",
            "GET /": "This information page"
        },
        "example_request": {
            "url": "/ask",
            "method": "POST",
            "body": {
                "query": "What's the next tech meetup in Richmond?",
                "context": {}
            }
        }
    }))
}
