//! HTTP API for word-meaning queries.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Liveness message |
//! | `GET`  | `/health` | Health check (returns version) |
//! | `POST` | `/analyze/` | Resolve a word for a relation (also served at `/analyze`) |
//!
//! # Request
//!
//! ```json
//! { "word": "سعيد", "type": "synonyms" }
//! ```
//!
//! `type` must be one of `synonyms`, `antonyms`, `plural`. Bodies that do not
//! match this shape are rejected with `422` before any resolution work:
//!
//! ```json
//! { "error": { "code": "invalid_request", "message": "..." } }
//! ```
//!
//! # Response
//!
//! Always `200` with `{"source": ..., "result": ...}` once the body is valid.
//! Multi-word input, lexicon misses and provider failures are all reported
//! inside that body.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::models::{RelationType, ResolutionResult};
use crate::resolve::Resolver;

/// Text returned by `GET /`.
pub const RUNNING_MESSAGE: &str = "Word meaning API is running.";

#[derive(Clone)]
struct AppState {
    resolver: Arc<Resolver>,
}

/// Loads the lexicon, creates the providers from config and serves until
/// the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let resolver = Resolver::from_config(config).await?;
    run_server_with(config, Arc::new(resolver)).await
}

/// Serves an already-built [`Resolver`] on `[server].bind`.
pub async fn run_server_with(config: &Config, resolver: Arc<Resolver>) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let app = router(resolver);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("word meaning API listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the application router around `resolver`.
pub fn router(resolver: Arc<Resolver>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/analyze/", post(handle_analyze))
        .route("/analyze", post(handle_analyze))
        .layer(cors)
        .with_state(AppState { resolver })
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

/// Maps a body extraction failure to `422 invalid_request`, or `415` when
/// the content type is wrong.
fn invalid_request(rejection: JsonRejection) -> AppError {
    let status = match &rejection {
        JsonRejection::MissingJsonContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    };
    AppError {
        status,
        code: "invalid_request".to_string(),
        message: rejection.body_text(),
    }
}

// ============ GET / and GET /health ============

#[derive(Serialize)]
struct StatusResponse {
    status: String,
}

async fn handle_root() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: RUNNING_MESSAGE.to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /analyze/ ============

/// Request body for `POST /analyze/`.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub word: String,
    #[serde(rename = "type")]
    pub relation: RelationType,
}

async fn handle_analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<ResolutionResult>, AppError> {
    let Json(request) = payload.map_err(invalid_request)?;
    let result = state.resolver.resolve(&request.word, request.relation).await;
    Ok(Json(result))
}
