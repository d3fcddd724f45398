use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use tower_http::cors::CorsLayer;

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::ingest::providers::parse_snapshot;

#[derive(Clone)]
pub struct AppState {
    engine: Engine,
}

/// `/health`, `/config` and `POST /evaluate` over one engine instance.
pub fn create_router(engine: Engine) -> Router {
    let state = AppState { engine };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/config", get(config))
        .route("/evaluate", post(evaluate))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct EvaluateQuery {
    /// RFC 3339; defaults to the time of the request.
    evaluation_time: Option<DateTime<Utc>>,
}

async fn config(State(state): State<AppState>) -> Json<EngineConfig> {
    Json(state.engine.config().clone())
}

async fn evaluate(
    State(state): State<AppState>,
    Query(q): Query<EvaluateQuery>,
    body: Bytes,
) -> Response {
    let records = match parse_snapshot(&body) {
        Ok(r) => r,
        Err(e) => return (StatusCode::BAD_REQUEST, format!("{e:#}")).into_response(),
    };
    let now = q.evaluation_time.unwrap_or_else(Utc::now);
    let snapshot = Arc::new(state.engine.ingest(records));
    let report = state.engine.evaluate_concurrent(snapshot, now).await;
    Json(report).into_response()
}
