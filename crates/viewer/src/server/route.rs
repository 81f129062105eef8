//! REST handlers over one loaded capture.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::query::{self, QueryError};
use crate::state::SharedSnapshot;

use super::map::{
    log_body, stats_response, tree_response, LogsResponse, SearchResponse, StatsResponse,
    TreeResponse,
};

type ApiRejection = (StatusCode, Json<serde_json::Value>);

pub fn build_router(state: SharedSnapshot) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/api/tree", get(tree_handler))
        .route("/api/logs", get(logs_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/search", get(search_handler))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

fn reject(err: QueryError) -> ApiRejection {
    let status = match err {
        QueryError::MissingSpanId | QueryError::EmptyQuery => StatusCode::BAD_REQUEST,
        QueryError::SpanNotFound(_) => StatusCode::NOT_FOUND,
    };
    (status, Json(json!({ "error": err.to_string() })))
}

/// GET / — service info.
async fn root_handler() -> Json<serde_json::Value> {
    Json(json!({
        "name": "logdrill-viewer",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "tree": "/api/tree",
            "logs": "/api/logs?span={id}",
            "stats": "/api/stats",
            "search": "/api/search?q={substring}"
        }
    }))
}

/// GET /api/tree — the full reconstructed hierarchy.
async fn tree_handler(State(state): State<SharedSnapshot>) -> Json<TreeResponse> {
    Json(tree_response(&state.tree))
}

#[derive(Debug, Deserialize)]
struct LogsParams {
    span: Option<String>,
}

/// GET /api/logs?span={id} — all entries of one span.
async fn logs_handler(
    State(state): State<SharedSnapshot>,
    Query(params): Query<LogsParams>,
) -> Result<Json<LogsResponse>, ApiRejection> {
    let span_id = params.span.unwrap_or_default();
    let entries = query::span_entries(&state.tree, &span_id).map_err(reject)?;

    Ok(Json(LogsResponse {
        logs: entries.iter().map(log_body).collect(),
    }))
}

/// GET /api/stats — aggregate counters.
async fn stats_handler(State(state): State<SharedSnapshot>) -> Json<StatsResponse> {
    Json(stats_response(state.tree.stats()))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
}

/// GET /api/search?q={substring} — case-insensitive search across all
/// entries, span-less ones included.
async fn search_handler(
    State(state): State<SharedSnapshot>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiRejection> {
    let q = params.q.unwrap_or_default();
    let matches = query::search_entries(&state.entries, &q).map_err(reject)?;

    Ok(Json(SearchResponse {
        total: matches.len(),
        matches: matches.into_iter().map(log_body).collect(),
    }))
}
