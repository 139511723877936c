use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::ingest::{self, HarvestSource};
use crate::processor::{IdeaProcessor, ProcessingSummary};
use crate::store::{IdeaRecord, IdeaStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn IdeaStore>,
    pub processor: Arc<IdeaProcessor>,
    pub sources: Arc<Vec<HarvestSource>>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/ideas/recent", get(ideas_recent))
        .route("/ideas/top", get(ideas_top))
        .route("/harvest/run", post(harvest_run))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct RecentQuery {
    #[serde(default)]
    since: u64,
}

#[derive(serde::Deserialize)]
struct TopQuery {
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    20
}

#[derive(serde::Serialize)]
struct RunResponse {
    summary: ProcessingSummary,
    fetch_errors: Vec<String>,
}

async fn ideas_recent(
    State(state): State<AppState>,
    Query(q): Query<RecentQuery>,
) -> Result<Json<Vec<IdeaRecord>>, (StatusCode, String)> {
    state
        .store
        .query_recent(q.since)
        .await
        .map(Json)
        .map_err(internal)
}

async fn ideas_top(
    State(state): State<AppState>,
    Query(q): Query<TopQuery>,
) -> Result<Json<Vec<IdeaRecord>>, (StatusCode, String)> {
    state
        .store
        .top_by_score(q.limit)
        .await
        .map(Json)
        .map_err(internal)
}

/// Trigger one harvest pass and return its summary. Idempotent with
/// respect to the stored records thanks to the dedup key.
async fn harvest_run(State(state): State<AppState>) -> Json<RunResponse> {
    let outcome = ingest::run_pass(&state.sources, &state.processor).await;
    Json(RunResponse {
        summary: outcome.summary,
        fetch_errors: outcome.fetch_errors.iter().map(|e| e.to_string()).collect(),
    })
}

fn internal(e: crate::store::StoreError) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
