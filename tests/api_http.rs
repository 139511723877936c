// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - POST /harvest/run (fixture-backed sources)
// - GET /ideas/recent
// - GET /ideas/top

use std::sync::Arc;

use axum::{
    body::{self, Body},
    Router,
};
use http::{Request, StatusCode};
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use shorts_idea_harvester::api::{self, AppState};
use shorts_idea_harvester::config::ScoreWeights;
use shorts_idea_harvester::ingest::plugins::{TrendingPlugin, VideoPlugin};
use shorts_idea_harvester::ingest::HarvestSource;
use shorts_idea_harvester::store::{IdeaStore, MemoryStore};
use shorts_idea_harvester::{FetchParams, IdeaProcessor};

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

fn test_router() -> Router {
    let store: Arc<dyn IdeaStore> = Arc::new(MemoryStore::new());
    let processor = Arc::new(IdeaProcessor::new(store.clone(), ScoreWeights::default()));
    let sources = Arc::new(vec![
        HarvestSource::new(
            Box::new(VideoPlugin::from_fixture(include_str!("fixtures/video.json"))),
            FetchParams::Video { ids: Vec::new() },
        ),
        HarvestSource::new(
            Box::new(TrendingPlugin::from_fixture(include_str!(
                "fixtures/trending.json"
            ))),
            FetchParams::Trending {
                region: "US".to_string(),
                category: None,
                max_results: 50,
            },
        ),
    ]);
    api::create_router(AppState {
        store,
        processor,
        sources,
    })
}

async fn body_json(resp: axum::response::Response) -> Json {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_router();

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK, "health should be 200");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let body = String::from_utf8(bytes).expect("utf8");
    assert_eq!(body.trim(), "OK", "health body should be 'OK'");
}

#[tokio::test]
async fn harvest_run_returns_summary_and_fills_the_store() {
    let app = test_router();

    let run = Request::builder()
        .method("POST")
        .uri("/harvest/run")
        .body(Body::empty())
        .expect("build POST /harvest/run");
    let resp = app.clone().oneshot(run).await.expect("oneshot run");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = body_json(resp).await;
    // 2 video fixtures + 3 trending fixtures
    assert_eq!(v["summary"]["created"], 5);
    assert_eq!(v["summary"]["updated"], 0);
    assert_eq!(v["summary"]["failed"].as_array().unwrap().len(), 0);
    assert_eq!(v["fetch_errors"].as_array().unwrap().len(), 0);

    let recent = Request::builder()
        .method("GET")
        .uri("/ideas/recent?since=0")
        .body(Body::empty())
        .expect("build GET /ideas/recent");
    let resp = app.clone().oneshot(recent).await.expect("oneshot recent");
    assert_eq!(resp.status(), StatusCode::OK);
    let ideas = body_json(resp).await;
    assert_eq!(ideas.as_array().unwrap().len(), 5);

    let top = Request::builder()
        .method("GET")
        .uri("/ideas/top?limit=2")
        .body(Body::empty())
        .expect("build GET /ideas/top");
    let resp = app.oneshot(top).await.expect("oneshot top");
    let ranked = body_json(resp).await;
    let arr = ranked.as_array().unwrap();
    assert_eq!(arr.len(), 2);
    let first = arr[0]["metrics"]["composite_score"].as_f64().unwrap();
    let second = arr[1]["metrics"]["composite_score"].as_f64().unwrap();
    assert!(first >= second, "top list must rank by composite score");
}

#[tokio::test]
async fn ideas_recent_is_empty_before_any_pass() {
    let app = test_router();

    let req = Request::builder()
        .method("GET")
        .uri("/ideas/recent")
        .body(Body::empty())
        .expect("build GET /ideas/recent");
    let resp = app.oneshot(req).await.expect("oneshot recent");
    assert_eq!(resp.status(), StatusCode::OK);
    let ideas = body_json(resp).await;
    assert_eq!(ideas.as_array().unwrap().len(), 0);
}
