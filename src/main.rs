//! Shorts Idea Harvester — Binary Entrypoint
//! Boots the Axum HTTP server and the background harvest scheduler.

use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use shorts_idea_harvester::api::{self, AppState};
use shorts_idea_harvester::config;
use shorts_idea_harvester::ingest::scheduler;
use shorts_idea_harvester::metrics::Metrics;
use shorts_idea_harvester::processor::IdeaProcessor;
use shorts_idea_harvester::store::{IdeaStore, MemoryStore};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("shorts_idea_harvester=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = config::load_default()?;
    tracing::info!(
        rate_limit = cfg.rate_limit_per_minute,
        max_results = cfg.max_results_per_fetch,
        "harvester config loaded"
    );

    let metrics = Metrics::init(cfg.rate_limit_per_minute);

    let store: Arc<dyn IdeaStore> = Arc::new(MemoryStore::new());
    let processor = Arc::new(IdeaProcessor::new(store.clone(), cfg.score_weights));
    let sources = Arc::new(scheduler::build_sources(&cfg));
    if sources.is_empty() {
        tracing::warn!("no harvest sources configured; only the HTTP surface is live");
    } else {
        scheduler::spawn_scheduler(&cfg, sources.clone(), processor.clone());
    }

    let state = AppState {
        store,
        processor,
        sources,
    };
    let router = api::create_router(state).merge(metrics.router());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "listening");
    axum::serve(listener, router).await?;

    Ok(())
}
