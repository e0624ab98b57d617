mod config;
mod errors;
mod jobs;
mod matching;
mod resume;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::jobs::aggregator::{spawn_sync_scheduler, JobAggregator};
use crate::jobs::sources::{build_source, NewSource};
use crate::matching::scoring::KeywordMatchScorer;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobMatch API v{}", env!("CARGO_PKG_VERSION"));

    // Register configured job sources
    let fetch_timeout = Duration::from_secs(config.fetch_timeout_secs);
    let mut aggregator = JobAggregator::new();
    for source in &config.sources {
        let fetcher = build_source(source, fetch_timeout, config.max_feed_bytes)
            .with_context(|| format!("cannot build job source '{}'", source.name))?;
        aggregator.register(NewSource::new(
            source.name.clone(),
            fetcher,
            source.refresh_interval_hours,
        ))?;
    }
    info!("{} job source(s) registered", aggregator.sources().len());

    // Initial full sync; failing sources are retried by the scheduler
    let report = aggregator.sync().await;
    info!(
        "Initial sync: {} jobs in catalog, {} source(s) failed",
        report.catalog_size,
        report.failed_sources.len()
    );

    let state = AppState::new(config.clone(), aggregator, Arc::new(KeywordMatchScorer));

    let scheduler = spawn_sync_scheduler(
        Arc::clone(&state.aggregator),
        Duration::from_secs(config.sync_tick_secs),
    );
    info!("Sync scheduler ticking every {}s", config.sync_tick_secs);

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()), // TODO: restrict CORS origins once the web client has a fixed host
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    scheduler.abort();
    Ok(())
}
