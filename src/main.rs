//! Flashstat
//!
//! Crawls football results from flashscore.com into per-season CSV datasets,
//! completing stored datasets incrementally, and serves them over a REST API.

mod cli;
mod config;
mod crawler;
mod dataset;
mod routes;
mod scraper;
mod storage;
mod types;

use axum::{routing::get, Router};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::routes::AppState;
use crate::storage::DatasetRepository;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flashstat=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Serve { host, port } => run_server(host, port).await,
        Commands::Crawl {
            country,
            tournament,
            season,
            time,
        } => cli::run_crawl(country, tournament, season, time).await,
        Commands::Fixtures {
            country,
            tournament,
            season,
        } => cli::run_fixtures_crawl(country, tournament, season).await,
        Commands::Datasets => cli::run_datasets(),
    }
}

/// Run the API server.
async fn run_server(host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    // Load configuration
    let mut config = AppConfig::load()?;

    // Override with CLI args
    if let Some(h) = host {
        config.server.host = h;
    }
    if let Some(p) = port {
        config.server.port = p;
    }

    tracing::info!("Configuration loaded");
    tracing::info!("Database path: {}", config.storage.database_path.display());

    let store = DatasetRepository::new(&config.storage.database_path)?;

    // Create application state
    let state = Arc::new(AppState {
        config: config.clone(),
        store: Arc::new(store),
    });

    // Build router
    let app = Router::new()
        .route("/health", get(routes::health))
        .route(
            "/extract/{country}/{tournament}/{season}/{time}",
            get(routes::extract),
        )
        .route(
            "/fixtures/{country}/{tournament}/{season}",
            get(routes::fixtures),
        )
        .route("/datasets", get(routes::list_datasets))
        .route("/datasets/{id}", get(routes::dataset_rows))
        .route("/datasets/{id}/download", get(routes::download_dataset))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    // Start server
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
