use std::sync::Arc;

use clap::Parser;
use metrics_ingestor::api::{self, AppState};
use metrics_ingestor::app::adapters::postgres;
use metrics_ingestor::app::services::format_registry::FormatRegistry;
use metrics_ingestor::app::services::ingest_pipeline::IngestPipeline;
use metrics_ingestor::config::AppConfig;
use tracing::info;

/// Ingestion service for semicolon-delimited time-series measurement files
#[derive(Parser, Debug)]
#[command(name = "metrics_ingestor", version, about)]
struct Args {
    /// Socket address to bind the HTTP server to (overrides BIND_ADDR)
    #[arg(long)]
    bind: Option<String>,

    /// PostgreSQL connection URL (overrides DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = AppConfig::from_env()?;
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }
    if let Some(url) = args.database_url {
        config.database.url = url;
    }
    config.validate()?;

    let pool = postgres::connect_pool(&config.database)?;
    postgres::init_schema(&pool, &config.database).await?;
    info!("database schema ready");

    let registry = FormatRegistry::with_default_formats(&config.processing);
    let pipeline = IngestPipeline::new(registry, pool.clone());
    let state = Arc::new(AppState { pipeline, pool });

    let app = api::router(state, config.processing.max_upload_bytes);
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    info!("listening on {}", config.server.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Resolves when CTRL+C arrives, letting in-flight uploads finish
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        eprintln!("failed to install CTRL+C signal handler: {}", e);
        return;
    }
    info!("received CTRL+C, shutting down gracefully");
}
