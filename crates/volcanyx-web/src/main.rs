//! Volcanyx Web Server
//!
//! Run with: cargo run -p volcanyx-web

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use volcanyx_annotate::AnnotationFetcher;
use volcanyx_common::AppConfig;
use volcanyx_store::DataStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; RUST_LOG overrides the default level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Volcanyx Web Server...");

    let config = AppConfig::load().context("failed to load configuration")?;

    // Tables are read once; a missing or unreadable file is fatal
    let store = DataStore::load(&config.data).with_context(|| {
        format!(
            "failed to load {} / {}",
            config.data.diff_table.display(),
            config.data.expression_table.display()
        )
    })?;
    let report = store.report();
    info!(
        rows = report.rows_loaded,
        skipped = report.rows_skipped,
        expression_rows = report.expression_rows,
        old_donors = report.old_donors,
        young_donors = report.young_donors,
        "Tables loaded"
    );

    let fetcher = AnnotationFetcher::from_config(&config.annotation)
        .context("failed to build annotation client")?;

    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid server.bind address {}", config.server.bind))?;

    let state = volcanyx_web::state::AppState::new(config, Arc::new(store), fetcher);
    let app = volcanyx_web::router::build_router(state);

    info!("Server listening on http://{}", addr);
    info!("Open your browser and navigate to http://{}/volcano/", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
