//! Bookdesk Server - Library Circulation System
//!
//! REST API server for lending libraries.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookdesk_server::{
    api,
    clock::{Clock, SystemClock},
    config::AppConfig,
    repository::{seed, Repository},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("bookdesk_server={},tower_http=debug", config.logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Bookdesk Server v{}", env!("CARGO_PKG_VERSION"));

    // Build the store
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let data = if config.store.seed_demo_data {
        let data = seed::demo_data(clock.today(), clock.now()).context("Failed to seed demo data")?;
        tracing::info!(
            "Loaded demo data: {} books, {} copies, {} members, {} loans",
            data.books.len(),
            data.copies.len(),
            data.members.len(),
            data.loans.len()
        );
        data
    } else {
        let data = seed::bootstrap(&config.auth, clock.today()).context("Failed to create administrator")?;
        tracing::info!("Started with an empty catalog; administrator is {}", config.auth.bootstrap_admin_email);
        data
    };

    // Save server address before moving config
    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    // Create application state
    let state = AppState::new(config, Repository::new(data), clock);

    // Build router
    let app = api::router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
