// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use anyhow::Context;
use axum::{routing::{get, post}, Router};
use tower_http::trace::TraceLayer;

use crate::application::dashboard_controller::DashboardController;
use crate::application::environment_api::EnvironmentApi;
use crate::application::section_pages::SectionPages;
use crate::infrastructure::api_client::ApiClient;
use crate::infrastructure::config::{load_pulse_config, DataSource};
use crate::infrastructure::static_source::StaticEnvironmentApi;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    get_dashboard, get_page, health_check, refresh_page, retry_dashboard,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = load_pulse_config().context("failed to load configuration")?;
    tracing::info!(
        base_url = %config.api.base_url,
        source = ?config.dashboard.source,
        "Using environment backend"
    );

    // Create backend client (infrastructure layer)
    let api: Arc<dyn EnvironmentApi> = match config.dashboard.source {
        DataSource::Live => Arc::new(
            ApiClient::new(config.api.base_url.clone(), config.api.timeout())?
                .with_dashboard_paths(
                    config.api.weather_path.clone(),
                    config.api.air_quality_path.clone(),
                ),
        ),
        DataSource::Static => Arc::new(StaticEnvironmentApi::default()),
    };

    let health = api.health_check().await;
    match health.data {
        Some(status) => tracing::info!(status = %status.status, "Backend reachable"),
        None => tracing::warn!(
            status = health.status,
            "Backend health check failed: {}",
            health.error.unwrap_or_default()
        ),
    }

    // Mount controller and section hooks (application layer)
    let state = Arc::new(AppState {
        dashboard: DashboardController::new(Arc::clone(&api))
            .mount(config.dashboard.refresh_interval()),
        pages: SectionPages::mount(api, &config.polling),
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/dashboard/retry", post(retry_dashboard))
        .route("/pages/:section", get(get_page))
        .route("/pages/:section/refresh", post(refresh_page))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::clone(&state));

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {}", config.server.bind))?;
    tracing::info!("Starting mumbai-pulse on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.unmount();
    tracing::info!("Dashboard and section pages unmounted");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
