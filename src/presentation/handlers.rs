// HTTP request handlers
use crate::application::section_pages::Section;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Dashboard view, raw state and the resolved metric cards
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<Value> {
    let dashboard = state.dashboard.state();
    Json(json!({
        "view": dashboard.view(),
        "metrics": dashboard.metrics(),
        "state": dashboard,
    }))
}

pub async fn retry_dashboard(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.dashboard.retry() {
        StatusCode::ACCEPTED
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

fn parse_section(slug: &str) -> Result<Section, StatusCode> {
    slug.parse().map_err(|e| {
        tracing::debug!("{}", e);
        StatusCode::NOT_FOUND
    })
}

pub async fn get_page(
    Path(slug): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, StatusCode> {
    let section = parse_section(&slug)?;
    state.pages.snapshot(section).map(Json).map_err(|e| {
        tracing::error!(section = section.slug(), "Failed to serialize page state: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

pub async fn refresh_page(
    Path(slug): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, StatusCode> {
    let section = parse_section(&slug)?;
    state.pages.refresh(section);
    Ok(StatusCode::ACCEPTED)
}
