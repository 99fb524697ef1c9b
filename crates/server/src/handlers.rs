//! # Route Handlers

use crate::{errors::AppError, state::AppState};
use axum::{
    extract::{Query, State},
    Json,
};
use formscout::{ExtractionRequest, PlatformKind, SurveyInfo};
use serde::{Deserialize, Serialize};
use tracing::info;

// --- API Payloads ---

#[derive(Deserialize)]
pub struct DetectParams {
    pub url: String,
}

#[derive(Serialize, Deserialize)]
pub struct DetectResponse {
    pub platform: PlatformKind,
    pub name: String,
    pub supported: bool,
    pub strategy: String,
}

#[derive(Serialize, Deserialize)]
pub struct PlatformSummary {
    pub platform: PlatformKind,
    pub name: String,
    pub strategy: String,
}

// --- Handlers ---

/// The handler for the root (`/`) endpoint.
pub async fn root() -> &'static str {
    "formscout server is running."
}

/// The handler for the health check (`/health`) endpoint.
pub async fn health_check() -> &'static str {
    "OK"
}

/// `POST /extract` with a JSON `{"url": ...}` body.
pub async fn extract_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<ExtractionRequest>,
) -> Result<Json<SurveyInfo>, AppError> {
    info!("Received extraction request for URL: {}", payload.url);
    let survey = app_state.scanner.extract(&payload).await?;
    Ok(Json(survey))
}

/// `GET /extract?url=...`, for clients that cannot send a body.
pub async fn extract_query_handler(
    State(app_state): State<AppState>,
    Query(payload): Query<ExtractionRequest>,
) -> Result<Json<SurveyInfo>, AppError> {
    info!("Received extraction query for URL: {}", payload.url);
    let survey = app_state.scanner.extract(&payload).await?;
    Ok(Json(survey))
}

/// `GET /detect?url=...` classifies a URL without fetching it.
pub async fn detect_handler(
    State(app_state): State<AppState>,
    Query(params): Query<DetectParams>,
) -> Json<DetectResponse> {
    let platform = app_state.scanner.detect(&params.url);
    let extractor = app_state.scanner.registry().get(platform);
    Json(DetectResponse {
        platform,
        name: platform.display_name().to_string(),
        supported: platform.is_supported(),
        strategy: extractor.describe().to_string(),
    })
}

/// `GET /platforms` lists the platforms with a dedicated strategy.
pub async fn platforms_handler(State(app_state): State<AppState>) -> Json<Vec<PlatformSummary>> {
    let registry = app_state.scanner.registry();
    let platforms = registry
        .platforms()
        .into_iter()
        .map(|platform| PlatformSummary {
            platform,
            name: platform.display_name().to_string(),
            strategy: registry.get(platform).describe().to_string(),
        })
        .collect();
    Json(platforms)
}
