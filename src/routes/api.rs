// Handlers for backend API endpoints. Thin adapters: every user intent
// becomes one session transition, and the post-transition snapshot goes
// back to the frontend.

use axum::{
    extract::{Json as JsonExtract, State},
    response::{IntoResponse, Json},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    models::{LocationCandidate, SessionSnapshot, StylePreference},
    session::SearchOutcome,
};

// Import AppState struct from the crate root
use crate::AppState;

// --- Request Structs ---

#[derive(Deserialize)]
pub struct SearchRequest {
    query: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRequest {
    name: String,
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpsRequest {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
pub struct DayRequest {
    date: NaiveDate,
}

#[derive(Deserialize)]
pub struct StyleRequest {
    style: StylePreference,
}

#[derive(Deserialize)]
pub struct OutfitRequest {
    #[serde(default)]
    refresh: bool,
}

// --- Response Wrappers ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    // Non-empty when the frontend should show a selection list; empty when
    // the direct load already ran and the snapshot reflects it.
    candidates: Vec<LocationCandidate>,
    snapshot: SessionSnapshot,
}

// --- API Handlers ---

pub async fn get_session(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(app_state.session.snapshot().await)
}

pub async fn search(
    State(app_state): State<AppState>,
    JsonExtract(request): JsonExtract<SearchRequest>,
) -> Result<impl IntoResponse, AppError> {
    let query = request.query.trim().to_string();
    tracing::info!(query = %query, "API call: search");

    if query.is_empty() {
        return Ok(Json(SearchResponse {
            candidates: Vec::new(),
            snapshot: app_state.session.snapshot().await,
        }));
    }

    let candidates = match app_state.session.search(&query).await {
        SearchOutcome::Candidates(candidates) => candidates,
        SearchOutcome::Loaded => Vec::new(),
    };

    Ok(Json(SearchResponse {
        candidates,
        snapshot: app_state.session.snapshot().await,
    }))
}

pub async fn select_location(
    State(app_state): State<AppState>,
    JsonExtract(request): JsonExtract<CandidateRequest>,
) -> impl IntoResponse {
    tracing::info!(name = %request.name, "API call: select_location");
    app_state
        .session
        .select_candidate(&request.name, request.latitude, request.longitude)
        .await;
    Json(app_state.session.snapshot().await)
}

pub async fn gps(
    State(app_state): State<AppState>,
    JsonExtract(request): JsonExtract<GpsRequest>,
) -> impl IntoResponse {
    tracing::info!("API call: gps");
    app_state.session.gps(request.latitude, request.longitude).await;
    Json(app_state.session.snapshot().await)
}

pub async fn gps_denied(State(app_state): State<AppState>) -> impl IntoResponse {
    tracing::info!("API call: gps_denied");
    app_state.session.gps_denied().await;
    Json(app_state.session.snapshot().await)
}

pub async fn select_day(
    State(app_state): State<AppState>,
    JsonExtract(request): JsonExtract<DayRequest>,
) -> impl IntoResponse {
    app_state.session.select_day(request.date).await;
    Json(app_state.session.snapshot().await)
}

pub async fn set_style(
    State(app_state): State<AppState>,
    JsonExtract(request): JsonExtract<StyleRequest>,
) -> impl IntoResponse {
    app_state.session.set_style(request.style).await;
    Json(app_state.session.snapshot().await)
}

pub async fn generate_outfit(
    State(app_state): State<AppState>,
    JsonExtract(request): JsonExtract<OutfitRequest>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(refresh = request.refresh, "API call: generate_outfit");
    // Generation failures propagate as an HTTP error; the frontend shows
    // them as a blocking alert.
    app_state.session.generate_outfit(request.refresh).await?;
    Ok(Json(app_state.session.snapshot().await))
}
