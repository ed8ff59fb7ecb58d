// Route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

// Declare submodules for different route groups
mod api;
mod static_pages;

// create_router accepts the AppState; the state is provided when the
// router is consumed in main.rs
pub fn create_router(app_state: AppState) -> Router {
    // API routes; handlers expect AppState via the State extractor.
    let api_router = Router::new()
        .route("/session", get(api::get_session))
        .route("/search", post(api::search))
        .route("/location", post(api::select_location))
        .route("/gps", post(api::gps))
        .route("/gps/denied", post(api::gps_denied))
        .route("/day", post(api::select_day))
        .route("/style", post(api::set_style))
        .route("/outfit", post(api::generate_outfit))
        .with_state(app_state.clone());

    Router::new()
        // The app shell
        .route("/", get(static_pages::app_page))
        // Nest the API router which already has state
        .nest("/api", api_router)
        .with_state(app_state)
}
