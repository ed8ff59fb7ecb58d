use askama::Template;
use axum::response::{Html, IntoResponse};

use crate::error::AppError; // Use our custom error type

// Template struct for the main app page
#[derive(Template)]
#[template(path = "index.html")]
struct AppTemplate;

// Handler function to render the application shell
pub async fn app_page() -> Result<impl IntoResponse, AppError> {
    let template = AppTemplate;
    match template.render() {
        Ok(html) => Ok(Html(html)),
        Err(e) => {
            tracing::error!("Failed to render app template: {}", e);
            // Convert Askama error into our AppError
            Err(AppError::InternalServerError(anyhow::Error::new(e)))
        }
    }
}
