// Application error taxonomy and conversion into HTTP responses.
// Failure details go to the logs; response bodies stay terse.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Geocoding returned zero candidates for the query.
    #[error("location not found: {0}")]
    LocationNotFound(String),

    /// Forecast provider response lacked the expected daily series.
    #[error("no weather data found")]
    NoForecastData,

    /// Text or image generation request was rejected or failed.
    #[error("outfit generation failed: {0}")]
    Generation(#[source] anyhow::Error),

    /// Browser geolocation was denied or unavailable.
    #[error("unable to retrieve location")]
    GeolocationDenied,

    #[error(transparent)]
    InternalServerError(#[from] anyhow::Error),
}

// Implement IntoResponse for AppError to convert errors into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::LocationNotFound(query) => {
                tracing::warn!("Location not found for query: {}", query);
                (StatusCode::NOT_FOUND, format!("Location not found: {}", query))
            }
            AppError::NoForecastData => {
                tracing::warn!("Forecast provider returned no daily series");
                (StatusCode::BAD_GATEWAY, "No weather data found".to_string())
            }
            AppError::Generation(e) => {
                tracing::error!("Outfit generation failed: {:?}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "Failed to generate outfit images. Please try again.".to_string(),
                )
            }
            AppError::GeolocationDenied => {
                (StatusCode::FORBIDDEN, "Unable to retrieve location".to_string())
            }
            AppError::InternalServerError(e) => {
                // Log the detailed error here
                tracing::error!("Internal server error: {:?}", e);
                // Don't expose internal details to the client
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        (status, error_message).into_response()
    }
}

// Define a custom Result type using our AppError
pub type AppResult<T> = Result<T, AppError>;
