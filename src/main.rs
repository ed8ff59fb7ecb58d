use anyhow::{Context, Result};
use axum::{extract::FromRef, Router};
use reqwest::Client;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Settings;
use crate::session::SessionController;

// Declare modules
mod conditions;
mod config;
mod error;
mod forecast;
mod geocode;
mod geolocate;
mod models;
mod routes;
mod session;
mod stylist;

const USER_AGENT: &str = "AuraCast/0.1 (weather & style advisor)";

// Define the application state struct
#[derive(Clone, FromRef)]
struct AppState {
    settings: Arc<Settings>,
    session: Arc<SessionController>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file first. Ignore errors (e.g., file not found)
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auracast=info,tower_http=info".into()), // Default to info if RUST_LOG not set
        )
        .with(fmt::layer())
        .init();

    tracing::info!("Initializing AuraCast server...");

    // Load configuration
    let settings = Settings::new().context("Failed to load configuration")?;
    let shared_settings = Arc::new(settings);
    tracing::info!("Configuration loaded successfully.");

    // One shared reqwest client for every upstream API
    let http_client = Arc::new(
        Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build shared reqwest client")?,
    );

    let session = Arc::new(SessionController::new(
        Arc::clone(&http_client),
        &shared_settings,
    ));

    // Seed the session with an IP-derived location (or the default city)
    // before the first snapshot request arrives.
    tokio::spawn(Arc::clone(&session).bootstrap());

    // Create the application state instance
    let app_state = AppState {
        settings: Arc::clone(&shared_settings),
        session,
    };

    let router: Router = routes::create_router(app_state.clone());

    // Combine the router with static file serving
    let app = router.nest_service("/static", ServeDir::new("static"));

    // Parse the server address from settings
    let addr: SocketAddr = app_state
        .settings
        .server_address
        .parse()
        .with_context(|| {
            format!(
                "Invalid server address format in configuration ('{}')",
                app_state.settings.server_address
            )
        })?;

    // Create a TCP listener
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to address {}", addr))?;
    tracing::info!("Server listening on {}", addr);

    // Run the server
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
