// Application configuration via the 'config' crate and 'dotenv'.
// Every upstream base URL is a setting so tests can point the clients at a
// local mock server.

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

// The original deployment shipped with this key baked into the page; it is
// only a quota credential for the generation provider, not a user secret.
const DEFAULT_GENERATION_API_KEY: &str = "pk_TciVoSMb9O1XiPaE";

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server_address: String,
    /// Fallback location when resolution or retrieval fails at startup.
    pub default_city: String,
    /// Bearer credential attached to every generation request.
    pub generation_api_key: String,
    pub geocoding_base_url: String,
    pub forecast_base_url: String,
    pub ip_locate_base_url: String,
    pub generation_base_url: String,
}

impl Settings {
    pub fn new() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let builder = Config::builder()
            // Add default values
            .set_default("server_address", "127.0.0.1:3000")?
            .set_default("default_city", "Tokyo")?
            .set_default("generation_api_key", DEFAULT_GENERATION_API_KEY)?
            .set_default("geocoding_base_url", "https://geocoding-api.open-meteo.com")?
            .set_default("forecast_base_url", "https://api.open-meteo.com")?
            .set_default("ip_locate_base_url", "https://get.geojs.io")?
            .set_default("generation_base_url", "https://gen.pollinations.ai")?
            // Load from a configuration file (e.g., config.toml)
            .add_source(File::with_name("config").required(false))
            // Load from environment variables (e.g., APP_GENERATION_API_KEY)
            .add_source(Environment::with_prefix("APP"));

        let settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::new().unwrap();
        assert_eq!(settings.default_city, "Tokyo");
        assert_eq!(settings.forecast_base_url, "https://api.open-meteo.com");
        assert!(!settings.generation_api_key.is_empty());
    }
}
