// Best-effort IP geolocation, used once at startup to seed the session
// with a location before the user has typed anything.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;

// The provider serializes coordinates as JSON strings; a parse failure is
// treated the same as a failed lookup.
#[derive(Debug, Deserialize)]
struct IpGeoResponse {
    city: Option<String>,
    latitude: Option<String>,
    longitude: Option<String>,
}

/// Result of an IP lookup. Coordinates are preferred over the city name
/// when both are present (avoids geocoding mismatches downstream).
#[derive(Debug, Clone)]
pub struct IpLocation {
    pub city: Option<String>,
    pub coords: Option<(f64, f64)>,
}

#[derive(Clone)]
pub struct IpLocateClient {
    client: Arc<Client>,
    base_url: String,
}

impl IpLocateClient {
    pub fn new(client: Arc<Client>, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Look up a best-effort location for the caller's network address.
    pub async fn locate(&self) -> Result<IpLocation> {
        let url = format!("{}/v1/ip/geo.json", self.base_url);
        tracing::debug!(url = %url, "Requesting IP geolocation");

        let response: IpGeoResponse = self
            .client
            .get(&url)
            .send()
            .await
            .context("IP geolocation request failed")?
            .error_for_status()
            .context("IP geolocation returned an error status")?
            .json()
            .await
            .context("Failed to parse IP geolocation response")?;

        let coords = match (response.latitude, response.longitude) {
            (Some(lat), Some(lon)) => {
                let lat = lat.parse::<f64>().context("Invalid latitude in IP geolocation response")?;
                let lon = lon.parse::<f64>().context("Invalid longitude in IP geolocation response")?;
                Some((lat, lon))
            }
            _ => None,
        };

        if coords.is_none() && response.city.is_none() {
            anyhow::bail!("IP geolocation response contained neither coordinates nor a city");
        }

        Ok(IpLocation {
            city: response.city,
            coords,
        })
    }
}
