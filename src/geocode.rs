// Location resolution: literal "lat,lon" input short-circuits, anything
// else goes through the geocoding lookup.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::LocationCandidate;

/// Maximum number of ranked candidates requested from the lookup.
pub const MAX_CANDIDATES: u32 = 5;

// Strict decimal pair, optionally negative. Free text never matches.
static COORD_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-?\d+(\.\d+)?),(-?\d+(\.\d+)?)$").expect("valid coordinate regex"));

/// Parse a literal "latitude,longitude" query. Returns `None` for anything
/// that is not a strict numeric pair.
pub fn parse_coord_pair(query: &str) -> Option<(f64, f64)> {
    let caps = COORD_PAIR.captures(query)?;
    let lat = caps.get(1)?.as_str().parse::<f64>().ok()?;
    let lon = caps.get(3)?.as_str().parse::<f64>().ok()?;
    Some((lat, lon))
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    // Absent entirely when the query has no matches.
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    id: i64,
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
    admin1: Option<String>,
    country_code: Option<String>,
}

impl From<GeocodingResult> for LocationCandidate {
    fn from(r: GeocodingResult) -> Self {
        LocationCandidate {
            id: r.id,
            name: r.name,
            country: r.country,
            region: r.admin1,
            latitude: r.latitude,
            longitude: r.longitude,
            country_code: r.country_code,
        }
    }
}

#[derive(Clone)]
pub struct GeocodingClient {
    client: Arc<Client>,
    base_url: String,
}

impl GeocodingClient {
    pub fn new(client: Arc<Client>, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Free-text lookup returning up to [`MAX_CANDIDATES`] ranked places.
    /// `language=en` keeps the metadata (country names etc.) in English;
    /// the provider matches native-script queries as typed.
    pub async fn search(&self, query: &str) -> Result<Vec<LocationCandidate>> {
        let url = format!(
            "{}/v1/search?name={}&count={}&language=en&format=json",
            self.base_url,
            urlencoding::encode(query),
            MAX_CANDIDATES
        );
        tracing::debug!(query, "Geocoding lookup");

        let response: GeocodingResponse = self
            .client
            .get(&url)
            .send()
            .await
            .context("Geocoding request failed")?
            .error_for_status()
            .context("Geocoding returned an error status")?
            .json()
            .await
            .context("Failed to parse geocoding response")?;

        let candidates: Vec<LocationCandidate> = response
            .results
            .unwrap_or_default()
            .into_iter()
            .map(LocationCandidate::from)
            .collect();

        tracing::debug!(query, count = candidates.len(), "Geocoding lookup complete");
        Ok(candidates)
    }

    /// Resolve a location query to coordinates. A literal coordinate pair
    /// is returned directly with no network call; free text resolves to
    /// the top-ranked candidate.
    pub async fn resolve(&self, query: &str) -> AppResult<(f64, f64)> {
        if let Some(coords) = parse_coord_pair(query) {
            return Ok(coords);
        }

        let candidates = self.search(query).await?;
        let top = candidates
            .into_iter()
            .next()
            .ok_or_else(|| AppError::LocationNotFound(query.to_string()))?;
        Ok((top.latitude, top.longitude))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> Arc<Client> {
        Arc::new(Client::new())
    }

    #[test]
    fn test_coord_pair_accepts_strict_pairs() {
        assert_eq!(parse_coord_pair("35.6762,139.6503"), Some((35.6762, 139.6503)));
        assert_eq!(parse_coord_pair("-33.87,151.21"), Some((-33.87, 151.21)));
        assert_eq!(parse_coord_pair("10,-20"), Some((10.0, -20.0)));
    }

    #[test]
    fn test_coord_pair_rejects_free_text() {
        assert_eq!(parse_coord_pair("Tokyo"), None);
        assert_eq!(parse_coord_pair("35.6762, 139.6503"), None); // space
        assert_eq!(parse_coord_pair("35.6762,139.6503,7"), None);
        assert_eq!(parse_coord_pair("35.,139."), None);
        assert_eq!(parse_coord_pair(""), None);
    }

    #[tokio::test]
    async fn test_search_maps_candidates() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "Paris"))
            .and(query_param("count", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    {"id": 2988507, "name": "Paris", "latitude": 48.85341, "longitude": 2.3488,
                     "country": "France", "admin1": "Île-de-France", "country_code": "FR"},
                    {"id": 4717560, "name": "Paris", "latitude": 33.66094, "longitude": -95.55551,
                     "country": "United States", "admin1": "Texas", "country_code": "US"},
                    {"id": 3023423, "name": "Paris", "latitude": 45.63325, "longitude": 5.72722,
                     "country": "France"}
                ]
            })))
            .mount(&mock_server)
            .await;

        let candidates = GeocodingClient::new(client(), &mock_server.uri())
            .search("Paris")
            .await
            .unwrap();

        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0].name, "Paris");
        assert_eq!(candidates[0].region.as_deref(), Some("Île-de-France"));
        assert_eq!(candidates[1].country_code.as_deref(), Some("US"));
        assert!(candidates[2].region.is_none());
    }

    #[tokio::test]
    async fn test_search_no_results_field_means_empty() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "generationtime_ms": 0.5
            })))
            .mount(&mock_server)
            .await;

        let candidates = GeocodingClient::new(client(), &mock_server.uri())
            .search("xyzzy")
            .await
            .unwrap();

        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_coordinate_pair_never_hits_the_network() {
        // No mocks mounted: any request would come back 404 and fail.
        let mock_server = MockServer::start().await;

        let coords = GeocodingClient::new(client(), &mock_server.uri())
            .resolve("35.6762,139.6503")
            .await
            .unwrap();

        assert_eq!(coords, (35.6762, 139.6503));
        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_free_text_uses_top_candidate() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    {"id": 1850147, "name": "Tokyo", "latitude": 35.6895, "longitude": 139.69171,
                     "country": "Japan", "country_code": "JP"}
                ]
            })))
            .mount(&mock_server)
            .await;

        let coords = GeocodingClient::new(client(), &mock_server.uri())
            .resolve("Tokyo")
            .await
            .unwrap();

        assert_eq!(coords, (35.6895, 139.69171));
    }

    #[tokio::test]
    async fn test_resolve_zero_candidates_is_location_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&mock_server)
            .await;

        let result = GeocodingClient::new(client(), &mock_server.uri())
            .resolve("Nowhereville")
            .await;

        assert!(matches!(result, Err(AppError::LocationNotFound(q)) if q == "Nowhereville"));
    }
}
