// Session state and its transitions. All orchestration lives here: the
// unified load with its default-location fallback, the outfit cache, the
// transient error indicator and the load-generation guard. Network calls
// never run while the state lock is held.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use chrono::NaiveDate;
use reqwest::Client;
use tokio::sync::RwLock;

use crate::config::Settings;
use crate::error::{AppError, AppResult};
use crate::forecast::ForecastClient;
use crate::geocode::GeocodingClient;
use crate::geolocate::IpLocateClient;
use crate::models::{
    ForecastDay, LoadingState, LocationCandidate, OutfitResult, SessionSnapshot, StylePreference,
};
use crate::stylist::StylistClient;

/// How long a transient error stays visible before clearing itself.
pub const ERROR_DISPLAY: Duration = Duration::from_millis(2500);

const GPS_DISPLAY_NAME: &str = "Current Location";
const GPS_GENERATION_CONTEXT: &str = "your area";
const LOAD_ERROR_MESSAGE: &str =
    "Failed to load weather. Please check the city name and try again.";
const GPS_ERROR_MESSAGE: &str = "Unable to retrieve location";

/// Result of a manual search: either candidates for an interactive pick,
/// or the direct load already happened.
pub enum SearchOutcome {
    Candidates(Vec<LocationCandidate>),
    Loaded,
}

#[derive(Default)]
struct SessionState {
    location_name: String,
    style: StylePreference,
    forecast: Vec<ForecastDay>,
    // Invariant: always a member of `forecast`, or None.
    selected_date: Option<NaiveDate>,
    outfits: HashMap<(NaiveDate, StylePreference), OutfitResult>,
    loading: LoadingState,
    error: Option<String>,
    error_epoch: u64,
    via_gps: bool,
    // Bumped at the start of every load; a response whose generation is
    // stale by commit time is discarded instead of overwriting state.
    load_generation: u64,
}

pub struct SessionController {
    state: RwLock<SessionState>,
    ip_locate: IpLocateClient,
    geocoding: GeocodingClient,
    forecast: ForecastClient,
    stylist: StylistClient,
    default_city: String,
}

impl SessionController {
    pub fn new(http_client: Arc<Client>, settings: &Settings) -> Self {
        Self {
            state: RwLock::new(SessionState::default()),
            ip_locate: IpLocateClient::new(Arc::clone(&http_client), &settings.ip_locate_base_url),
            geocoding: GeocodingClient::new(Arc::clone(&http_client), &settings.geocoding_base_url),
            forecast: ForecastClient::new(Arc::clone(&http_client), &settings.forecast_base_url),
            stylist: StylistClient::new(
                http_client,
                &settings.generation_base_url,
                &settings.generation_api_key,
            ),
            default_city: settings.default_city.clone(),
        }
    }

    /// Startup transition: IP-based geolocation, preferring coordinates
    /// over the reported city name (avoids geocoding mismatches). Any
    /// lookup or parse failure falls back to the default location.
    pub async fn bootstrap(self: Arc<Self>) {
        match self.ip_locate.locate().await {
            Ok(located) => {
                if let Some((lat, lon)) = located.coords {
                    let via_gps = located.city.is_none();
                    let display = located
                        .city
                        .unwrap_or_else(|| GPS_DISPLAY_NAME.to_string());
                    let query = format!("{},{}", lat, lon);
                    self.load_weather(&query, &display, via_gps).await;
                } else if let Some(city) = located.city {
                    self.load_weather(&city, &city, false).await;
                }
            }
            Err(e) => {
                tracing::warn!(
                    default = %self.default_city,
                    "IP geolocation failed ({:#}), using default location", e
                );
                let city = self.default_city.clone();
                self.load_weather(&city, &city, false).await;
            }
        }
    }

    /// Unified load: resolve the query, retrieve the forecast, and on
    /// success atomically replace forecast, selection, display name and
    /// outfit cache. On failure existing data is kept, a transient error
    /// is surfaced, and — only when nothing is displayed — the default
    /// location is tried exactly once.
    pub async fn load_weather(self: &Arc<Self>, query: &str, display_name: &str, via_gps: bool) {
        if self.attempt_load(query, display_name, via_gps).await {
            return;
        }

        let nothing_displayed = self.state.read().await.forecast.is_empty();
        if nothing_displayed && query != self.default_city {
            let city = self.default_city.clone();
            tracing::info!(default = %city, "No forecast displayed, retrying with default location");
            self.attempt_load(&city, &city, false).await;
        }
    }

    /// One load attempt. Returns true when the attempt concluded the
    /// operation (success, or superseded by a newer load).
    async fn attempt_load(self: &Arc<Self>, query: &str, display_name: &str, via_gps: bool) -> bool {
        tracing::info!(query, display_name, "Loading weather");
        let generation = {
            let mut s = self.state.write().await;
            s.loading = LoadingState::FetchingForecast;
            s.error = None;
            s.load_generation += 1;
            s.load_generation
        };

        let result = async {
            let (lat, lon) = self.geocoding.resolve(query).await?;
            self.forecast.fetch(lat, lon).await
        }
        .await;

        match result {
            Ok(forecast) => {
                let mut s = self.state.write().await;
                if s.load_generation != generation {
                    tracing::debug!(query, "Discarding superseded forecast response");
                    return true;
                }
                s.selected_date = forecast.first().map(|d| d.date);
                s.forecast = forecast;
                s.location_name = display_name.to_string();
                s.outfits.clear();
                s.via_gps = via_gps;
                s.loading = LoadingState::Idle;
                true
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "Weather load failed");
                {
                    let mut s = self.state.write().await;
                    if s.load_generation == generation {
                        s.loading = LoadingState::Idle;
                    }
                }
                self.set_transient_error(LOAD_ERROR_MESSAGE).await;
                false
            }
        }
    }

    /// Manual search. Candidates are returned for an interactive pick;
    /// an empty or failed lookup degrades to a direct load with the raw
    /// text as both query and display name.
    pub async fn search(self: &Arc<Self>, query: &str) -> SearchOutcome {
        match self.geocoding.search(query).await {
            Ok(candidates) if !candidates.is_empty() => SearchOutcome::Candidates(candidates),
            Ok(_) => {
                tracing::debug!(query, "No candidates, attempting direct load");
                self.load_weather(query, query, false).await;
                SearchOutcome::Loaded
            }
            Err(e) => {
                tracing::warn!(query, "Candidate lookup failed ({:#}), attempting direct load", e);
                self.load_weather(query, query, false).await;
                SearchOutcome::Loaded
            }
        }
    }

    /// Interactive candidate pick: the candidate's own coordinates are
    /// used directly, bypassing ranking.
    pub async fn select_candidate(self: &Arc<Self>, name: &str, latitude: f64, longitude: f64) {
        let query = format!("{},{}", latitude, longitude);
        self.load_weather(&query, name, false).await;
    }

    /// Browser-granted GPS coordinates.
    pub async fn gps(self: &Arc<Self>, latitude: f64, longitude: f64) {
        let query = format!("{},{}", latitude, longitude);
        self.load_weather(&query, GPS_DISPLAY_NAME, true).await;
    }

    /// Geolocation denied or unavailable: transient indicator only,
    /// existing data untouched.
    pub async fn gps_denied(self: &Arc<Self>) {
        self.set_transient_error(GPS_ERROR_MESSAGE).await;
    }

    /// Select a forecast day. Ignored unless the date is a member of the
    /// current forecast.
    pub async fn select_day(&self, date: NaiveDate) {
        let mut s = self.state.write().await;
        if s.forecast.iter().any(|d| d.date == date) {
            s.selected_date = Some(date);
        } else {
            tracing::warn!(%date, "Ignoring selection outside the current forecast");
        }
    }

    pub async fn set_style(&self, style: StylePreference) {
        self.state.write().await.style = style;
    }

    /// Generate (or fetch from cache) the outfit for the selected day and
    /// current style. A cache hit without `refresh` performs no network
    /// requests; `refresh` always regenerates and overwrites. Failure
    /// leaves the cache entry unset and propagates to the caller.
    pub async fn generate_outfit(&self, refresh: bool) -> AppResult<OutfitResult> {
        let (day, style, context) = {
            let mut s = self.state.write().await;
            let date = s
                .selected_date
                .ok_or_else(|| AppError::InternalServerError(anyhow!("no forecast day selected")))?;
            let day = s
                .forecast
                .iter()
                .find(|d| d.date == date)
                .cloned()
                .ok_or_else(|| {
                    AppError::InternalServerError(anyhow!("selected day missing from forecast"))
                })?;

            if !refresh {
                if let Some(cached) = s.outfits.get(&(date, s.style)) {
                    tracing::debug!(%date, "Returning cached outfit");
                    return Ok(cached.clone());
                }
            }

            let context = if s.via_gps {
                GPS_GENERATION_CONTEXT.to_string()
            } else {
                s.location_name.clone()
            };
            s.loading = LoadingState::GeneratingOutfit;
            (day, s.style, context)
        };

        tracing::info!(date = %day.date, ?style, refresh, "Generating outfit");
        let result = self.stylist.generate(&context, &day, style).await;

        let mut s = self.state.write().await;
        s.loading = LoadingState::Idle;
        let outfit = result?;
        s.outfits.insert((day.date, style), outfit.clone());
        Ok(outfit)
    }

    /// Serializable view for the frontend.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let s = self.state.read().await;
        let outfit = s
            .selected_date
            .and_then(|date| s.outfits.get(&(date, s.style)).cloned());
        SessionSnapshot {
            location_name: s.location_name.clone(),
            style: s.style,
            loading: s.loading,
            error: s.error.clone(),
            forecast: s.forecast.clone(),
            selected_date: s.selected_date,
            outfit,
            via_gps: s.via_gps,
        }
    }

    /// Surface a transient error; it clears itself after [`ERROR_DISPLAY`]
    /// unless a newer error replaced it in the meantime.
    async fn set_transient_error(self: &Arc<Self>, message: &str) {
        let epoch = {
            let mut s = self.state.write().await;
            s.error = Some(message.to_string());
            s.error_epoch += 1;
            s.error_epoch
        };

        let controller = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(ERROR_DISPLAY).await;
            let mut s = controller.state.write().await;
            if s.error_epoch == epoch {
                s.error = None;
            }
        });
    }
}
