// Daily forecast retrieval and normalization (Open-Meteo forecast API).

use anyhow::Context;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::ForecastDay;

// The provider is asked for 16 days; only the first 15 are kept. The 16th
// day is deliberately discarded (product policy, not a sizing bug).
const FORECAST_DAYS_REQUESTED: u32 = 16;
pub const FORECAST_DAYS_SHOWN: usize = 15;

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: Option<DailySeries>,
}

#[derive(Debug, Deserialize)]
struct DailySeries {
    time: Vec<NaiveDate>,
    weather_code: Vec<i32>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
}

#[derive(Clone)]
pub struct ForecastClient {
    client: Arc<Client>,
    base_url: String,
}

impl ForecastClient {
    pub fn new(client: Arc<Client>, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the daily series for resolved coordinates and normalize it.
    /// Output keeps the provider's native chronological order.
    pub async fn fetch(&self, latitude: f64, longitude: f64) -> AppResult<Vec<ForecastDay>> {
        let url = format!("{}/v1/forecast", self.base_url);
        tracing::debug!(latitude, longitude, "Requesting daily forecast");

        let response: ForecastResponse = self
            .client
            .get(&url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                (
                    "daily",
                    "weather_code,temperature_2m_max,temperature_2m_min".to_string(),
                ),
                ("timezone", "auto".to_string()),
                ("forecast_days", FORECAST_DAYS_REQUESTED.to_string()),
            ])
            .send()
            .await
            .context("Forecast request failed")?
            .error_for_status()
            .context("Forecast provider returned an error status")?
            .json()
            .await
            .context("Failed to parse forecast response")?;

        let daily = response.daily.ok_or(AppError::NoForecastData)?;

        let forecast: Vec<ForecastDay> = daily
            .time
            .into_iter()
            .zip(daily.weather_code)
            .zip(daily.temperature_2m_max.into_iter().zip(daily.temperature_2m_min))
            .map(|((date, code), (max_temp, min_temp))| {
                ForecastDay::from_raw(date, code, max_temp, min_temp)
            })
            .take(FORECAST_DAYS_SHOWN)
            .collect();

        tracing::info!(days = forecast.len(), latitude, longitude, "Forecast retrieved");
        Ok(forecast)
    }
}
