// Data structures shared between the session controller, the upstream
// clients and the JSON API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::conditions::Condition;

/// One normalized day of the forecast strip. Immutable once produced; the
/// whole set is replaced on every successful retrieval.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub day_of_week: String,
    pub max_temp: f64,
    pub min_temp: f64,
    pub condition: String,
    pub description: String,
    pub icon: String,
}

impl ForecastDay {
    /// Build a day record from raw provider values.
    pub fn from_raw(date: NaiveDate, weather_code: i32, max_temp: f64, min_temp: f64) -> Self {
        let condition = Condition::from_wmo_code(weather_code);
        Self {
            date,
            day_of_week: date.format("%A").to_string(),
            max_temp,
            min_temp,
            condition: condition.label().to_string(),
            description: format!("{}, High: {}°C", condition.label(), max_temp),
            icon: condition.icon().to_string(),
        }
    }
}

/// A ranked geocoding candidate. Ephemeral: discarded once a selection is
/// made or the list is replaced by a new query.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LocationCandidate {
    pub id: i64,
    pub name: String,
    pub country: Option<String>,
    pub region: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub country_code: Option<String>,
}

/// Result of one outfit generation: a description plus the two rendered
/// images as data URIs. All-or-nothing — a partially populated value is
/// never produced.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OutfitResult {
    pub outfit_image: Option<String>,
    pub breakdown_image: Option<String>,
    pub description: String,
}

/// User-selected framing for generated outfits.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StylePreference {
    #[default]
    Female,
    Male,
    Unisex,
}

impl StylePreference {
    /// Term embedded in the text-generation prompt.
    pub fn prompt_term(&self) -> &'static str {
        match self {
            Self::Female => "women's",
            Self::Male => "men's",
            Self::Unisex => "unisex",
        }
    }
}

/// Coarse-grained loading flag. One shared flag, not per-operation;
/// overlapping triggers are prevented by disabled controls in the
/// presentation layer.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoadingState {
    #[default]
    Idle,
    FetchingForecast,
    GeneratingOutfit,
}

/// Serializable view of the session handed to the frontend after every
/// transition.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub location_name: String,
    pub style: StylePreference,
    pub loading: LoadingState,
    pub error: Option<String>,
    pub forecast: Vec<ForecastDay>,
    pub selected_date: Option<NaiveDate>,
    pub outfit: Option<OutfitResult>,
    pub via_gps: bool,
}
