// WMO weather code mapping (Open-Meteo daily `weather_code` values).

use serde::{Deserialize, Serialize};

/// Weather condition categories mapped from WMO codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    ClearSky,
    PartlyCloudy,
    Foggy,
    Rainy,
    RainShowers,
    Snowy,
    Thunderstorm,
    Cloudy,
}

impl Condition {
    /// Convert a WMO weather code to a condition category.
    /// See: https://open-meteo.com/en/docs#weathervariables
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            0 => Self::ClearSky,
            1..=3 => Self::PartlyCloudy,
            45..=48 => Self::Foggy,
            51..=67 => Self::Rainy,
            71..=77 => Self::Snowy,
            80..=82 => Self::RainShowers,
            95..=99 => Self::Thunderstorm,
            // Anything outside the enumerated ranges
            _ => Self::Cloudy,
        }
    }

    /// Human-readable category label shown on forecast cards.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ClearSky => "Clear Sky",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::Foggy => "Foggy",
            Self::Rainy => "Rainy",
            Self::RainShowers => "Rain Showers",
            Self::Snowy => "Snowy",
            Self::Thunderstorm => "Thunderstorm",
            Self::Cloudy => "Cloudy",
        }
    }

    /// Icon tag the frontend maps to an actual glyph.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::ClearSky => "sunny",
            Self::PartlyCloudy => "cloudy",
            Self::Foggy => "foggy",
            Self::Rainy => "rainy",
            Self::RainShowers => "rainy",
            Self::Snowy => "snowy",
            Self::Thunderstorm => "stormy",
            Self::Cloudy => "cloudy",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wmo_code_clear_sky() {
        assert_eq!(Condition::from_wmo_code(0), Condition::ClearSky);
    }

    #[test]
    fn test_wmo_code_partly_cloudy() {
        assert_eq!(Condition::from_wmo_code(1), Condition::PartlyCloudy);
        assert_eq!(Condition::from_wmo_code(2), Condition::PartlyCloudy);
        assert_eq!(Condition::from_wmo_code(3), Condition::PartlyCloudy);
    }

    #[test]
    fn test_wmo_code_foggy() {
        assert_eq!(Condition::from_wmo_code(45), Condition::Foggy);
        assert_eq!(Condition::from_wmo_code(48), Condition::Foggy);
    }

    #[test]
    fn test_wmo_code_rainy() {
        assert_eq!(Condition::from_wmo_code(51), Condition::Rainy);
        assert_eq!(Condition::from_wmo_code(55), Condition::Rainy);
        assert_eq!(Condition::from_wmo_code(61), Condition::Rainy);
        assert_eq!(Condition::from_wmo_code(67), Condition::Rainy);
    }

    #[test]
    fn test_wmo_code_snowy() {
        assert_eq!(Condition::from_wmo_code(71), Condition::Snowy);
        assert_eq!(Condition::from_wmo_code(75), Condition::Snowy);
        assert_eq!(Condition::from_wmo_code(77), Condition::Snowy);
    }

    #[test]
    fn test_wmo_code_rain_showers() {
        assert_eq!(Condition::from_wmo_code(80), Condition::RainShowers);
        assert_eq!(Condition::from_wmo_code(82), Condition::RainShowers);
    }

    #[test]
    fn test_wmo_code_thunderstorm() {
        assert_eq!(Condition::from_wmo_code(95), Condition::Thunderstorm);
        assert_eq!(Condition::from_wmo_code(99), Condition::Thunderstorm);
    }

    #[test]
    fn test_wmo_code_out_of_range_defaults_to_cloudy() {
        assert_eq!(Condition::from_wmo_code(4), Condition::Cloudy);
        assert_eq!(Condition::from_wmo_code(50), Condition::Cloudy);
        assert_eq!(Condition::from_wmo_code(70), Condition::Cloudy);
        assert_eq!(Condition::from_wmo_code(100), Condition::Cloudy);
        assert_eq!(Condition::from_wmo_code(-1), Condition::Cloudy);
    }

    #[test]
    fn test_every_category_has_label_and_icon() {
        for code in [0, 1, 45, 51, 71, 80, 95, 4] {
            let condition = Condition::from_wmo_code(code);
            assert!(!condition.label().is_empty());
            assert!(!condition.icon().is_empty());
        }
    }

    #[test]
    fn test_rain_showers_share_rainy_icon() {
        assert_eq!(Condition::RainShowers.icon(), Condition::Rainy.icon());
        assert_ne!(Condition::RainShowers.label(), Condition::Rainy.label());
    }
}
