use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Countries that report temperatures in Fahrenheit.
const FAHRENHEIT_COUNTRIES: &[&str] = &["US", "LR", "MM", "PR", "GU", "VI", "AS", "MP"];

/// Temperature unit preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Auto,
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Pick a concrete unit. `Auto` follows the country of the location.
    pub fn resolve(self, country_code: Option<&str>) -> Self {
        match self {
            Self::Auto => match country_code {
                Some(code)
                    if FAHRENHEIT_COUNTRIES
                        .iter()
                        .any(|c| c.eq_ignore_ascii_case(code.trim())) =>
                {
                    Self::Fahrenheit
                }
                _ => Self::Celsius,
            },
            unit => unit,
        }
    }

    /// Value of Open-Meteo's `temperature_unit` parameter
    pub fn api_param(self) -> &'static str {
        match self {
            Self::Fahrenheit => "fahrenheit",
            Self::Auto | Self::Celsius => "celsius",
        }
    }

    /// Value of Open-Meteo's `wind_speed_unit` parameter
    pub fn wind_speed_param(self) -> &'static str {
        match self {
            Self::Fahrenheit => "mph",
            Self::Auto | Self::Celsius => "kmh",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Fahrenheit => "°F",
            Self::Auto | Self::Celsius => "°C",
        }
    }

    pub fn wind_speed_label(self) -> &'static str {
        match self {
            Self::Fahrenheit => "mph",
            Self::Auto | Self::Celsius => "km/h",
        }
    }
}

impl std::str::FromStr for TemperatureUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "c" | "celsius" | "metric" => Ok(Self::Celsius),
            "f" | "fahrenheit" | "imperial" => Ok(Self::Fahrenheit),
            other => Err(format!("unknown temperature unit: {}", other)),
        }
    }
}

/// Weather condition categories mapped from WMO codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    #[default]
    Clear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    HeavyRain,
    Snow,
    Sleet,
    Thunderstorm,
}

impl WeatherCondition {
    /// Convert WMO weather code to WeatherCondition
    /// See: https://open-meteo.com/en/docs#weathervariables
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            0 => Self::Clear,
            1..=2 => Self::PartlyCloudy,
            3 => Self::Cloudy,
            45 | 48 => Self::Fog,
            51 | 53 | 55 => Self::Drizzle,
            56 | 57 => Self::Sleet, // Freezing drizzle
            61 | 63 | 80 => Self::Rain,
            65 | 81 | 82 => Self::HeavyRain,
            66 | 67 => Self::Sleet, // Freezing rain
            71 | 73 | 75 | 77 | 85 | 86 => Self::Snow,
            95 | 96 | 99 => Self::Thunderstorm,
            _ => Self::Clear,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::Cloudy => "Cloudy",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::HeavyRain => "Heavy Rain",
            Self::Snow => "Snow",
            Self::Sleet => "Sleet",
            Self::Thunderstorm => "Thunderstorm",
        }
    }

    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Clear => "sun",
            Self::PartlyCloudy => "cloud_sun",
            Self::Cloudy => "cloud",
            Self::Fog => "cloud_fog",
            Self::Drizzle | Self::Rain | Self::HeavyRain => "cloud_rain",
            Self::Snow | Self::Sleet => "cloud_snow",
            Self::Thunderstorm => "cloud_lightning",
        }
    }
}

/// Geographic location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: Option<f64>,
    pub city_name: Option<String>,
    /// ISO 3166-1 alpha-2
    pub country_code: Option<String>,
}

impl Location {
    /// Build a location from raw coordinates, rejecting anything off the globe.
    pub fn from_coordinates(latitude: f64, longitude: f64) -> Result<Self, LocationError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);

        if !valid {
            return Err(LocationError::InvalidCoordinates {
                latitude,
                longitude,
            });
        }

        Ok(Self {
            latitude,
            longitude,
            accuracy_meters: None,
            city_name: None,
            country_code: None,
        })
    }

    /// Place name, or the coordinates when the place is unnamed.
    pub fn display_name(&self) -> String {
        self.city_name
            .clone()
            .unwrap_or_else(|| format!("{:.2}, {:.2}", self.latitude, self.longitude))
    }
}

/// Current weather conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub condition: WeatherCondition,
    /// Local time at the location
    pub observed_at: NaiveDateTime,
}

/// Daily forecast entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayForecast {
    pub date: NaiveDate,
    pub high: f64,
    pub low: f64,
    pub condition: WeatherCondition,
    pub precipitation_chance: u8,
    /// None during polar day/night
    pub sunrise: Option<NaiveTime>,
    pub sunset: Option<NaiveTime>,
}

/// Complete weather data bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherData {
    pub current: CurrentWeather,
    pub forecast: Vec<DayForecast>,
    pub location: Location,
    /// Always Celsius or Fahrenheit, never Auto
    pub unit: TemperatureUnit,
    pub fetched_at: DateTime<Utc>,
}

/// Location service errors
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Coordinates out of range: {latitude}, {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
    #[error("Location service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    #[error("Location not found: {0}")]
    LocationNotFound(String),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Rate limited")]
    RateLimited,
    #[error("Service unavailable ({0})")]
    ServiceUnavailable(u16),
    #[error("Parse error: {0}")]
    Parse(String),
}
