//! Open-Meteo weather provider: current conditions and daily forecast.

use crate::client::ClientSettings;
use crate::types::{
    CurrentWeather, DayForecast, Location, TemperatureUnit, WeatherCondition, WeatherData,
    WeatherError,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

pub const OPEN_METEO_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_FORECAST_DAYS: u8 = 3;

const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,apparent_temperature,weather_code,wind_speed_10m";
const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min,precipitation_probability_max,sunrise,sunset";

/// Open-Meteo timestamps are local ISO-8601 without seconds.
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    current: CurrentBlock,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    time: String,
    temperature_2m: f64,
    relative_humidity_2m: f64,
    apparent_temperature: f64,
    weather_code: i32,
    wind_speed_10m: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: DailyBlock,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    time: Vec<String>,
    weather_code: Vec<Option<i32>>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    precipitation_probability_max: Vec<Option<f64>>,
    sunrise: Vec<Option<String>>,
    sunset: Vec<Option<String>>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: String,
    unit: TemperatureUnit,
    forecast_days: u8,
}

impl WeatherProvider {
    pub fn new(settings: &ClientSettings, unit: TemperatureUnit) -> Result<Self, WeatherError> {
        Self::with_base_url(settings, OPEN_METEO_FORECAST_URL, unit)
    }

    pub fn with_base_url(
        settings: &ClientSettings,
        base_url: &str,
        unit: TemperatureUnit,
    ) -> Result<Self, WeatherError> {
        Ok(Self {
            client: Arc::new(settings.build()?),
            base_url: base_url.to_string(),
            unit,
            forecast_days: DEFAULT_FORECAST_DAYS,
        })
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    pub fn set_unit(&mut self, unit: TemperatureUnit) {
        self.unit = unit;
    }

    pub fn forecast_days(&self) -> u8 {
        self.forecast_days
    }

    /// Days requested per forecast, including today. Clamped to 1..=16.
    pub fn set_forecast_days(&mut self, days: u8) {
        self.forecast_days = days.clamp(1, 16);
    }

    /// Current conditions followed by the daily forecast, fetched one after the other.
    #[instrument(skip(self, location), fields(lat = location.latitude, lon = location.longitude), level = "info")]
    pub async fn fetch(&self, location: &Location) -> Result<WeatherData, WeatherError> {
        let unit = self.unit.resolve(location.country_code.as_deref());

        let current = self.fetch_current(location, unit).await?;
        let forecast = self.fetch_forecast(location, unit).await?;

        tracing::info!(
            "Fetched weather for {} ({} forecast days)",
            location.display_name(),
            forecast.len()
        );

        Ok(WeatherData {
            current,
            forecast,
            location: location.clone(),
            unit,
            fetched_at: Utc::now(),
        })
    }

    #[instrument(skip(self, location), level = "debug")]
    pub async fn fetch_current(
        &self,
        location: &Location,
        unit: TemperatureUnit,
    ) -> Result<CurrentWeather, WeatherError> {
        let mut query = self.base_query(location, unit);
        query.push(("current", CURRENT_FIELDS.to_string()));

        let body: CurrentResponse = self.get_json(&query).await?;
        let c = body.current;

        Ok(CurrentWeather {
            temperature: c.temperature_2m,
            feels_like: c.apparent_temperature,
            humidity: to_percent(c.relative_humidity_2m),
            wind_speed: c.wind_speed_10m,
            condition: WeatherCondition::from_wmo_code(c.weather_code),
            observed_at: NaiveDateTime::parse_from_str(&c.time, TIME_FORMAT)
                .map_err(|e| WeatherError::Parse(format!("current time {:?}: {}", c.time, e)))?,
        })
    }

    #[instrument(skip(self, location), level = "debug")]
    pub async fn fetch_forecast(
        &self,
        location: &Location,
        unit: TemperatureUnit,
    ) -> Result<Vec<DayForecast>, WeatherError> {
        let mut query = self.base_query(location, unit);
        query.push(("daily", DAILY_FIELDS.to_string()));
        query.push(("forecast_days", self.forecast_days.to_string()));

        let body: ForecastResponse = self.get_json(&query).await?;
        let days = parse_daily(body.daily)?;

        if days.len() < usize::from(self.forecast_days) {
            return Err(WeatherError::Parse(format!(
                "expected {} forecast days, got {}",
                self.forecast_days,
                days.len()
            )));
        }

        Ok(days
            .into_iter()
            .take(usize::from(self.forecast_days))
            .collect())
    }

    fn base_query(&self, location: &Location, unit: TemperatureUnit) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            ("temperature_unit", unit.api_param().to_string()),
            ("wind_speed_unit", unit.wind_speed_param().to_string()),
            ("timezone", "auto".to_string()),
        ]
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        query: &[(&'static str, String)],
    ) -> Result<T, WeatherError> {
        tracing::debug!("GET {} {:?}", self.base_url, query);

        let response = self.client.get(&self.base_url).query(query).send().await?;
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| WeatherError::Parse(format!("JSON parse error: {}", e)));
        }

        let text = response.text().await.unwrap_or_default();
        Err(error_for_status(status, &text))
    }
}

/// Maps a non-2xx Open-Meteo response to an error. Shared with the geocoder.
pub(crate) fn error_for_status(status: StatusCode, body: &str) -> WeatherError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return WeatherError::RateLimited;
    }
    if status.is_server_error() {
        return WeatherError::ServiceUnavailable(status.as_u16());
    }

    // Open-Meteo explains 400s as {"error": true, "reason": "..."}
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.reason)
        .unwrap_or_else(|| body.to_string());

    WeatherError::Api {
        status: status.as_u16(),
        message,
    }
}

fn to_percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

fn parse_time_of_day(value: Option<&String>) -> Option<NaiveTime> {
    value
        .and_then(|s| NaiveDateTime::parse_from_str(s, TIME_FORMAT).ok())
        .map(|dt| dt.time())
}

fn parse_daily(daily: DailyBlock) -> Result<Vec<DayForecast>, WeatherError> {
    let len = daily.time.len();
    let lengths = [
        daily.weather_code.len(),
        daily.temperature_2m_max.len(),
        daily.temperature_2m_min.len(),
        daily.precipitation_probability_max.len(),
        daily.sunrise.len(),
        daily.sunset.len(),
    ];
    if lengths.iter().any(|&l| l != len) {
        return Err(WeatherError::Parse(format!(
            "daily arrays have mismatched lengths: time={} others={:?}",
            len, lengths
        )));
    }

    let mut days = Vec::with_capacity(len);
    for (i, time) in daily.time.iter().enumerate() {
        let date = NaiveDate::parse_from_str(time, "%Y-%m-%d")
            .map_err(|e| WeatherError::Parse(format!("daily date {:?}: {}", time, e)))?;

        let missing = |field: &str| WeatherError::Parse(format!("missing {} for {}", field, date));

        let high = daily.temperature_2m_max[i].ok_or_else(|| missing("temperature_2m_max"))?;
        let low = daily.temperature_2m_min[i].ok_or_else(|| missing("temperature_2m_min"))?;
        let code = daily.weather_code[i].ok_or_else(|| missing("weather_code"))?;

        days.push(DayForecast {
            date,
            high,
            low,
            condition: WeatherCondition::from_wmo_code(code),
            precipitation_chance: daily.precipitation_probability_max[i]
                .map(to_percent)
                .unwrap_or(0),
            sunrise: parse_time_of_day(daily.sunrise[i].as_ref()),
            sunset: parse_time_of_day(daily.sunset[i].as_ref()),
        });
    }

    Ok(days)
}
