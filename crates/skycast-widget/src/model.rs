use skycast_core::AppError;
use skycast_weather::{DayForecast, WeatherData};

use crate::query::Query;

/// What the widget is showing right now. Exactly one at a time.
#[derive(Debug, Clone, Default)]
pub enum WidgetState {
    #[default]
    Idle,
    Loading(Query),
    Error(String),
    Ready(WeatherData),
}

#[derive(Debug, Default)]
pub struct WeatherModel {
    state: WidgetState,
}

impl WeatherModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    /// Start a lookup. Whatever was on screen before is dropped.
    pub fn begin(&mut self, query: Query) {
        tracing::debug!("Loading weather for {}", query);
        self.state = WidgetState::Loading(query);
    }

    /// Apply the outcome of the lookup started by `begin`.
    pub fn finish(&mut self, result: Result<WeatherData, AppError>) {
        if !self.is_loading() {
            tracing::debug!("Lookup finished while not loading");
        }

        match result {
            Ok(data) => {
                tracing::info!("Weather ready for {}", data.location.display_name());
                self.state = WidgetState::Ready(data);
            }
            Err(e) => self.fail(&e),
        }
    }

    /// Show an error without a lookup, e.g. for input that never parsed.
    pub fn fail(&mut self, error: &AppError) {
        tracing::error!("Weather lookup failed: {}", error);
        self.state = WidgetState::Error(error.user_message().to_string());
    }

    pub fn reset(&mut self) {
        self.state = WidgetState::Idle;
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, WidgetState::Loading(_))
    }

    pub fn has_data(&self) -> bool {
        matches!(self.state, WidgetState::Ready(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            WidgetState::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn data(&self) -> Option<&WeatherData> {
        match &self.state {
            WidgetState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn forecast_count(&self) -> usize {
        self.data().map(|d| d.forecast.len()).unwrap_or(0)
    }

    pub fn forecast_day(&self, index: usize) -> Option<&DayForecast> {
        self.data().and_then(|d| d.forecast.get(index))
    }
}
