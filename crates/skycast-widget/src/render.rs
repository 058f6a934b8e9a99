//! Text rendering for each widget state.
//!
//! Values are rounded here and only here; the model keeps full precision.

use std::fmt::Write;

use skycast_weather::{DayForecast, TemperatureUnit, WeatherCondition, WeatherData};

use crate::model::WidgetState;

pub const IDLE_TEXT: &str = "Enter a city name, \"lat,lon\", or @here for your location.";

pub fn render(state: &WidgetState) -> String {
    match state {
        WidgetState::Idle => IDLE_TEXT.to_string(),
        WidgetState::Loading(query) => format!("Loading weather for {}...", query),
        WidgetState::Error(message) => format!("Error: {}", message),
        WidgetState::Ready(data) => render_weather(data),
    }
}

/// Nearest whole number. `-0.4` shows as `0`, never `-0`.
pub fn round_display(value: f64) -> i64 {
    value.round() as i64
}

pub fn format_temperature(value: f64, unit: TemperatureUnit) -> String {
    format!("{}{}", round_display(value), unit.symbol())
}

pub fn glyph(condition: WeatherCondition) -> &'static str {
    match condition.icon_name() {
        "sun" => "☀",
        "cloud_sun" => "⛅",
        "cloud" => "☁",
        "cloud_fog" => "≋",
        "cloud_rain" => "☂",
        "cloud_snow" => "❄",
        "cloud_lightning" => "⚡",
        _ => "?",
    }
}

pub fn render_weather(data: &WeatherData) -> String {
    let unit = data.unit;
    let current = &data.current;
    let mut out = String::new();

    let _ = writeln!(out, "{}", data.location.display_name());
    let _ = writeln!(
        out,
        "{}  {}  {}",
        glyph(current.condition),
        current.condition.description(),
        format_temperature(current.temperature, unit)
    );
    let _ = writeln!(
        out,
        "Feels like {} · Humidity {}% · Wind {} {}",
        format_temperature(current.feels_like, unit),
        current.humidity,
        round_display(current.wind_speed),
        unit.wind_speed_label()
    );
    let _ = writeln!(out, "Observed {} local time", current.observed_at.format("%H:%M"));

    if !data.forecast.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}-day forecast", data.forecast.len());
        for (i, day) in data.forecast.iter().enumerate() {
            let _ = writeln!(out, "{}", render_day(i, day, unit));
        }
    }

    out
}

fn render_day(index: usize, day: &DayForecast, unit: TemperatureUnit) -> String {
    let label = if index == 0 {
        "Today".to_string()
    } else {
        day.date.format("%a %b %d").to_string()
    };

    let mut line = format!(
        "{:<10}  {}  {:<13}  {:>5} / {:<5}  {:>3}%",
        label,
        glyph(day.condition),
        day.condition.description(),
        format_temperature(day.high, unit),
        format_temperature(day.low, unit),
        day.precipitation_chance
    );

    // Polar day/night has no sunrise or sunset
    if let Some(rise) = day.sunrise {
        let _ = write!(line, "  ↑{}", rise.format("%H:%M"));
    }
    if let Some(set) = day.sunset {
        let _ = write!(line, " ↓{}", set.format("%H:%M"));
    }

    line
}

pub fn to_json(data: &WeatherData) -> serde_json::Result<String> {
    serde_json::to_string_pretty(data)
}
