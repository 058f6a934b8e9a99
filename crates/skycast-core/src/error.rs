//! Centralized error types for SkyCast.
//!
//! This module provides a typed error hierarchy that:
//! - Enables precise error handling in the widget
//! - Provides user-friendly messages suitable for display
//! - Preserves full error context for logging

use thiserror::Error;

/// Top-level application error type.
///
/// Every failure a lookup can produce converts into this type.
/// Use `user_message()` to get a display-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),

    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the widget.
    ///
    /// These messages are designed to be actionable and non-technical.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Weather(e) => e.user_message(),
            AppError::Location(e) => e.user_message(),
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }
}

/// Weather lookup errors.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Weather API error: {0}")]
    ApiError(String),

    #[error("Rate limited by weather service")]
    RateLimited,

    #[error("Service unavailable")]
    ServiceUnavailable,
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::LocationNotFound(_) => "Location not found. Check and try again.",
            WeatherError::InvalidQuery(_) => "Please enter a city name.",
            WeatherError::ApiError(_) => "Weather service error. Please try again.",
            WeatherError::RateLimited => "Too many requests. Please wait a moment and try again.",
            WeatherError::ServiceUnavailable => {
                "Weather service unavailable. Please try again later."
            }
        }
    }
}

/// Errors determining where the user is.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("Coordinates out of range: {latitude}, {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    #[error("Location service unavailable: {0}")]
    Unavailable(String),

    #[error("Location request timed out")]
    Timeout,
}

impl LocationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            LocationError::InvalidCoordinates { .. } => {
                "Coordinates are out of range. Latitude must be within ±90 and longitude within ±180."
            }
            LocationError::Unavailable(_) => {
                "Could not determine your location. Try searching for a city instead."
            }
            LocationError::Timeout => "Finding your location took too long. Please try again.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_non_empty() {
        let errors = vec![
            AppError::Network(NetworkError::Timeout),
            AppError::Network(NetworkError::InvalidResponse("test".into())),
            AppError::Weather(WeatherError::ServiceUnavailable),
            AppError::Location(LocationError::Timeout),
            AppError::Other(anyhow::anyhow!("boom")),
        ];

        for err in errors {
            assert!(!err.user_message().is_empty(), "empty message for {:?}", err);
        }
    }

    #[test]
    fn test_app_error_conversion() {
        let weather_err = WeatherError::LocationNotFound("Atlantis".into());
        let app_err: AppError = weather_err.into();
        assert!(matches!(
            app_err,
            AppError::Weather(WeatherError::LocationNotFound(_))
        ));
    }

    #[test]
    fn test_user_message_propagation() {
        let app_err = AppError::Weather(WeatherError::LocationNotFound("Atlantis".into()));
        assert_eq!(
            app_err.user_message(),
            "Location not found. Check and try again."
        );
    }

    #[test]
    fn test_display_keeps_detail() {
        let err = AppError::Location(LocationError::InvalidCoordinates {
            latitude: 91.0,
            longitude: 0.0,
        });
        assert!(err.to_string().contains("91"));
    }
}
