//! Maps weather crate errors to skycast_core::AppError for consistent user-facing messages.

use skycast_core::{AppError, LocationError, NetworkError, ReqwestErrorExt, WeatherError};
use skycast_weather::{LocationError as ClientLocationError, WeatherError as ClientWeatherError};

pub trait IntoAppError {
    fn into_app_error(self) -> AppError;
}

impl IntoAppError for ClientWeatherError {
    fn into_app_error(self) -> AppError {
        match self {
            ClientWeatherError::Network(e) => AppError::Network(e.into_network_error()),
            ClientWeatherError::InvalidQuery(s) => AppError::Weather(WeatherError::InvalidQuery(s)),
            ClientWeatherError::LocationNotFound(s) => {
                AppError::Weather(WeatherError::LocationNotFound(s))
            }
            ClientWeatherError::Api { status, message } => {
                AppError::Weather(WeatherError::ApiError(format!("{}: {}", status, message)))
            }
            ClientWeatherError::RateLimited => AppError::Weather(WeatherError::RateLimited),
            ClientWeatherError::ServiceUnavailable(_) => {
                AppError::Weather(WeatherError::ServiceUnavailable)
            }
            ClientWeatherError::Parse(s) => AppError::Network(NetworkError::InvalidResponse(s)),
        }
    }
}

impl IntoAppError for ClientLocationError {
    fn into_app_error(self) -> AppError {
        match self {
            ClientLocationError::InvalidCoordinates {
                latitude,
                longitude,
            } => AppError::Location(LocationError::InvalidCoordinates {
                latitude,
                longitude,
            }),
            ClientLocationError::ServiceUnavailable(s) | ClientLocationError::Other(s) => {
                AppError::Location(LocationError::Unavailable(s))
            }
            ClientLocationError::Timeout => AppError::Location(LocationError::Timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_keeps_name() {
        let err = ClientWeatherError::LocationNotFound("Atlantis".into()).into_app_error();
        assert!(matches!(
            err,
            AppError::Weather(WeatherError::LocationNotFound(ref n)) if n == "Atlantis"
        ));
        assert_eq!(err.user_message(), "Location not found. Check and try again.");
    }

    #[test]
    fn location_timeout_keeps_kind() {
        let err = ClientLocationError::Timeout.into_app_error();
        assert!(matches!(err, AppError::Location(LocationError::Timeout)));
    }

    #[test]
    fn parse_failure_is_invalid_response() {
        let err = ClientWeatherError::Parse("bad json".into()).into_app_error();
        assert!(matches!(
            err,
            AppError::Network(NetworkError::InvalidResponse(_))
        ));
    }

    #[test]
    fn api_error_keeps_status() {
        let err = ClientWeatherError::Api {
            status: 400,
            message: "bad latitude".into(),
        }
        .into_app_error();
        assert!(err.to_string().contains("400: bad latitude"));
    }
}
