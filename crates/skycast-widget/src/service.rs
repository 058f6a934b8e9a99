//! Weather lookup: resolve where, then fetch what.

use std::time::Duration;

use skycast_core::{AppError, Config};
use skycast_weather::{
    ClientSettings, Geocoder, Location, LocationService, TemperatureUnit, WeatherData,
    WeatherProvider,
};

use crate::error_mapping::IntoAppError;
use crate::query::Query;

pub struct WeatherService {
    geocoder: Geocoder,
    locator: LocationService,
    provider: WeatherProvider,
}

impl WeatherService {
    pub fn new(geocoder: Geocoder, locator: LocationService, provider: WeatherProvider) -> Self {
        Self {
            geocoder,
            locator,
            provider,
        }
    }

    /// Build every client from the `[api]` and `[weather]` config sections.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let settings = ClientSettings {
            timeout: Duration::from_secs(config.api.request_timeout_secs),
            user_agent: config.api.user_agent.clone(),
        };

        let geocoder = Geocoder::with_urls(
            &settings,
            &config.api.geocoding_url,
            &config.api.reverse_geocoding_url,
        )
        .map_err(IntoAppError::into_app_error)?;

        let locator = LocationService::with_url(&settings, &config.api.ip_location_url)
            .map_err(IntoAppError::into_app_error)?;

        let mut provider = WeatherProvider::with_base_url(
            &settings,
            &config.api.forecast_url,
            unit_from_config(config.weather.temperature_unit),
        )
        .map_err(IntoAppError::into_app_error)?;
        provider.set_forecast_days(config.weather.forecast_days);

        Ok(Self::new(geocoder, locator, provider))
    }

    pub fn provider(&self) -> &WeatherProvider {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut WeatherProvider {
        &mut self.provider
    }

    /// Turn a query into a named location.
    pub async fn resolve_location(&self, query: &Query) -> Result<Location, AppError> {
        match query {
            Query::City(name) => self
                .geocoder
                .search(name)
                .await
                .map_err(IntoAppError::into_app_error),
            Query::Coordinates {
                latitude,
                longitude,
            } => {
                let mut location = Location::from_coordinates(*latitude, *longitude)
                    .map_err(IntoAppError::into_app_error)?;
                location.city_name = self.geocoder.reverse(&location).await;
                if location.city_name.is_none() {
                    tracing::debug!("No place name for {}, showing coordinates", query);
                }
                Ok(location)
            }
            Query::CurrentLocation => self
                .locator
                .current_location()
                .await
                .map_err(IntoAppError::into_app_error),
        }
    }

    /// Resolve the location, then fetch current conditions and the forecast.
    pub async fn lookup(&self, query: &Query) -> Result<WeatherData, AppError> {
        tracing::info!("Looking up weather for {}", query);

        let location = self.resolve_location(query).await?;
        self.provider
            .fetch(&location)
            .await
            .map_err(IntoAppError::into_app_error)
    }
}

/// Config and weather crates each carry their own unit enum.
pub fn unit_from_config(unit: skycast_core::TemperatureUnit) -> TemperatureUnit {
    match unit {
        skycast_core::TemperatureUnit::Auto => TemperatureUnit::Auto,
        skycast_core::TemperatureUnit::Celsius => TemperatureUnit::Celsius,
        skycast_core::TemperatureUnit::Fahrenheit => TemperatureUnit::Fahrenheit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skycast_core::LocationError;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> Config {
        let mut config = Config::default();
        config.api.forecast_url = format!("{}/v1/forecast", server.uri());
        config.api.geocoding_url = format!("{}/v1/search", server.uri());
        config.api.reverse_geocoding_url = format!("{}/reverse", server.uri());
        config.api.ip_location_url = format!("{}/json/", server.uri());
        config
    }

    #[test]
    fn config_units_map_one_to_one() {
        assert_eq!(
            unit_from_config(skycast_core::TemperatureUnit::Fahrenheit),
            TemperatureUnit::Fahrenheit
        );
        assert_eq!(
            unit_from_config(skycast_core::TemperatureUnit::Auto),
            TemperatureUnit::Auto
        );
    }

    #[tokio::test]
    async fn from_config_applies_weather_section() {
        let server = MockServer::start().await;
        let mut config = config_for(&server);
        config.weather.forecast_days = 5;
        config.weather.temperature_unit = skycast_core::TemperatureUnit::Celsius;

        let service = WeatherService::from_config(&config).unwrap();
        assert_eq!(service.provider().forecast_days(), 5);
        assert_eq!(service.provider().unit(), TemperatureUnit::Celsius);
    }

    #[tokio::test]
    async fn out_of_range_coordinates_fail_without_requests() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let service = WeatherService::from_config(&config_for(&server)).unwrap();
        let err = service
            .lookup(&Query::Coordinates {
                latitude: 123.0,
                longitude: 0.0,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Location(LocationError::InvalidCoordinates { .. })
        ));
    }
}
