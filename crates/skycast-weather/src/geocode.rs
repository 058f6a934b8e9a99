//! Geocoding: city names to coordinates and back.
//!
//! Forward search uses the Open-Meteo geocoding API. Reverse lookup uses
//! Nominatim (OpenStreetMap). Neither requires an API key.

use crate::client::ClientSettings;
use crate::provider::error_for_status;
use crate::types::{Location, WeatherError};
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

pub const OPEN_METEO_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/reverse";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
    country_code: Option<String>,
    admin1: Option<String>,
}

impl SearchResult {
    /// "Springfield, Illinois", falling back to country, then the bare name.
    fn display_name(&self) -> String {
        let suffix = self
            .admin1
            .as_deref()
            .filter(|a| !a.is_empty() && *a != self.name)
            .or_else(|| {
                self.country
                    .as_deref()
                    .filter(|c| !c.is_empty() && *c != self.name)
            });

        match suffix {
            Some(s) => format!("{}, {}", self.name, s),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    state_district: Option<String>,
    state: Option<String>,
    county: Option<String>,
    country: Option<String>,
}

impl NominatimAddress {
    fn place_name(self) -> Option<String> {
        // Captured before the place chain consumes them
        let state = self.state.clone();
        let country = self.country.clone();

        let place = self
            .city
            .or(self.town)
            .or(self.village)
            .or(self.municipality)
            .or(self.state_district)
            .or(self.county)
            .or(self.state)
            .or(self.country)?;

        let suffix = state
            .filter(|s| !s.is_empty() && *s != place)
            .or_else(|| country.filter(|c| !c.is_empty() && *c != place));

        Some(match suffix {
            Some(s) => format!("{}, {}", place, s),
            None => place,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    client: Client,
    search_url: String,
    reverse_url: String,
}

impl Geocoder {
    pub fn new(settings: &ClientSettings) -> Result<Self, WeatherError> {
        Self::with_urls(settings, OPEN_METEO_GEOCODING_URL, NOMINATIM_URL)
    }

    pub fn with_urls(
        settings: &ClientSettings,
        search_url: &str,
        reverse_url: &str,
    ) -> Result<Self, WeatherError> {
        Ok(Self {
            client: settings.build()?,
            search_url: search_url.to_string(),
            reverse_url: reverse_url.to_string(),
        })
    }

    /// Find the best match for a city name.
    #[instrument(skip(self), level = "info")]
    pub async fn search(&self, name: &str) -> Result<Location, WeatherError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WeatherError::InvalidQuery("empty city name".to_string()));
        }

        let response = self
            .client
            .get(&self.search_url)
            .query(&[
                ("name", name),
                ("count", "1"),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(error_for_status(status, &text));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(format!("geocoding response: {}", e)))?;

        let best = body
            .results
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::LocationNotFound(name.to_string()))?;

        tracing::debug!(
            "Geocoded {:?} to {} ({:.4}, {:.4})",
            name,
            best.name,
            best.latitude,
            best.longitude
        );

        let city_name = best.display_name();
        Ok(Location {
            latitude: best.latitude,
            longitude: best.longitude,
            accuracy_meters: None,
            city_name: Some(city_name),
            country_code: best.country_code,
        })
    }

    /// Reverse geocode coordinates to a place name (e.g. "Seattle, Washington").
    /// Returns `None` on failure; the caller can fall back to coordinates.
    #[instrument(skip(self, location), level = "debug")]
    pub async fn reverse(&self, location: &Location) -> Option<String> {
        if location.city_name.is_some() {
            return location.city_name.clone();
        }

        let response = match self
            .client
            .get(&self.reverse_url)
            .query(&[
                ("lat", location.latitude.to_string()),
                ("lon", location.longitude.to_string()),
                ("format", "json".to_string()),
                ("addressdetails", "1".to_string()),
                ("zoom", "10".to_string()),
            ])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Reverse geocode request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Reverse geocode returned status {}", response.status());
            return None;
        }

        let body: NominatimResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!("Reverse geocode parse error: {}", e);
                return None;
            }
        };

        let result = body.address?.place_name()?;
        tracing::info!("Reverse geocoded to: {}", result);
        Some(result)
    }
}
