//! Approximate user location from the public IP address.

use crate::client::ClientSettings;
use crate::types::{Location, LocationError};
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

pub const IP_API_URL: &str = "http://ip-api.com/json/";

/// IP geolocation is city-level at best.
const IP_ACCURACY_METERS: f64 = 5_000.0;

const IP_API_FIELDS: &str = "status,message,lat,lon,city,regionName,countryCode";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
    region_name: Option<String>,
    country_code: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LocationService {
    client: Client,
    url: String,
}

impl LocationService {
    pub fn new(settings: &ClientSettings) -> Result<Self, LocationError> {
        Self::with_url(settings, IP_API_URL)
    }

    pub fn with_url(settings: &ClientSettings, url: &str) -> Result<Self, LocationError> {
        let client = settings
            .build()
            .map_err(|e| LocationError::Other(e.to_string()))?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Where the user appears to be.
    #[instrument(skip(self), level = "info")]
    pub async fn current_location(&self) -> Result<Location, LocationError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("fields", IP_API_FIELDS)])
            .send()
            .await
            .map_err(map_request_error)?;

        if !response.status().is_success() {
            return Err(LocationError::ServiceUnavailable(format!(
                "status {}",
                response.status()
            )));
        }

        let body: IpApiResponse = response
            .json()
            .await
            .map_err(|e| LocationError::Other(format!("Invalid location response: {}", e)))?;

        if body.status != "success" {
            return Err(LocationError::ServiceUnavailable(
                body.message.unwrap_or_else(|| body.status.clone()),
            ));
        }

        let (latitude, longitude) = match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => {
                return Err(LocationError::Other(
                    "Location response missing coordinates".to_string(),
                ))
            }
        };

        let mut location = Location::from_coordinates(latitude, longitude)?;
        location.accuracy_meters = Some(IP_ACCURACY_METERS);
        location.country_code = body.country_code;
        location.city_name = match (body.city, body.region_name) {
            (Some(city), Some(region)) if !region.is_empty() && region != city => {
                Some(format!("{}, {}", city, region))
            }
            (Some(city), _) if !city.is_empty() => Some(city),
            _ => None,
        };

        tracing::info!("Got location: {}, {}", location.latitude, location.longitude);
        Ok(location)
    }
}

fn map_request_error(e: reqwest::Error) -> LocationError {
    if e.is_timeout() {
        LocationError::Timeout
    } else {
        LocationError::ServiceUnavailable(e.to_string())
    }
}
