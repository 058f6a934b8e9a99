//! Weather service for SkyCast
//!
//! Provides weather data via the Open-Meteo API, city search, reverse
//! geocoding, and IP-based location detection.

pub mod types;
pub mod client;
pub mod geocode;
pub mod location;
pub mod provider;

pub use types::*;
pub use client::ClientSettings;
pub use geocode::Geocoder;
pub use location::LocationService;
pub use provider::WeatherProvider;
