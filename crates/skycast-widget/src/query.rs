use std::fmt;

use skycast_core::{AppError, WeatherError};

/// What the user asked to see weather for.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    City(String),
    Coordinates { latitude: f64, longitude: f64 },
    CurrentLocation,
}

impl Query {
    /// Interpret a line of user input.
    ///
    /// `@here` (or `here`) asks for the user's own location, `lat,lon` is taken
    /// as coordinates, and anything else is a city name.
    pub fn parse(input: &str) -> Result<Self, AppError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AppError::Weather(WeatherError::InvalidQuery(
                "empty city name".to_string(),
            )));
        }

        if input.eq_ignore_ascii_case("@here") || input.eq_ignore_ascii_case("here") {
            return Ok(Self::CurrentLocation);
        }

        if let Some((lat, lon)) = input.split_once(',') {
            if let (Ok(latitude), Ok(longitude)) =
                (lat.trim().parse::<f64>(), lon.trim().parse::<f64>())
            {
                return Ok(Self::Coordinates {
                    latitude,
                    longitude,
                });
            }
        }

        Ok(Self::City(input.to_string()))
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::City(name) => write!(f, "{}", name),
            Self::Coordinates {
                latitude,
                longitude,
            } => write!(f, "{:.2}, {:.2}", latitude, longitude),
            Self::CurrentLocation => write!(f, "your location"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_is_trimmed() {
        assert_eq!(
            Query::parse("  New York ").unwrap(),
            Query::City("New York".to_string())
        );
    }

    #[test]
    fn city_with_region_is_not_coordinates() {
        assert_eq!(
            Query::parse("Paris, France").unwrap(),
            Query::City("Paris, France".to_string())
        );
    }

    #[test]
    fn coordinates_parse() {
        assert_eq!(
            Query::parse("47.61, -122.33").unwrap(),
            Query::Coordinates {
                latitude: 47.61,
                longitude: -122.33
            }
        );
    }

    #[test]
    fn here_is_current_location() {
        assert_eq!(Query::parse("@here").unwrap(), Query::CurrentLocation);
        assert_eq!(Query::parse("HERE").unwrap(), Query::CurrentLocation);
    }

    #[test]
    fn blank_input_is_rejected() {
        let err = Query::parse("   ").unwrap_err();
        assert_eq!(err.user_message(), "Please enter a city name.");
    }

    #[test]
    fn display_for_loading_text() {
        assert_eq!(Query::City("Oslo".into()).to_string(), "Oslo");
        assert_eq!(
            Query::Coordinates {
                latitude: 1.234,
                longitude: 5.678
            }
            .to_string(),
            "1.23, 5.68"
        );
        assert_eq!(Query::CurrentLocation.to_string(), "your location");
    }
}
