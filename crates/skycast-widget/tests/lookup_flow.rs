//! End-to-end lookups against mock geocoding, location, and weather APIs.

use skycast_core::Config;
use skycast_widget::session::{self, OutputFormat, Rendered};
use skycast_widget::{Query, WeatherModel, WeatherService, WidgetState};
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.api.forecast_url = format!("{}/v1/forecast", server.uri());
    config.api.geocoding_url = format!("{}/v1/search", server.uri());
    config.api.reverse_geocoding_url = format!("{}/reverse", server.uri());
    config.api.ip_location_url = format!("{}/json/", server.uri());
    config
}

async fn mount_weather(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param_is_missing("daily"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "current": {
                "time": "2026-10-18T14:15",
                "temperature_2m": 12.6,
                "relative_humidity_2m": 71,
                "apparent_temperature": 10.9,
                "weather_code": 3,
                "wind_speed_10m": 14.4
            }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("forecast_days", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "daily": {
                "time": ["2026-10-18", "2026-10-19", "2026-10-20"],
                "weather_code": [3, 61, 0],
                "temperature_2m_max": [14.2, 11.0, 16.5],
                "temperature_2m_min": [7.1, 5.4, 6.0],
                "precipitation_probability_max": [10, 85, 0],
                "sunrise": ["2026-10-18T07:31", "2026-10-19T07:33", "2026-10-20T07:35"],
                "sunset": ["2026-10-18T18:12", "2026-10-19T18:10", "2026-10-20T18:08"]
            }
        })))
        .mount(server)
        .await;
}

async fn mount_geocoding(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Berlin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{
                "name": "Berlin",
                "latitude": 52.52437,
                "longitude": 13.41053,
                "country": "Germany",
                "country_code": "DE",
                "admin1": "Land Berlin"
            }]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Atlantis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn city_lookup_renders_current_and_three_days() {
    let server = MockServer::start().await;
    mount_geocoding(&server).await;
    mount_weather(&server).await;

    let service = WeatherService::from_config(&config_for(&server)).unwrap();
    let mut model = WeatherModel::new();
    let mut emitted = Vec::new();

    let ok = session::lookup_once(
        &service,
        &mut model,
        Query::City("Berlin".into()),
        OutputFormat::Text,
        |r| {
            emitted.push(r);
            Ok(())
        },
    )
    .await
    .unwrap();

    assert!(ok);
    assert_eq!(model.forecast_count(), 3);
    assert_eq!(emitted.len(), 2);
    assert_eq!(
        emitted[0],
        Rendered::Status("Loading weather for Berlin...\n".into())
    );
    match &emitted[1] {
        Rendered::Data(text) => {
            assert!(text.starts_with("Berlin, Land Berlin"));
            assert!(text.contains("Cloudy  13°C"));
            assert!(text.contains("3-day forecast"));
        }
        other => panic!("expected data, got {:?}", other),
    }
}

#[tokio::test]
async fn unknown_city_shows_error() {
    let server = MockServer::start().await;
    mount_geocoding(&server).await;

    let service = WeatherService::from_config(&config_for(&server)).unwrap();
    let mut model = WeatherModel::new();

    let ok = session::lookup_once(
        &service,
        &mut model,
        Query::City("Atlantis".into()),
        OutputFormat::Json,
        |_| Ok(()),
    )
    .await
    .unwrap();

    assert!(!ok);
    assert_eq!(
        model.error_message(),
        Some("Location not found. Check and try again.")
    );
}

#[tokio::test]
async fn current_location_uses_ip_lookup_and_auto_units() {
    let server = MockServer::start().await;
    mount_weather(&server).await;

    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success",
            "lat": 40.7128,
            "lon": -74.006,
            "city": "New York",
            "regionName": "New York",
            "countryCode": "US"
        })))
        .mount(&server)
        .await;

    let service = WeatherService::from_config(&config_for(&server)).unwrap();
    let data = service.lookup(&Query::CurrentLocation).await.unwrap();

    assert_eq!(data.location.city_name.as_deref(), Some("New York"));
    assert_eq!(data.unit, skycast_weather::TemperatureUnit::Fahrenheit);
}

#[tokio::test]
async fn coordinates_are_reverse_geocoded() {
    let server = MockServer::start().await;
    mount_weather(&server).await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "address": { "city": "Berlin", "country": "Germany" }
        })))
        .mount(&server)
        .await;

    let service = WeatherService::from_config(&config_for(&server)).unwrap();
    let data = service
        .lookup(&Query::Coordinates {
            latitude: 52.52,
            longitude: 13.41,
        })
        .await
        .unwrap();

    assert_eq!(data.location.city_name.as_deref(), Some("Berlin, Germany"));
    assert_eq!(data.forecast.len(), 3);
}

#[tokio::test]
async fn interactive_session_handles_errors_and_quits() {
    let server = MockServer::start().await;
    mount_geocoding(&server).await;
    mount_weather(&server).await;

    let service = WeatherService::from_config(&config_for(&server)).unwrap();
    let input: &[u8] = b"\nAtlantis\nBerlin\nquit\nParis\n";
    let mut out = Vec::new();

    session::run_interactive(&service, input, &mut out, OutputFormat::Text)
        .await
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Error: Please enter a city name."));
    assert!(text.contains("Error: Location not found. Check and try again."));
    assert!(text.contains("Loading weather for Berlin..."));
    assert!(text.contains("Berlin, Land Berlin"));
    assert!(!text.contains("Paris"));
}

#[tokio::test]
async fn interactive_session_ends_at_eof() {
    let server = MockServer::start().await;
    let service = WeatherService::from_config(&config_for(&server)).unwrap();
    let input: &[u8] = b"";
    let mut out = Vec::new();

    session::run_interactive(&service, input, &mut out, OutputFormat::Text)
        .await
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with(skycast_widget::render::IDLE_TEXT));
    assert!(text.contains(session::PROMPT));
    assert!(matches!(WeatherModel::new().state(), WidgetState::Idle));
}

#[tokio::test]
async fn geocoding_outages_show_specific_messages() {
    for (status, expected) in [
        (429, "Too many requests. Please wait a moment and try again."),
        (503, "Weather service unavailable. Please try again later."),
    ] {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let service = WeatherService::from_config(&config_for(&server)).unwrap();
        let err = service
            .lookup(&Query::City("Paris".into()))
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), expected, "status {}", status);
    }
}
