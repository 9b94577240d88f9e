//! Integration tests for WeatherProvider using wiremock.

use std::time::Duration;

use skycast_weather::{ProviderSettings, WeatherError, WeatherProvider, GENERIC_FAILURE_MESSAGE};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn hour_json(date: &str, h: u32, temp: f64) -> serde_json::Value {
    serde_json::json!({
        "time": format!("{} {:02}:00", date, h),
        "temp_c": temp,
        "feelslike_c": temp - 1.0,
        "is_day": if (6..18).contains(&h) { 1 } else { 0 },
        "condition": { "text": "Clear", "icon": "//cdn.weatherapi.com/weather/64x64/night/113.png", "code": 1000 },
        "wind_kph": 7.2,
        "humidity": 70,
        "precip_mm": 0.0,
        "chance_of_rain": 0,
        "chance_of_snow": 0
    })
}

fn day_json(date: &str, high: f64, low: f64) -> serde_json::Value {
    serde_json::json!({
        "date": date,
        "day": {
            "maxtemp_c": high,
            "mintemp_c": low,
            "avgtemp_c": (high + low) / 2.0,
            "maxwind_kph": 14.0,
            "totalprecip_mm": 0.3,
            "avghumidity": 71.0,
            "daily_chance_of_rain": 40,
            "daily_chance_of_snow": 0,
            "condition": { "text": "Patchy rain nearby", "icon": "//cdn.weatherapi.com/weather/64x64/day/176.png", "code": 1063 },
            "uv": 1.0
        },
        "astro": { "sunrise": "08:40 AM", "sunset": "04:56 PM" },
        "hour": (0..24).map(|h| hour_json(date, h, low + h as f64 / 3.0)).collect::<Vec<_>>()
    })
}

/// A realistic `forecast.json` body, including fields the client ignores.
fn forecast_json(city: &str) -> serde_json::Value {
    serde_json::json!({
        "location": {
            "name": city,
            "region": "Ile-de-France",
            "country": "France",
            "lat": 48.87,
            "lon": 2.33,
            "tz_id": "Europe/Paris",
            "localtime_epoch": 1734600600,
            "localtime": "2024-12-19 9:30"
        },
        "current": {
            "last_updated_epoch": 1734600300,
            "last_updated": "2024-12-19 09:25",
            "temp_c": 6.2,
            "temp_f": 43.2,
            "is_day": 1,
            "condition": { "text": "Overcast", "icon": "//cdn.weatherapi.com/weather/64x64/day/122.png", "code": 1009 },
            "wind_kph": 16.9,
            "wind_dir": "SW",
            "pressure_mb": 1021.0,
            "precip_mm": 0.0,
            "humidity": 87,
            "cloud": 100,
            "feelslike_c": 3.1,
            "vis_km": 10.0,
            "uv": 0.2
        },
        "forecast": {
            "forecastday": [
                day_json("2024-12-19", 8.0, 4.0),
                day_json("2024-12-20", 9.0, 5.0),
                day_json("2024-12-21", 7.0, 2.0),
                day_json("2024-12-22", 6.0, 1.0),
                day_json("2024-12-23", 5.0, 0.0)
            ]
        }
    })
}

fn provider(server: &MockServer) -> WeatherProvider {
    WeatherProvider::new(ProviderSettings {
        api_key: "test-key".to_string(),
        base_url: server.uri(),
        forecast_days: 5,
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

#[tokio::test]
async fn test_fetch_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .and(query_param("key", "test-key"))
        .and(query_param("q", "Paris"))
        .and(query_param("days", "5"))
        .and(query_param("aqi", "no"))
        .and(query_param("alerts", "no"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_json("Paris")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = provider(&mock_server).fetch("Paris").await.unwrap();

    assert_eq!(result.location.name, "Paris");
    assert_eq!(result.location.display_name(), "Paris, Ile-de-France");
    assert_eq!(result.current.condition.text, "Overcast");
    assert_eq!(result.current.humidity, 87);
    assert_eq!(result.daily().len(), 5);
    assert_eq!(result.today().unwrap().hour.len(), 24);
    assert!(result.is_daytime());
}

#[tokio::test]
async fn test_fetch_trims_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .and(query_param("q", "New York"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_json("New York")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = provider(&mock_server).fetch("  New York ").await.unwrap();
    assert_eq!(result.location.name, "New York");
}

#[tokio::test]
async fn test_provider_error_message_is_surfaced() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": { "code": 1006, "message": "No matching location found." }
        })))
        .mount(&mock_server)
        .await;

    let err = provider(&mock_server).fetch("Atlantis").await.unwrap_err();

    assert!(matches!(
        err,
        WeatherError::Provider {
            status: 400,
            code: Some(1006),
            ..
        }
    ));
    assert_eq!(err.failure_message(), "No matching location found.");
}

#[tokio::test]
async fn test_invalid_key_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": { "code": 2006, "message": "API key is invalid." }
        })))
        .mount(&mock_server)
        .await;

    let err = provider(&mock_server).fetch("Paris").await.unwrap_err();
    assert_eq!(err.failure_message(), "API key is invalid.");
}

#[tokio::test]
async fn test_server_error_without_envelope_uses_generic_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let err = provider(&mock_server).fetch("Paris").await.unwrap_err();

    assert!(matches!(err, WeatherError::Status(500)));
    assert_eq!(err.failure_message(), GENERIC_FAILURE_MESSAGE);
}

#[tokio::test]
async fn test_schema_mismatch_is_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "location": { "name": "Paris" }
        })))
        .mount(&mock_server)
        .await;

    let err = provider(&mock_server).fetch("Paris").await.unwrap_err();

    assert!(matches!(err, WeatherError::Parse(_)));
    assert_eq!(err.failure_message(), GENERIC_FAILURE_MESSAGE);
}

#[tokio::test]
async fn test_empty_forecast_is_rejected() {
    let mock_server = MockServer::start().await;

    let mut body = forecast_json("Paris");
    body["forecast"]["forecastday"] = serde_json::json!([]);
    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&mock_server)
        .await;

    let err = provider(&mock_server).fetch("Paris").await.unwrap_err();
    assert!(matches!(err, WeatherError::Parse(_)));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(forecast_json("Paris"))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let provider = WeatherProvider::new(ProviderSettings {
        api_key: "test-key".to_string(),
        base_url: mock_server.uri(),
        forecast_days: 5,
        timeout: Duration::from_millis(50),
    })
    .unwrap();

    let err = provider.fetch("Paris").await.unwrap_err();
    match err {
        WeatherError::Network(e) => assert!(e.is_timeout()),
        other => panic!("expected timeout, got {:?}", other),
    }
}
