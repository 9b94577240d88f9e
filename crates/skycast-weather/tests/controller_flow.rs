//! End-to-end flow: debounced input -> controller -> provider (wiremock) -> history.

use std::sync::Arc;
use std::time::Duration;

use skycast_weather::storage::load_history;
use skycast_weather::{
    Debouncer, FetchController, FetchState, FetchStatus, FileStore, ProviderSettings,
    RequestOutcome, SearchHistory, WeatherProvider,
};
use tokio::runtime::Handle;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn forecast_json(city: &str) -> serde_json::Value {
    let hours: Vec<_> = (0..24)
        .map(|h| {
            serde_json::json!({
                "time": format!("2024-12-19 {:02}:00", h),
                "temp_c": 20.0 + h as f64 / 4.0,
                "condition": { "text": "Sunny", "code": 1000 }
            })
        })
        .collect();

    serde_json::json!({
        "location": {
            "name": city,
            "region": "",
            "country": "Egypt",
            "lat": 30.05,
            "lon": 31.25,
            "tz_id": "Africa/Cairo",
            "localtime": "2024-12-19 13:00"
        },
        "current": {
            "temp_c": 24.0,
            "feelslike_c": 25.1,
            "is_day": 1,
            "condition": { "text": "Sunny", "code": 1000 },
            "wind_kph": 9.0,
            "pressure_mb": 1018.0,
            "precip_mm": 0.0,
            "humidity": 35,
            "vis_km": 10.0
        },
        "forecast": {
            "forecastday": [{
                "date": "2024-12-19",
                "day": {
                    "maxtemp_c": 25.0,
                    "mintemp_c": 14.0,
                    "condition": { "text": "Sunny", "code": 1000 }
                },
                "hour": hours
            }]
        }
    })
}

fn provider(server: &MockServer) -> Arc<WeatherProvider> {
    Arc::new(
        WeatherProvider::new(ProviderSettings {
            api_key: "test-key".to_string(),
            base_url: server.uri(),
            ..ProviderSettings::default()
        })
        .unwrap(),
    )
}

#[tokio::test]
async fn test_typing_burst_fetches_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .and(query_param("q", "Cairo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_json("Cairo")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (mut controller, mut completions) =
        FetchController::new(provider(&mock_server), SearchHistory::new(), Handle::current());
    let (debouncer, mut searches) =
        Debouncer::spawn(Duration::from_millis(200), &Handle::current());

    for partial in ["C", "Ca", "Cai", "Cair", "Cairo"] {
        debouncer.trigger(partial.to_string());
    }

    let query = searches.recv().await.unwrap();
    assert_eq!(query, "Cairo");
    assert!(matches!(
        controller.request(&query),
        RequestOutcome::Dispatched(_)
    ));

    let message = completions.recv().await.unwrap();
    assert!(controller.apply(message));

    assert_eq!(controller.state().status(), FetchStatus::Succeeded);
    assert_eq!(controller.history().len(), 1);

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(searches.try_recv().is_err());
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_failure_then_restored_history_serves_cache() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path()));

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .and(query_param("q", "Cairo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_json("Cairo")))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .and(query_param("q", "Atlantis"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": { "code": 1006, "message": "No matching location found." }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    {
        let (controller, mut completions) =
            FetchController::new(provider(&mock_server), SearchHistory::new(), Handle::current());
        let mut controller = controller.with_store(store.clone());

        controller.request("Cairo");
        let message = completions.recv().await.unwrap();
        controller.apply(message);

        controller.request("Atlantis");
        let message = completions.recv().await.unwrap();
        controller.apply(message);

        assert_eq!(
            controller.state(),
            &FetchState::Failed("No matching location found.".to_string())
        );
        assert_eq!(controller.history().len(), 1);
    }

    // A fresh session restores the history and answers from it
    let restored = load_history(store.as_ref());
    assert_eq!(restored.len(), 1);

    let (controller, _completions) =
        FetchController::new(provider(&mock_server), restored, Handle::current());
    let mut controller = controller.with_store(store.clone());

    assert_eq!(controller.replay_latest(), RequestOutcome::CacheHit);
    assert_eq!(
        controller.state().forecast().unwrap().location.name,
        "Cairo"
    );
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}
