//! weatherapi.com forecast client.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::types::{ForecastResult, WeatherError};

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";
const USER_AGENT: &str = "SkyCast/0.1.0";

/// Anything that can produce a forecast for a free-text city query.
///
/// The controller only depends on this contract, so tests can substitute a
/// scripted source for the HTTP client.
pub trait ForecastSource: Send + Sync + 'static {
    fn fetch_forecast(
        &self,
        city: &str,
    ) -> impl Future<Output = Result<ForecastResult, WeatherError>> + Send;
}

#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub api_key: String,
    pub base_url: String,
    pub forecast_days: u8,
    pub timeout: Duration,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            forecast_days: 5,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Error envelope the provider sends with non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    settings: ProviderSettings,
}

impl WeatherProvider {
    pub fn new(settings: ProviderSettings) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            settings,
        })
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    fn forecast_url(&self) -> String {
        format!(
            "{}/forecast.json",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    /// Fetch the multi-day forecast for `city`.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch(&self, city: &str) -> Result<ForecastResult, WeatherError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::InvalidQuery);
        }

        let days = self.settings.forecast_days.to_string();
        let response = self
            .client
            .get(self.forecast_url())
            .query(&[
                ("key", self.settings.api_key.as_str()),
                ("q", city),
                ("days", days.as_str()),
                ("aqi", "no"),
                ("alerts", "no"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = error_from_body(status.as_u16(), &body);
            tracing::warn!("Forecast request for {:?} failed: {}", city, err);
            return Err(err);
        }

        let result: ForecastResult =
            serde_json::from_str(&body).map_err(|e| WeatherError::Parse(e.to_string()))?;
        result.validate()?;

        tracing::info!(
            "Fetched {}-day forecast for {}",
            result.forecast.days.len(),
            result.location.display_name()
        );
        Ok(result)
    }
}

impl ForecastSource for WeatherProvider {
    async fn fetch_forecast(&self, city: &str) -> Result<ForecastResult, WeatherError> {
        self.fetch(city).await
    }
}

fn error_from_body(status: u16, body: &str) -> WeatherError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.trim().is_empty() => WeatherError::Provider {
            status,
            code: envelope.error.code,
            message: envelope.error.message,
        },
        _ => WeatherError::Status(status),
    }
}
