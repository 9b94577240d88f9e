use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Message shown when the provider gives no usable error text.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to fetch weather data";

const LOCAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Temperature unit preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Storage representation (`"celsius"` / `"fahrenheit"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Celsius => "celsius",
            Self::Fahrenheit => "fahrenheit",
        }
    }

    /// Parse the storage representation; anything else is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "celsius" => Some(Self::Celsius),
            "fahrenheit" => Some(Self::Fahrenheit),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Self::Celsius => Self::Fahrenheit,
            Self::Fahrenheit => Self::Celsius,
        }
    }

    /// Convert a Celsius reading into this unit.
    pub fn convert(&self, celsius: f64) -> f64 {
        match self {
            Self::Celsius => celsius,
            Self::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        }
    }

    /// Rounded display form, e.g. `"21°"`.
    pub fn format(&self, celsius: f64) -> String {
        format!("{}°", self.convert(celsius).round() as i64)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Celsius => "C",
            Self::Fahrenheit => "F",
        }
    }
}

/// Complete forecast payload for one city query, as returned by the provider.
///
/// Field names follow the provider's JSON so a cached copy serializes back into
/// the same shape it was fetched in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub location: Location,
    pub current: CurrentConditions,
    pub forecast: Forecast,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub tz_id: String,
    /// Local wall-clock time at the location, `YYYY-MM-DD H:MM`
    pub localtime: String,
}

impl Location {
    /// "Name, Region" or "Name, Country", skipping empty or repeated parts.
    pub fn display_name(&self) -> String {
        let suffix = [&self.region, &self.country]
            .into_iter()
            .find(|s| !s.is_empty() && **s != self.name);

        match suffix {
            Some(s) => format!("{}, {}", self.name, s),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub code: i32,
}

/// Current conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    #[serde(default)]
    pub last_updated: String,
    pub temp_c: f64,
    pub feelslike_c: f64,
    #[serde(default)]
    pub is_day: u8,
    pub condition: Condition,
    pub wind_kph: f64,
    #[serde(default)]
    pub wind_dir: String,
    pub pressure_mb: f64,
    pub precip_mm: f64,
    pub humidity: u8,
    #[serde(default)]
    pub cloud: u8,
    pub vis_km: f64,
    #[serde(default)]
    pub uv: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    #[serde(rename = "forecastday")]
    pub days: Vec<ForecastDay>,
}

/// Daily forecast entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// `YYYY-MM-DD`
    pub date: String,
    pub day: DaySummary,
    #[serde(default)]
    pub astro: Option<Astro>,
    #[serde(default)]
    pub hour: Vec<HourlyForecast>,
}

impl ForecastDay {
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, DATE_FORMAT).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub maxtemp_c: f64,
    pub mintemp_c: f64,
    #[serde(default)]
    pub avgtemp_c: f64,
    #[serde(default)]
    pub maxwind_kph: f64,
    #[serde(default)]
    pub totalprecip_mm: f64,
    #[serde(default)]
    pub avghumidity: f64,
    #[serde(default)]
    pub daily_chance_of_rain: u8,
    #[serde(default)]
    pub daily_chance_of_snow: u8,
    pub condition: Condition,
    #[serde(default)]
    pub uv: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Astro {
    pub sunrise: String,
    pub sunset: String,
}

/// Hourly forecast entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    /// `YYYY-MM-DD HH:MM`
    pub time: String,
    pub temp_c: f64,
    #[serde(default)]
    pub feelslike_c: f64,
    #[serde(default)]
    pub is_day: u8,
    pub condition: Condition,
    #[serde(default)]
    pub wind_kph: f64,
    #[serde(default)]
    pub humidity: u8,
    #[serde(default)]
    pub precip_mm: f64,
    #[serde(default)]
    pub chance_of_rain: u8,
    #[serde(default)]
    pub chance_of_snow: u8,
}

impl HourlyForecast {
    pub fn local_time(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.time, LOCAL_TIME_FORMAT).ok()
    }

    /// `HH:MM` part of the timestamp, or the raw string if it doesn't parse.
    pub fn clock(&self) -> String {
        self.local_time()
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_else(|| self.time.clone())
    }
}

impl ForecastResult {
    /// Reject payloads that deserialized but can't be rendered.
    pub fn validate(&self) -> Result<(), WeatherError> {
        if self.location.name.trim().is_empty() {
            return Err(WeatherError::Parse("location name is empty".into()));
        }
        if self.forecast.days.is_empty() {
            return Err(WeatherError::Parse("forecast contains no days".into()));
        }
        if self.local_time().is_none() {
            return Err(WeatherError::Parse(format!(
                "unrecognized local time: {:?}",
                self.location.localtime
            )));
        }
        Ok(())
    }

    pub fn local_time(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.location.localtime, LOCAL_TIME_FORMAT).ok()
    }

    /// Daytime is 06:00 up to (not including) 18:00 local time. Falls back to the
    /// provider's `is_day` flag when the local time can't be read.
    pub fn is_daytime(&self) -> bool {
        match self.local_time() {
            Some(t) => (6..18).contains(&t.hour()),
            None => self.current.is_day == 1,
        }
    }

    pub fn today(&self) -> Option<&ForecastDay> {
        self.forecast.days.first()
    }

    pub fn daily(&self) -> &[ForecastDay] {
        &self.forecast.days
    }
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Provider error ({status}): {message}")]
    Provider {
        status: u16,
        code: Option<i64>,
        message: String,
    },
    #[error("Unexpected HTTP status {0}")]
    Status(u16),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("City query must not be empty")]
    InvalidQuery,
}

impl WeatherError {
    /// Text for the `Failed` state: the provider's own message when it sent one,
    /// otherwise the generic message.
    pub fn failure_message(&self) -> String {
        match self {
            Self::Provider { message, .. } if !message.trim().is_empty() => message.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Local persistence errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}
