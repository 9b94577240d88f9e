//! Hourly outlook selection.

use chrono::Timelike;

use crate::types::{ForecastResult, HourlyForecast};

const OUTLOOK_WINDOW_HOURS: usize = 24;
const OUTLOOK_STEP: usize = 2;

/// Every second hour of today's forecast, starting at the location's current
/// local hour. Falls back to midnight when the local time is unreadable.
pub fn hourly_outlook(result: &ForecastResult) -> Vec<&HourlyForecast> {
    let Some(today) = result.today() else {
        return Vec::new();
    };
    let start = result
        .local_time()
        .map(|t| t.hour() as usize)
        .unwrap_or(0);

    today
        .hour
        .iter()
        .skip(start)
        .take(OUTLOOK_WINDOW_HOURS)
        .step_by(OUTLOOK_STEP)
        .collect()
}
