//! Plain-text rendering of fetch state and history.

use std::io::{self, Write};

use chrono::{DateTime, Local, Utc};
use skycast_weather::{
    hourly_outlook, FetchState, ForecastResult, SearchHistory, TemperatureUnit,
};

const RECOVERY_HINT: &str = "Try :retry, :default for the default city, or :last for your last search.";

pub fn state(
    out: &mut impl Write,
    state: &FetchState,
    unit: TemperatureUnit,
    hint: Option<&str>,
) -> io::Result<()> {
    match state {
        FetchState::Idle => Ok(()),
        FetchState::Loading => writeln!(out, "Loading weather data..."),
        FetchState::Failed(message) => {
            writeln!(out, "Error: {}", message)?;
            if let Some(hint) = hint.filter(|h| *h != message.as_str()) {
                writeln!(out, "  {}", hint)?;
            }
            writeln!(out, "  {}", RECOVERY_HINT)
        }
        FetchState::Succeeded(result) => forecast(out, result, unit),
    }
}

pub fn forecast(out: &mut impl Write, result: &ForecastResult, unit: TemperatureUnit) -> io::Result<()> {
    let current = &result.current;
    let period = if result.is_daytime() { "day" } else { "night" };

    writeln!(out)?;
    writeln!(
        out,
        "{}  (local time {}, {})",
        result.location.display_name(),
        result.location.localtime,
        period
    )?;
    writeln!(
        out,
        "  {}{}  {}, feels like {}",
        unit.format(current.temp_c),
        unit.symbol(),
        current.condition.text,
        unit.format(current.feelslike_c)
    )?;
    writeln!(
        out,
        "  Humidity {}%  Wind {:.0} km/h {}  Pressure {:.0} mb  Visibility {:.0} km  UV {:.0}",
        current.humidity,
        current.wind_kph,
        current.wind_dir,
        current.pressure_mb,
        current.vis_km,
        current.uv
    )?;

    let hours = hourly_outlook(result);
    if !hours.is_empty() {
        let line = hours
            .iter()
            .map(|h| format!("{} {}", h.clock(), unit.format(h.temp_c)))
            .collect::<Vec<_>>()
            .join("  ");
        writeln!(out, "  Next hours: {}", line)?;
    }

    writeln!(out, "  Forecast:")?;
    for day in result.daily() {
        let label = day
            .date()
            .map(|d| d.format("%a %d %b").to_string())
            .unwrap_or_else(|| day.date.clone());
        let summary = &day.day;
        write!(
            out,
            "    {:<10} {:>5} / {:<5} {}",
            label,
            unit.format(summary.maxtemp_c),
            unit.format(summary.mintemp_c),
            summary.condition.text
        )?;
        if summary.daily_chance_of_rain > 0 {
            write!(out, " (rain {}%)", summary.daily_chance_of_rain)?;
        } else if summary.daily_chance_of_snow > 0 {
            write!(out, " (snow {}%)", summary.daily_chance_of_snow)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn history(out: &mut impl Write, history: &SearchHistory, unit: TemperatureUnit) -> io::Result<()> {
    if history.is_empty() {
        return writeln!(out, "No recent searches.");
    }
    for (i, entry) in history.entries().iter().enumerate() {
        writeln!(
            out,
            "{:>2}. {:<20} {:>5}  {}  [id {}]",
            i + 1,
            entry.city,
            unit.format(entry.data.current.temp_c),
            searched_at(entry.timestamp),
            entry.id
        )?;
    }
    Ok(())
}

fn searched_at(timestamp: DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}
