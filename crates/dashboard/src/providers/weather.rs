use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use wallboard_core::config::WeatherConfig;
use wallboard_core::model::{CurrentConditions, DailyForecast, HourlyForecast, WeatherData};
use wallboard_core::{now_utc, FetchError};

use super::{endpoint, get_json};

const HOURLY_ENTRIES: usize = 8;
const DAILY_ENTRIES: usize = 5;

#[derive(Debug, Deserialize)]
pub struct OwmCurrent {
    pub coord: OwmCoord,
    #[serde(default)]
    pub weather: Vec<OwmCondition>,
    pub main: OwmMain,
    #[serde(default)]
    pub wind: OwmWind,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OwmCoord {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwmCondition {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Deserialize)]
pub struct OwmMain {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OwmWind {
    #[serde(default)]
    pub speed: f64,
}

#[derive(Debug, Deserialize)]
pub struct OwmForecast {
    #[serde(default)]
    pub list: Vec<OwmForecastEntry>,
    #[serde(default)]
    pub city: OwmCity,
}

#[derive(Debug, Default, Deserialize)]
pub struct OwmCity {
    /// Shift from UTC in seconds.
    #[serde(default)]
    pub timezone: i32,
}

#[derive(Debug, Deserialize)]
pub struct OwmForecastEntry {
    /// Unix seconds.
    pub dt: i64,
    pub main: OwmMain,
    #[serde(default)]
    pub weather: Vec<OwmCondition>,
}

fn first_condition(conditions: &[OwmCondition]) -> Result<&OwmCondition, FetchError> {
    conditions
        .first()
        .ok_or_else(|| FetchError::Decode("weather entry without conditions".into()))
}

fn round(v: f64) -> i32 {
    v.round() as i32
}

/// Current conditions, then the 3-hourly forecast for the same coordinates.
pub async fn fetch(client: &Client, cfg: &WeatherConfig) -> Result<WeatherData, FetchError> {
    let api_key = cfg
        .api_key
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or(FetchError::MissingConfig("OpenWeatherMap API key"))?;
    let units = cfg.units.as_str().to_string();

    let url = endpoint(
        &cfg.base_url,
        "weather",
        &[
            ("q", cfg.query()),
            ("appid", api_key.to_string()),
            ("units", units.clone()),
        ],
    )?;
    let current: OwmCurrent = get_json(client, url).await?;

    let url = endpoint(
        &cfg.base_url,
        "forecast",
        &[
            ("lat", current.coord.lat.to_string()),
            ("lon", current.coord.lon.to_string()),
            ("appid", api_key.to_string()),
            ("units", units),
        ],
    )?;
    let forecast: OwmForecast = get_json(client, url).await?;

    build(current, forecast, cfg.label(), now_utc())
}

/// Maps both responses into a [`WeatherData`].
///
/// Daily entries group forecast steps by calendar day in the city's own
/// UTC offset, keeping first-seen order.
pub fn build(
    current: OwmCurrent,
    forecast: OwmForecast,
    location: String,
    fetched_at: DateTime<Utc>,
) -> Result<WeatherData, FetchError> {
    let cond = first_condition(&current.weather)?;
    let current_conditions = CurrentConditions {
        temp: round(current.main.temp),
        feels_like: round(current.main.feels_like.unwrap_or(current.main.temp)),
        humidity: current.main.humidity.unwrap_or_default().clamp(0.0, 100.0) as u8,
        description: cond.description.clone(),
        icon: cond.icon.clone(),
        wind_speed: round(current.wind.speed),
    };

    let mut hourly = Vec::with_capacity(HOURLY_ENTRIES);
    for entry in forecast.list.iter().take(HOURLY_ENTRIES) {
        hourly.push(HourlyForecast {
            time: unix_time(entry.dt)?,
            temp: round(entry.main.temp),
            icon: first_condition(&entry.weather)?.icon.clone(),
        });
    }

    let offset = FixedOffset::east_opt(forecast.city.timezone)
        .ok_or_else(|| FetchError::Decode(format!("bad utc offset {}", forecast.city.timezone)))?;

    struct Day {
        date: NaiveDate,
        temps: Vec<f64>,
        description: String,
        icon: String,
    }
    let mut days: Vec<Day> = Vec::new();
    for entry in &forecast.list {
        let date = unix_time(entry.dt)?.with_timezone(&offset).date_naive();
        match days.iter_mut().find(|d| d.date == date) {
            Some(day) => day.temps.push(entry.main.temp),
            None => {
                let cond = first_condition(&entry.weather)?;
                days.push(Day {
                    date,
                    temps: vec![entry.main.temp],
                    description: cond.description.clone(),
                    icon: cond.icon.clone(),
                });
            }
        }
    }

    let daily = days
        .into_iter()
        .take(DAILY_ENTRIES)
        .map(|d| {
            let high = d.temps.iter().copied().fold(f64::MIN, f64::max);
            let low = d.temps.iter().copied().fold(f64::MAX, f64::min);
            DailyForecast {
                date: d.date,
                high: round(high),
                low: round(low),
                description: d.description,
                icon: d.icon,
            }
        })
        .collect();

    Ok(WeatherData {
        current: current_conditions,
        hourly,
        daily,
        location,
        fetched_at,
    })
}

fn unix_time(secs: i64) -> Result<DateTime<Utc>, FetchError> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| FetchError::Decode(format!("bad timestamp {secs}")))
}
