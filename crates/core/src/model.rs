//! Display models produced by provider adapters.
//!
//! Field names serialize in camelCase. [`NetworkBandwidthData`] doubles as
//! the response body of the bandwidth service.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Current conditions plus short-range forecast for one location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherData {
    pub current: CurrentConditions,
    pub hourly: Vec<HourlyForecast>,
    pub daily: Vec<DailyForecast>,
    /// Display label, e.g. "Scottsdale, AZ".
    pub location: String,
    pub fetched_at: DateTime<Utc>,
}

/// Conditions right now. Temperatures and wind speed are rounded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    pub temp: i32,
    pub feels_like: i32,
    /// Relative humidity in percent.
    pub humidity: u8,
    pub description: String,
    /// Provider icon code.
    pub icon: String,
    pub wind_speed: i32,
}

/// One forecast step (three hours apart).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HourlyForecast {
    pub time: DateTime<Utc>,
    pub temp: i32,
    pub icon: String,
}

/// One calendar day of forecast, in the location's local date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub high: i32,
    pub low: i32,
    pub description: String,
    pub icon: String,
}

/// Scoreboard across the followed leagues.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SportsData {
    pub games: Vec<Game>,
    pub fetched_at: DateTime<Utc>,
}

/// Sport a game belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sport {
    Football,
    Basketball,
}

/// Game lifecycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Scheduled,
    InProgress,
    Final,
}

/// One game on a scoreboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: String,
    pub sport: Sport,
    /// Short league label, e.g. "NCAAF".
    pub league: String,
    pub status: GameStatus,
    /// Provider's short status line, e.g. "Q3 4:12" or "Final".
    pub status_detail: String,
    pub home_team: Team,
    pub away_team: Team,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broadcast: Option<String>,
}

/// One side of a game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    pub abbreviation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    /// Poll rank; absent when unranked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
}

/// Merged headlines across news feeds, newest first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewsData {
    pub stories: Vec<NewsStory>,
}

/// A single headline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewsStory {
    pub id: String,
    pub title: String,
    pub snippet: String,
    pub source: String,
    /// League label, e.g. "NFL".
    pub category: String,
    pub published_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Prices for the configured coins, in configured order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CryptoData {
    pub prices: Vec<CryptoPrice>,
    pub fetched_at: DateTime<Utc>,
}

/// Market snapshot for one coin, in USD.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CryptoPrice {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub change_24h: f64,
    #[serde(default)]
    pub change_percent_24h: f64,
    #[serde(default)]
    pub market_cap: f64,
    #[serde(default)]
    pub volume_24h: f64,
}

/// Bandwidth accounting for the monitored interface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkBandwidthData {
    pub timestamp: DateTime<Utc>,
    pub interface: String,
    /// Bytes per second.
    pub current_rates: TrafficPair,
    /// Bytes.
    pub today: TrafficPair,
    /// Bytes.
    pub month: TrafficPair,
    #[serde(default)]
    pub top_devices: Vec<NetworkDevice>,
}

/// Download/upload counters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrafficPair {
    #[serde(default)]
    pub download: u64,
    #[serde(default)]
    pub upload: u64,
}

/// A host seen in the address-resolution table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkDevice {
    pub ip: String,
    /// Upper-case colon-separated hardware address.
    pub mac: String,
    /// `null` when the resolver has no name.
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub download: u64,
    #[serde(default)]
    pub upload: u64,
}

impl NetworkDevice {
    /// Hostname, falling back to the IP address.
    pub fn display_name(&self) -> &str {
        self.hostname.as_deref().unwrap_or(&self.ip)
    }
}
