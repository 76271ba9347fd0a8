//! Dashboard configuration.
//!
//! Built once at startup and passed by reference to provider adapters and
//! widget wiring. `Default` holds the stock wall setup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MINUTE_MS: i64 = 60 * 1000;

/// Whole-dashboard settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub weather: WeatherConfig,
    pub sports: SportsConfig,
    pub news: NewsConfig,
    pub crypto: CryptoConfig,
    pub network: NetworkConfig,
    pub refresh: RefreshIntervals,
    pub rotation: RotationIntervals,
    pub widgets: WidgetToggles,
    /// Rotating banner lines; empty hides the banner.
    pub banner_messages: Vec<String>,
    pub countdown: Option<CountdownTarget>,
    /// HTTP client timeout applied to every provider request.
    pub http_timeout_ms: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            weather: WeatherConfig::default(),
            sports: SportsConfig::default(),
            news: NewsConfig::default(),
            crypto: CryptoConfig::default(),
            network: NetworkConfig::default(),
            refresh: RefreshIntervals::default(),
            rotation: RotationIntervals::default(),
            widgets: WidgetToggles::default(),
            banner_messages: Vec::new(),
            countdown: None,
            http_timeout_ms: 10_000,
        }
    }
}

/// Measurement system passed to the weather provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    Imperial,
    Metric,
}

impl Units {
    /// Query value understood by the provider.
    pub fn as_str(self) -> &'static str {
        match self {
            Units::Imperial => "imperial",
            Units::Metric => "metric",
        }
    }

    /// Temperature suffix for display.
    pub fn temp_suffix(self) -> &'static str {
        match self {
            Units::Imperial => "°F",
            Units::Metric => "°C",
        }
    }

    /// Wind speed suffix for display.
    pub fn speed_suffix(self) -> &'static str {
        match self {
            Units::Imperial => "mph",
            Units::Metric => "m/s",
        }
    }
}

/// OpenWeatherMap location and credentials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WeatherConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub units: Units,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openweathermap.org/data/2.5".into(),
            city: "Scottsdale".into(),
            state: "AZ".into(),
            country: "US".into(),
            units: Units::Imperial,
        }
    }
}

impl WeatherConfig {
    /// `city,state,country` query form.
    pub fn query(&self) -> String {
        format!("{},{},{}", self.city, self.state, self.country)
    }

    /// `city, state` display form.
    pub fn label(&self) -> String {
        format!("{}, {}", self.city, self.state)
    }
}

/// One scoreboard feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeagueFeed {
    /// Path below the base URL, e.g. `football/college-football`.
    pub path: String,
    /// Short label shown on game cards.
    pub label: String,
    pub sport: crate::model::Sport,
}

/// ESPN scoreboard feeds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SportsConfig {
    pub base_url: String,
    pub leagues: Vec<LeagueFeed>,
    /// Events requested per feed.
    pub limit: u32,
    /// Games kept after merging.
    pub max_games: usize,
}

impl Default for SportsConfig {
    fn default() -> Self {
        use crate::model::Sport;
        Self {
            base_url: "https://site.api.espn.com/apis/site/v2/sports".into(),
            leagues: vec![
                LeagueFeed {
                    path: "football/college-football".into(),
                    label: "NCAAF".into(),
                    sport: Sport::Football,
                },
                LeagueFeed {
                    path: "basketball/mens-college-basketball".into(),
                    label: "NCAAM".into(),
                    sport: Sport::Basketball,
                },
            ],
            limit: 50,
            max_games: 10,
        }
    }
}

/// One headline feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsFeed {
    pub path: String,
    /// Category used when an article carries no league category.
    pub label: String,
}

/// ESPN news feeds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NewsConfig {
    pub base_url: String,
    pub feeds: Vec<NewsFeed>,
    pub per_feed: usize,
    pub max_stories: usize,
}

impl Default for NewsConfig {
    fn default() -> Self {
        let feed = |path: &str, label: &str| NewsFeed {
            path: path.into(),
            label: label.into(),
        };
        Self {
            base_url: "https://site.api.espn.com/apis/site/v2/sports".into(),
            feeds: vec![
                feed("football/nfl", "NFL"),
                feed("football/college-football", "CFB"),
                feed("basketball/nba", "NBA"),
            ],
            per_feed: 3,
            max_stories: 8,
        }
    }
}

/// A tracked coin; `symbol` and `name` override provider values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoinConfig {
    pub id: String,
    pub symbol: String,
    pub name: String,
}

/// CoinGecko settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CryptoConfig {
    pub base_url: String,
    pub coins: Vec<CoinConfig>,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        let coin = |id: &str, symbol: &str, name: &str| CoinConfig {
            id: id.into(),
            symbol: symbol.into(),
            name: name.into(),
        };
        Self {
            base_url: "https://api.coingecko.com/api/v3".into(),
            coins: vec![
                coin("bitcoin", "BTC", "Bitcoin"),
                coin("ethereum", "ETH", "Ethereum"),
                coin("ripple", "XRP", "XRP"),
                coin("fartcoin", "FARTCOIN", "Fartcoin"),
            ],
        }
    }
}

/// Location of the bandwidth service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    pub base_url: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001".into(),
        }
    }
}

/// Fetch periods in milliseconds; `<= 0` means manual-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RefreshIntervals {
    pub weather_ms: i64,
    pub sports_ms: i64,
    pub news_ms: i64,
    pub crypto_ms: i64,
    pub network_ms: i64,
}

impl Default for RefreshIntervals {
    fn default() -> Self {
        Self {
            weather_ms: 10 * MINUTE_MS,
            sports_ms: 5 * MINUTE_MS,
            news_ms: 15 * MINUTE_MS,
            crypto_ms: 2 * MINUTE_MS,
            network_ms: MINUTE_MS,
        }
    }
}

/// Rotation periods in milliseconds; `<= 0` never auto-advances.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RotationIntervals {
    pub news_ms: i64,
    /// Weather/crypto panel alternation.
    pub panel_ms: i64,
    pub banner_ms: i64,
    pub sports_ms: i64,
}

impl Default for RotationIntervals {
    fn default() -> Self {
        Self {
            news_ms: 8_000,
            panel_ms: 10_000,
            banner_ms: 30_000,
            sports_ms: 5_000,
        }
    }
}

/// Per-widget visibility. Hidden widgets never fetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WidgetToggles {
    /// Also gates crypto, which shares the panel.
    pub weather: bool,
    pub sports: bool,
    pub news: bool,
    pub clock: bool,
    pub network: bool,
}

impl Default for WidgetToggles {
    fn default() -> Self {
        Self {
            weather: true,
            sports: true,
            news: true,
            clock: true,
            network: true,
        }
    }
}

/// Target of the countdown widget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountdownTarget {
    pub label: String,
    pub at: DateTime<Utc>,
}
