#![forbid(unsafe_code)]

//! Wallboard: polls weather, scores, headlines, coin prices and the local
//! bandwidth service, and redraws a text dashboard every frame.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, FixedOffset, Local, Utc};
use clap::{ArgAction, Parser};
use tokio::signal;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wallboard_core::config::{CountdownTarget, DashboardConfig, Units};

mod providers;
mod render;
mod widgets;

use crate::providers::Providers;
use crate::widgets::Dashboard;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
const MINUTE_MS: i64 = 60_000;

#[derive(Parser, Debug)]
#[command(name = "wallboard", version, about = "Wall-mounted information dashboard")]
struct Args {
    /// OpenWeatherMap API key.
    #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    openweather_api_key: Option<String>,

    #[arg(long, env = "WEATHER_CITY")]
    weather_city: Option<String>,

    #[arg(long, env = "WEATHER_STATE")]
    weather_state: Option<String>,

    #[arg(long, env = "WEATHER_COUNTRY")]
    weather_country: Option<String>,

    /// Celsius and m/s instead of Fahrenheit and mph.
    #[arg(long, env = "WEATHER_METRIC")]
    metric: bool,

    #[arg(long, env = "WEATHER_REFRESH_MINUTES")]
    weather_refresh_minutes: Option<i64>,

    #[arg(long, env = "SPORTS_REFRESH_MINUTES")]
    sports_refresh_minutes: Option<i64>,

    #[arg(long, env = "NEWS_REFRESH_MINUTES")]
    news_refresh_minutes: Option<i64>,

    #[arg(long, env = "CRYPTO_REFRESH_MINUTES")]
    crypto_refresh_minutes: Option<i64>,

    #[arg(long, env = "NETWORK_REFRESH_SECONDS")]
    network_refresh_seconds: Option<i64>,

    /// Show the weather/crypto panel.
    #[arg(long, env = "SHOW_WEATHER", default_value_t = true, action = ArgAction::Set)]
    show_weather: bool,

    #[arg(long, env = "SHOW_SPORTS", default_value_t = true, action = ArgAction::Set)]
    show_sports: bool,

    #[arg(long, env = "SHOW_NEWS", default_value_t = true, action = ArgAction::Set)]
    show_news: bool,

    #[arg(long, env = "SHOW_CLOCK", default_value_t = true, action = ArgAction::Set)]
    show_clock: bool,

    #[arg(long, env = "SHOW_NETWORK", default_value_t = true, action = ArgAction::Set)]
    show_network: bool,

    /// Base URL of the bandwidth service.
    #[arg(long, env = "NETWORK_API_URL")]
    network_api_url: Option<String>,

    /// Banner lines, `|`-separated in the environment.
    #[arg(long = "banner", env = "BANNER_MESSAGES", value_delimiter = '|')]
    banner_messages: Vec<String>,

    #[arg(long, env = "COUNTDOWN_LABEL", default_value = "Countdown")]
    countdown_label: String,

    /// Countdown target (RFC 3339).
    #[arg(long, env = "COUNTDOWN_AT")]
    countdown_at: Option<DateTime<Utc>>,

    /// HTTP timeout for provider requests.
    #[arg(long, default_value_t = 10_000)]
    http_timeout_ms: u64,

    /// Redraw period.
    #[arg(long, default_value_t = 1_000)]
    frame_ms: u64,

    /// Fetch everything once, print a single frame, exit.
    #[arg(long)]
    once: bool,

    /// How long `--once` waits for the first fetches.
    #[arg(long, default_value_t = 15_000)]
    once_timeout_ms: u64,

    /// Log level (env-filter syntax). Logs go to stderr.
    #[arg(long, default_value = "info")]
    log: String,
}

impl Args {
    fn to_config(&self) -> DashboardConfig {
        let mut cfg = DashboardConfig::default();

        cfg.weather.api_key = self.openweather_api_key.clone();
        if let Some(city) = &self.weather_city {
            cfg.weather.city = city.clone();
        }
        if let Some(state) = &self.weather_state {
            cfg.weather.state = state.clone();
        }
        if let Some(country) = &self.weather_country {
            cfg.weather.country = country.clone();
        }
        if self.metric {
            cfg.weather.units = Units::Metric;
        }

        let minutes = |v: Option<i64>, dflt: i64| v.map(|m| m.saturating_mul(MINUTE_MS)).unwrap_or(dflt);
        cfg.refresh.weather_ms = minutes(self.weather_refresh_minutes, cfg.refresh.weather_ms);
        cfg.refresh.sports_ms = minutes(self.sports_refresh_minutes, cfg.refresh.sports_ms);
        cfg.refresh.news_ms = minutes(self.news_refresh_minutes, cfg.refresh.news_ms);
        cfg.refresh.crypto_ms = minutes(self.crypto_refresh_minutes, cfg.refresh.crypto_ms);
        if let Some(secs) = self.network_refresh_seconds {
            cfg.refresh.network_ms = secs.saturating_mul(1000);
        }

        cfg.widgets.weather = self.show_weather;
        cfg.widgets.sports = self.show_sports;
        cfg.widgets.news = self.show_news;
        cfg.widgets.clock = self.show_clock;
        cfg.widgets.network = self.show_network;

        if let Some(url) = &self.network_api_url {
            cfg.network.base_url = url.clone();
        }
        cfg.banner_messages = self
            .banner_messages
            .iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        cfg.countdown = self.countdown_at.map(|at| CountdownTarget {
            label: self.countdown_label.clone(),
            at,
        });
        cfg.http_timeout_ms = self.http_timeout_ms;
        cfg
    }
}

fn local_now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&args.log))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Arc::new(args.to_config());
    if config.widgets.weather && config.weather.api_key.is_none() {
        warn!("OPENWEATHER_API_KEY not set; weather will show an error");
    }

    let providers = Providers::new(Arc::clone(&config)).context("building http client")?;
    let mut dash = Dashboard::new(Arc::clone(&config), providers);
    dash.start();
    info!(
        weather = config.widgets.weather,
        sports = config.widgets.sports,
        news = config.widgets.news,
        network = config.widgets.network,
        "wallboard started"
    );

    let mut stdout = std::io::stdout();

    if args.once {
        if timeout(Duration::from_millis(args.once_timeout_ms), dash.settled())
            .await
            .is_err()
        {
            warn!(timeout_ms = args.once_timeout_ms, "some sources still loading");
        }
        write!(stdout, "{}", render::render(&dash.snapshot(local_now())))?;
        stdout.flush()?;
        dash.stop();
        return Ok(());
    }

    let mut frames = interval(Duration::from_millis(args.frame_ms.max(1)));
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = frames.tick() => {
                let frame = render::render(&dash.snapshot(local_now()));
                write!(stdout, "{CLEAR_SCREEN}{frame}")?;
                stdout.flush()?;
            }
            _ = &mut shutdown => {
                info!("shutdown requested");
                break;
            }
        }
    }

    dash.stop();
    Ok(())
}
