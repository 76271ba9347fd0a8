//! Provider adapters: one async fetch per data source, each returning a
//! display model or a [`FetchError`].
//!
//! HTTP lives here; mapping provider JSON into models is done by pure
//! functions in the submodules so it can be tested against fixtures.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use wallboard_core::config::DashboardConfig;
use wallboard_core::model::{CryptoData, NetworkBandwidthData, NewsData, SportsData, WeatherData};
use wallboard_core::FetchError;

pub mod crypto;
pub mod network;
pub mod news;
pub mod sports;
pub mod weather;

/// Shared HTTP client plus the configuration every adapter reads.
#[derive(Clone)]
pub struct Providers {
    client: Client,
    config: Arc<DashboardConfig>,
}

impl Providers {
    pub fn new(config: Arc<DashboardConfig>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.http_timeout_ms))
            .user_agent(concat!("wallboard/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    pub async fn weather(&self) -> Result<WeatherData, FetchError> {
        weather::fetch(&self.client, &self.config.weather).await
    }

    pub async fn sports(&self) -> Result<SportsData, FetchError> {
        sports::fetch(&self.client, &self.config.sports).await
    }

    pub async fn news(&self) -> Result<NewsData, FetchError> {
        news::fetch(&self.client, &self.config.news).await
    }

    pub async fn crypto(&self) -> Result<CryptoData, FetchError> {
        crypto::fetch(&self.client, &self.config.crypto).await
    }

    pub async fn network(&self) -> Result<NetworkBandwidthData, FetchError> {
        network::fetch(&self.client, &self.config.network).await
    }
}

/// Joins a base URL and a path, then appends query parameters.
pub(crate) fn endpoint(base: &str, path: &str, params: &[(&str, String)]) -> Result<Url, FetchError> {
    let raw = format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'));
    let parsed = if params.is_empty() {
        Url::parse(&raw)
    } else {
        Url::parse_with_params(&raw, params)
    };
    parsed.map_err(|e| FetchError::Http(format!("invalid url {raw}: {e}")))
}

/// GETs `url` and decodes a JSON body. Non-2xx becomes [`FetchError::Status`].
pub(crate) async fn get_json<T: DeserializeOwned>(client: &Client, url: Url) -> Result<T, FetchError> {
    let resp = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| FetchError::Http(e.to_string()))?;

    let status = resp.status();
    let body = resp
        .bytes()
        .await
        .map_err(|e| FetchError::Http(e.to_string()))?;

    if !status.is_success() {
        tracing::debug!(url = %url.path(), status = status.as_u16(), "provider returned error status");
        return Err(status_error(status, &body));
    }
    Ok(serde_json::from_slice(&body)?)
}

/// Builds a status error, preferring the message carried in a JSON body.
///
/// Recognises `{"error", "message"}` (bandwidth service) and `{"message"}`
/// (OpenWeatherMap, CoinGecko).
pub(crate) fn status_error(status: StatusCode, body: &[u8]) -> FetchError {
    let parsed: Option<serde_json::Value> = serde_json::from_slice(body).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    };

    let message = match (field("error"), field("message")) {
        (Some(error), Some(message)) => format!("{error}: {message}"),
        (Some(error), None) => error,
        (None, Some(message)) => message,
        (None, None) => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    };

    FetchError::Status {
        status: status.as_u16(),
        message,
    }
}

/// Parses provider timestamps. ESPN sometimes omits seconds (`2025-12-20T17:00Z`).
pub(crate) fn parse_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%MZ")
        .ok()
        .map(|t| t.and_utc())
}
