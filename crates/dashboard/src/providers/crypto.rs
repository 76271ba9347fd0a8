use reqwest::Client;
use serde::Deserialize;
use wallboard_core::config::{CoinConfig, CryptoConfig};
use wallboard_core::model::{CryptoData, CryptoPrice};
use wallboard_core::{now_utc, FetchError};

use super::{endpoint, get_json};

/// One row of CoinGecko `/coins/markets`. Any numeric field may be null.
#[derive(Debug, Deserialize)]
pub struct MarketRow {
    pub id: String,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub price_change_24h: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub total_volume: Option<f64>,
}

pub async fn fetch(client: &Client, cfg: &CryptoConfig) -> Result<CryptoData, FetchError> {
    if cfg.coins.is_empty() {
        return Err(FetchError::MissingConfig("crypto coin list"));
    }
    let ids = cfg
        .coins
        .iter()
        .map(|c| c.id.as_str())
        .collect::<Vec<_>>()
        .join(",");
    let url = endpoint(
        &cfg.base_url,
        "coins/markets",
        &[("vs_currency", "usd".into()), ("ids", ids)],
    )?;
    let rows: Vec<MarketRow> = get_json(client, url).await?;
    let prices = merge(&cfg.coins, rows)?;
    Ok(CryptoData {
        prices,
        fetched_at: now_utc(),
    })
}

/// Orders rows by the configured coin list. Configured symbol and name
/// win; coins the provider did not return are left out.
pub fn merge(coins: &[CoinConfig], rows: Vec<MarketRow>) -> Result<Vec<CryptoPrice>, FetchError> {
    let mut prices = Vec::with_capacity(coins.len());
    for coin in coins {
        let Some(row) = rows.iter().find(|r| r.id == coin.id) else {
            tracing::debug!(coin = %coin.id, "coin missing from market response");
            continue;
        };
        let Some(price) = row.current_price else {
            tracing::debug!(coin = %coin.id, "coin has no price");
            continue;
        };
        prices.push(CryptoPrice {
            id: coin.id.clone(),
            symbol: coin.symbol.clone(),
            name: coin.name.clone(),
            price,
            change_24h: row.price_change_24h.unwrap_or_default(),
            change_percent_24h: row.price_change_percentage_24h.unwrap_or_default(),
            market_cap: row.market_cap.unwrap_or_default(),
            volume_24h: row.total_volume.unwrap_or_default(),
        });
    }

    if prices.is_empty() {
        return Err(FetchError::Decode("no configured coins in market response".into()));
    }
    Ok(prices)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKETS: &str = r#"[
        {"id": "ethereum", "symbol": "eth", "name": "Ethereum", "current_price": 3412.55,
         "market_cap": 411000000000, "total_volume": 18000000000,
         "price_change_24h": -41.2, "price_change_percentage_24h": -1.19},
        {"id": "bitcoin", "symbol": "btc", "name": "Bitcoin", "current_price": 97123.0,
         "market_cap": 1920000000000, "total_volume": 35000000000,
         "price_change_24h": 1500.0, "price_change_percentage_24h": 1.57},
        {"id": "fartcoin", "symbol": "fartcoin", "name": "Fartcoin", "current_price": 0.8123,
         "market_cap": null, "total_volume": null,
         "price_change_24h": null, "price_change_percentage_24h": null}
    ]"#;

    #[test]
    fn follows_configured_order_and_labels() {
        let rows: Vec<MarketRow> = serde_json::from_str(MARKETS).unwrap();
        let coins = CryptoConfig::default().coins;
        let prices = merge(&coins, rows).unwrap();

        let ids: Vec<&str> = prices.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["bitcoin", "ethereum", "fartcoin"]);
        assert_eq!(prices[0].symbol, "BTC");
        assert_eq!(prices[1].change_percent_24h, -1.19);
        assert_eq!(prices[2].symbol, "FARTCOIN");
        assert_eq!(prices[2].market_cap, 0.0);
    }

    #[test]
    fn nothing_matching_is_an_error() {
        let coins = vec![CoinConfig {
            id: "dogecoin".into(),
            symbol: "DOGE".into(),
            name: "Dogecoin".into(),
        }];
        let rows: Vec<MarketRow> = serde_json::from_str(MARKETS).unwrap();
        assert!(matches!(merge(&coins, rows), Err(FetchError::Decode(_))));
    }
}
