//! Crypto market-data provider client
//!
//! The price-history provider indexes coins by an internal slug, not a
//! ticker, so every flow starts from its search endpoint. Chart payloads are
//! parallel `[timestamp_ms, value]` arrays with no true OHLC, reshaped into
//! `RawSeries::Points` for the normalizer. All calls share one
//! sliding-window rate limiter; the free tier rejects bursts.

use crate::constants::CRYPTO_RATE_LIMIT_PER_MINUTE;
use crate::error::Error;
use crate::services::normalizer::{PricePoint, RawSeries};
use crate::services::rate_limiter::RateLimiter;
use chrono::DateTime;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// One candidate from the provider search endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct CoinMatch {
    /// Provider-internal slug used for all subsequent calls
    pub id: String,
    pub symbol: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    coins: Vec<CoinMatch>,
}

#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    prices: Vec<(i64, f64)>,
    #[serde(default)]
    total_volumes: Vec<(i64, f64)>,
}

/// Market snapshot row from the top-N listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinMarket {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub price_change_percentage_24h: Option<f64>,
}

/// Detailed metadata for a single coin
#[derive(Debug, Clone)]
pub struct CoinDetail {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub current_price: Option<f64>,
    pub price_change_24h: Option<f64>,
    pub price_change_percentage_24h: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CoinDetailResponse {
    id: String,
    symbol: String,
    name: String,
    market_data: Option<CoinMarketData>,
}

#[derive(Debug, Deserialize)]
struct CoinMarketData {
    current_price: Option<std::collections::HashMap<String, f64>>,
    price_change_24h: Option<f64>,
    price_change_percentage_24h: Option<f64>,
}

/// Global aggregate market statistics
#[derive(Debug, Clone, Serialize)]
pub struct GlobalStats {
    pub active_cryptocurrencies: Option<u64>,
    pub total_market_cap_usd: Option<f64>,
    pub total_volume_usd: Option<f64>,
    pub market_cap_change_percentage_24h: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct GlobalResponse {
    data: GlobalData,
}

#[derive(Debug, Deserialize)]
struct GlobalData {
    active_cryptocurrencies: Option<u64>,
    total_market_cap: Option<std::collections::HashMap<String, f64>>,
    total_volume: Option<std::collections::HashMap<String, f64>>,
    market_cap_change_percentage_24h_usd: Option<f64>,
}

/// Coin from the trending endpoint
#[derive(Debug, Clone, Serialize)]
pub struct TrendingCoin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub market_cap_rank: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct TrendingResponse {
    coins: Vec<TrendingItem>,
}

#[derive(Debug, Deserialize)]
struct TrendingItem {
    item: TrendingItemInner,
}

#[derive(Debug, Deserialize)]
struct TrendingItemInner {
    id: String,
    symbol: String,
    name: String,
    market_cap_rank: Option<u32>,
}

pub struct CryptoClient {
    client: Client,
    base_url: String,
    limiter: Arc<RateLimiter>,
}

impl CryptoClient {
    pub fn new(base_url: String) -> Result<Self, Error> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent("markethub/0.1")
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            limiter: Arc::new(RateLimiter::new(CRYPTO_RATE_LIMIT_PER_MINUTE)),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, Error> {
        self.limiter.acquire().await;
        debug!(url, "Crypto provider request");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::NotFound("Provider returned no data".to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        Ok(response.json().await?)
    }

    /// Search coins by free text, returning provider-ordered candidates
    pub async fn search(&self, query: &str) -> Result<Vec<CoinMatch>, Error> {
        let url = format!("{}/api/v3/search?query={}", self.base_url, query);
        let response: SearchResponse = self.get_json(&url).await?;
        Ok(response.coins)
    }

    /// Fetch the price/volume history for a coin id over `days` days
    pub async fn market_chart(&self, id: &str, days: u32) -> Result<RawSeries, Error> {
        let url = format!(
            "{}/api/v3/coins/{}/market_chart?vs_currency=usd&days={}",
            self.base_url, id, days
        );
        let response: MarketChartResponse = self.get_json(&url).await?;

        if response.prices.is_empty() {
            return Err(Error::NotFound(format!("No price history for '{}'", id)));
        }

        let points = response
            .prices
            .iter()
            .enumerate()
            .filter_map(|(i, &(ts_ms, price))| {
                let time = DateTime::from_timestamp_millis(ts_ms)?.naive_utc();
                // Volumes are a parallel array; a shorter or missing array
                // leaves volume null rather than zero
                let volume = response.total_volumes.get(i).map(|&(_, v)| v);
                Some(PricePoint {
                    time,
                    price,
                    volume,
                })
            })
            .collect();

        Ok(RawSeries::Points(points))
    }

    /// Fetch detailed metadata for a coin id
    pub async fn coin_detail(&self, id: &str) -> Result<CoinDetail, Error> {
        let url = format!(
            "{}/api/v3/coins/{}?localization=false&tickers=false&community_data=false&developer_data=false",
            self.base_url, id
        );
        let response: CoinDetailResponse = self.get_json(&url).await?;

        let (current_price, price_change_24h, price_change_percentage_24h) =
            match response.market_data {
                Some(md) => (
                    md.current_price.and_then(|p| p.get("usd").copied()),
                    md.price_change_24h,
                    md.price_change_percentage_24h,
                ),
                None => (None, None, None),
            };

        Ok(CoinDetail {
            id: response.id,
            symbol: response.symbol,
            name: response.name,
            current_price,
            price_change_24h,
            price_change_percentage_24h,
        })
    }

    /// Fetch the top `count` coins by market cap
    pub async fn markets(&self, count: usize) -> Result<Vec<CoinMarket>, Error> {
        let url = format!(
            "{}/api/v3/coins/markets?vs_currency=usd&order=market_cap_desc&per_page={}&page=1",
            self.base_url, count
        );
        self.get_json(&url).await
    }

    /// Fetch global aggregate market statistics
    pub async fn global(&self) -> Result<GlobalStats, Error> {
        let url = format!("{}/api/v3/global", self.base_url);
        let response: GlobalResponse = self.get_json(&url).await?;
        let data = response.data;

        Ok(GlobalStats {
            active_cryptocurrencies: data.active_cryptocurrencies,
            total_market_cap_usd: data
                .total_market_cap
                .and_then(|m| m.get("usd").copied()),
            total_volume_usd: data.total_volume.and_then(|m| m.get("usd").copied()),
            market_cap_change_percentage_24h: data.market_cap_change_percentage_24h_usd,
        })
    }

    /// Fetch currently trending coins
    pub async fn trending(&self) -> Result<Vec<TrendingCoin>, Error> {
        let url = format!("{}/api/v3/search/trending", self.base_url);
        let response: TrendingResponse = self.get_json(&url).await?;

        Ok(response
            .coins
            .into_iter()
            .map(|c| TrendingCoin {
                id: c.item.id,
                symbol: c.item.symbol,
                name: c.item.name,
                market_cap_rank: c.item.market_cap_rank,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_payload_parsing() {
        let body = r#"{
            "coins": [
                {"id": "bitcoin", "symbol": "btc", "name": "Bitcoin"},
                {"id": "bitcoin-cash", "symbol": "bch", "name": "Bitcoin Cash"}
            ]
        }"#;
        let response: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.coins[0].id, "bitcoin");
        assert_eq!(response.coins.len(), 2);
    }

    #[test]
    fn test_market_chart_payload_parsing() {
        let body = r#"{
            "prices": [[1700000000000, 36000.5], [1700003600000, 36100.0]],
            "total_volumes": [[1700000000000, 1.2e10], [1700003600000, 1.3e10]]
        }"#;
        let response: MarketChartResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.prices.len(), 2);
        assert_eq!(response.prices[1].1, 36100.0);
    }

    #[test]
    fn test_trending_payload_parsing() {
        let body = r#"{
            "coins": [
                {"item": {"id": "pepe", "symbol": "pepe", "name": "Pepe", "market_cap_rank": 40}}
            ]
        }"#;
        let response: TrendingResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.coins[0].item.id, "pepe");
    }
}
