//! Equity chart provider client
//!
//! Fetches OHLCV history and quote metadata from a Yahoo-Finance-style
//! chart API. The chart payload carries parallel nullable arrays indexed by
//! timestamp; it is reshaped into row-oriented `RawSeries::Rows` records for
//! the normalizer.

use crate::constants::EQUITY_RATE_LIMIT_PER_MINUTE;
use crate::error::Error;
use crate::models::{Granularity, Period};
use crate::services::normalizer::{RawRow, RawSeries};
use crate::services::rate_limiter::RateLimiter;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Per-call timeout; a slow provider is treated as a fetch failure
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartOuter,
}

#[derive(Debug, Deserialize)]
struct ChartOuter {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

/// Chart metadata block, all fields best-effort
#[derive(Debug, Clone, Deserialize)]
pub struct ChartMeta {
    pub symbol: String,

    #[serde(rename = "longName")]
    pub long_name: Option<String>,

    #[serde(rename = "regularMarketPrice")]
    pub regular_market_price: Option<f64>,

    #[serde(rename = "previousClose")]
    pub previous_close: Option<f64>,

    #[serde(rename = "chartPreviousClose")]
    pub chart_previous_close: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct SummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: SummaryOuter,
}

#[derive(Debug, Deserialize)]
struct SummaryOuter {
    result: Option<Vec<SummaryResult>>,
}

#[derive(Debug, Deserialize)]
struct SummaryResult {
    #[serde(rename = "assetProfile")]
    asset_profile: Option<AssetProfile>,
    price: Option<PriceBlock>,
}

#[derive(Debug, Deserialize)]
struct AssetProfile {
    sector: Option<String>,
    industry: Option<String>,
    website: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PriceBlock {
    #[serde(rename = "longName")]
    long_name: Option<String>,
    #[serde(rename = "marketCap")]
    market_cap: Option<RawNumber>,
}

#[derive(Debug, Deserialize)]
struct RawNumber {
    raw: Option<f64>,
}

/// Current quote for one ticker, derived from the chart metadata
#[derive(Debug, Clone)]
pub struct EquityQuote {
    pub symbol: String,
    pub name: Option<String>,
    pub current_price: f64,
    pub previous_close: Option<f64>,
}

impl EquityQuote {
    /// Absolute change against the previous close (0 when unknown)
    pub fn price_change(&self) -> f64 {
        match self.previous_close {
            Some(prev) => self.current_price - prev,
            None => 0.0,
        }
    }

    /// Percentage change against the previous close (0 when unknown)
    pub fn price_change_percent(&self) -> f64 {
        match self.previous_close {
            Some(prev) if prev != 0.0 => (self.current_price - prev) / prev * 100.0,
            _ => 0.0,
        }
    }
}

/// Descriptive company metadata, entirely best-effort
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct CompanyProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
}

pub struct EquityClient {
    client: Client,
    base_url: String,
    /// Shared across all symbol-level tasks; provider-side rejection is a
    /// correctness boundary, not a performance one
    limiter: Arc<RateLimiter>,
}

impl EquityClient {
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
            limiter: Arc::new(RateLimiter::new(EQUITY_RATE_LIMIT_PER_MINUTE)),
        })
    }

    /// Fetch OHLCV history for one ticker at the given period/granularity
    ///
    /// Returns the raw row series plus the chart metadata block.
    pub async fn fetch_history(
        &self,
        ticker: &str,
        period: Option<Period>,
        granularity: Granularity,
    ) -> Result<(RawSeries, ChartMeta), Error> {
        let range = period.map(|p| p.to_provider_range()).unwrap_or("1mo");
        let url = format!(
            "{}/v8/finance/chart/{}?range={}&interval={}",
            self.base_url,
            ticker,
            range,
            granularity.to_provider_interval()
        );
        debug!(ticker, range, "Fetching equity history");

        self.limiter.acquire().await;
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!(
                "No data found for symbol '{}'",
                ticker
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                status: status.as_u16(),
                message: truncate(&body, 200),
            });
        }

        let envelope: ChartEnvelope = response.json().await?;
        if let Some(err) = envelope.chart.error {
            return Err(Error::NotFound(format!(
                "Provider rejected symbol '{}': {} ({})",
                ticker, err.description, err.code
            )));
        }

        let result = envelope
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| {
                Error::NotFound(format!("No data found for symbol '{}'", ticker))
            })?;

        let timestamps = result.timestamp.unwrap_or_default();
        let quote = result
            .indicators
            .quote
            .into_iter()
            .next()
            .unwrap_or_default();

        let mut rows = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let Some(time) = DateTime::from_timestamp(ts, 0).map(|dt| dt.naive_utc()) else {
                warn!(ticker, ts, "Skipping unrepresentable timestamp");
                continue;
            };
            rows.push(RawRow {
                time,
                open: value_at(&quote.open, i),
                high: value_at(&quote.high, i),
                low: value_at(&quote.low, i),
                close: value_at(&quote.close, i),
                volume: value_at(&quote.volume, i).map(|v| v.max(0.0) as u64),
            });
        }

        if rows.is_empty() {
            return Err(Error::NotFound(format!(
                "No data found for symbol '{}' in the requested period",
                ticker
            )));
        }

        Ok((RawSeries::Rows(rows), result.meta))
    }

    /// Fetch the current quote for one ticker.
    ///
    /// The previous close comes from the provider metadata when available;
    /// otherwise it falls back to two-day daily history. This is the
    /// canonical 24h-change policy for equities.
    pub async fn fetch_quote(&self, ticker: &str) -> Result<EquityQuote, Error> {
        let (raw, meta) = self
            .fetch_history(ticker, Some(Period::OneDay), Granularity::Day1)
            .await?;

        let last_close = match &raw {
            RawSeries::Rows(rows) => rows.iter().rev().find_map(|r| r.close),
            RawSeries::Points(points) => points.last().map(|p| p.price),
        };

        let current_price = meta
            .regular_market_price
            .or(last_close)
            .ok_or_else(|| Error::NotFound(format!("No price data for '{}'", ticker)))?;

        let previous_close = match meta.previous_close.or(meta.chart_previous_close) {
            Some(prev) => Some(prev),
            None => self.previous_close_from_history(ticker).await,
        };

        Ok(EquityQuote {
            symbol: meta.symbol,
            name: meta.long_name,
            current_price,
            previous_close,
        })
    }

    /// Fallback path of the 24h-change policy: second-to-last daily close
    /// over a 5-day window
    async fn previous_close_from_history(&self, ticker: &str) -> Option<f64> {
        let (raw, _) = self
            .fetch_history(ticker, Some(Period::FiveDays), Granularity::Day1)
            .await
            .ok()?;
        match raw {
            RawSeries::Rows(rows) => {
                let closes: Vec<f64> = rows.iter().filter_map(|r| r.close).collect();
                if closes.len() >= 2 {
                    Some(closes[closes.len() - 2])
                } else {
                    None
                }
            }
            RawSeries::Points(_) => None,
        }
    }

    /// Fetch descriptive company metadata, best-effort: provider errors
    /// degrade to an empty profile rather than failing the request
    pub async fn fetch_profile(&self, ticker: &str) -> CompanyProfile {
        let url = format!(
            "{}/v10/finance/quoteSummary/{}?modules=assetProfile%2Cprice",
            self.base_url, ticker
        );

        self.limiter.acquire().await;
        let envelope: SummaryEnvelope = match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => match resp.json().await {
                Ok(env) => env,
                Err(e) => {
                    debug!(ticker, "Profile payload unreadable: {}", e);
                    return CompanyProfile::default();
                }
            },
            Ok(resp) => {
                debug!(ticker, status = %resp.status(), "Profile lookup failed");
                return CompanyProfile::default();
            }
            Err(e) => {
                debug!(ticker, "Profile lookup failed: {}", e);
                return CompanyProfile::default();
            }
        };

        let Some(result) = envelope
            .quote_summary
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
        else {
            return CompanyProfile::default();
        };

        let (sector, industry, website) = match result.asset_profile {
            Some(p) => (p.sector, p.industry, p.website),
            None => (None, None, None),
        };
        let (name, market_cap) = match result.price {
            Some(p) => (p.long_name, p.market_cap.and_then(|m| m.raw)),
            None => (None, None),
        };

        CompanyProfile {
            name,
            sector,
            industry,
            website,
            market_cap,
        }
    }
}

fn value_at(values: &[Option<f64>], index: usize) -> Option<f64> {
    values.get(index).copied().flatten()
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &s[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_change_against_previous_close() {
        let quote = EquityQuote {
            symbol: "AAPL".to_string(),
            name: None,
            current_price: 110.0,
            previous_close: Some(100.0),
        };
        assert_eq!(quote.price_change(), 10.0);
        assert!((quote.price_change_percent() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_quote_change_defaults_to_zero_without_previous_close() {
        let quote = EquityQuote {
            symbol: "AAPL".to_string(),
            name: None,
            current_price: 110.0,
            previous_close: None,
        };
        assert_eq!(quote.price_change(), 0.0);
        assert_eq!(quote.price_change_percent(), 0.0);
    }

    #[test]
    fn test_chart_payload_parsing() {
        let body = r#"{
            "chart": {
                "result": [{
                    "meta": {
                        "symbol": "AAPL",
                        "regularMarketPrice": 187.3,
                        "chartPreviousClose": 185.0
                    },
                    "timestamp": [1700000000, 1700086400],
                    "indicators": {
                        "quote": [{
                            "open": [184.0, null],
                            "high": [188.0, 189.0],
                            "low": [183.5, 184.2],
                            "close": [185.0, 187.3],
                            "volume": [1000000.0, null]
                        }]
                    }
                }],
                "error": null
            }
        }"#;
        let envelope: ChartEnvelope = serde_json::from_str(body).unwrap();
        assert!(envelope.chart.error.is_none());
        let result = &envelope.chart.result.as_ref().unwrap()[0];
        assert_eq!(result.meta.symbol, "AAPL");
        assert_eq!(result.indicators.quote[0].open[1], None);
    }
}
