//! Batch aggregator
//!
//! Resolves and fetches quote summaries for many symbols at once. Each
//! symbol runs its own resolve → fetch → summarize pipeline; a failure at
//! any stage produces a placeholder entry instead of aborting the batch.
//! The result preserves the request's symbol order, duplicates included.

use crate::constants::BATCH_CONCURRENCY;
use crate::error::Error;
use crate::models::AssetClass;
use crate::services::crypto_client::CryptoClient;
use crate::services::equity_client::EquityClient;
use crate::services::resolver;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Per-symbol batch payload
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub symbol: String,
    pub name: String,
    /// Null for failed crypto lookups; equities report 0.0 instead
    pub current_price: Option<f64>,
    pub price_change: f64,
    pub price_change_percent: f64,
}

/// Placeholder entry for a symbol whose pipeline failed.
///
/// The name distinguishes the failed stage: "Unknown" when the symbol did
/// not resolve, "Error" when a provider fetch failed. Price conventions
/// differ by asset class: equities backfill 0.0, crypto stays null.
pub fn placeholder_entry(symbol: &str, asset_class: AssetClass, error: &Error) -> BatchEntry {
    let name = match error {
        Error::NotFound(_) => "Unknown",
        _ => "Error",
    };
    let current_price = match asset_class {
        AssetClass::Equity => Some(0.0),
        AssetClass::Crypto => None,
    };

    BatchEntry {
        symbol: symbol.to_string(),
        name: name.to_string(),
        current_price,
        price_change: 0.0,
        price_change_percent: 0.0,
    }
}

/// Fetch quote summaries for an ordered list of symbols.
///
/// Symbols are upper-cased but never deduplicated; every input symbol
/// appears exactly once in the output, in input order. Per-symbol fetches
/// run concurrently under a bounded semaphore so batch latency stays
/// sublinear in symbol count.
pub async fn fetch_batch(
    equity: Arc<EquityClient>,
    crypto: Arc<CryptoClient>,
    symbols: &[String],
    asset_class: AssetClass,
) -> Vec<BatchEntry> {
    let semaphore = Arc::new(Semaphore::new(BATCH_CONCURRENCY));

    let tasks = symbols.iter().map(|raw| {
        let symbol = raw.trim().to_uppercase();
        let equity = equity.clone();
        let crypto = crypto.clone();
        let semaphore = semaphore.clone();

        async move {
            let _permit = semaphore.acquire().await;
            let result = match asset_class {
                AssetClass::Equity => fetch_equity_entry(&equity, &symbol).await,
                AssetClass::Crypto => fetch_crypto_entry(&crypto, &symbol).await,
            };

            match result {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(symbol = %symbol, "Batch entry failed: {}", e);
                    placeholder_entry(&symbol, asset_class, &e)
                }
            }
        }
    });

    let entries = join_all(tasks).await;
    debug!(count = entries.len(), "Batch complete");
    entries
}

async fn fetch_equity_entry(equity: &EquityClient, symbol: &str) -> Result<BatchEntry, Error> {
    let symbol_ref = resolver::resolve_equity(symbol);
    let quote = equity.fetch_quote(&symbol_ref.canonical_id).await?;

    Ok(BatchEntry {
        symbol: symbol_ref.display_symbol,
        name: quote.name.clone().unwrap_or_else(|| symbol.to_string()),
        current_price: Some(quote.current_price),
        price_change: quote.price_change(),
        price_change_percent: quote.price_change_percent(),
    })
}

async fn fetch_crypto_entry(crypto: &CryptoClient, symbol: &str) -> Result<BatchEntry, Error> {
    let symbol_ref = resolver::resolve_crypto(crypto, symbol).await?;
    let detail = crypto.coin_detail(&symbol_ref.canonical_id).await?;

    Ok(BatchEntry {
        symbol: symbol_ref.display_symbol,
        name: detail.name,
        current_price: detail.current_price,
        price_change: detail.price_change_24h.unwrap_or(0.0),
        price_change_percent: detail.price_change_percentage_24h.unwrap_or(0.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_name_reflects_failed_stage() {
        let not_found = Error::NotFound("no match".to_string());
        let entry = placeholder_entry("NOPE123", AssetClass::Equity, &not_found);
        assert_eq!(entry.name, "Unknown");

        let upstream = Error::Upstream {
            status: 502,
            message: "bad gateway".to_string(),
        };
        let entry = placeholder_entry("AAPL", AssetClass::Equity, &upstream);
        assert_eq!(entry.name, "Error");
    }

    #[tokio::test]
    async fn test_batch_preserves_order_and_duplicates_under_total_failure() {
        // Nothing listens on the discard port, so every pipeline fails;
        // the batch must still answer one entry per symbol, in order
        let equity = Arc::new(EquityClient::new("http://127.0.0.1:9".to_string()).unwrap());
        let crypto = Arc::new(CryptoClient::new("http://127.0.0.1:9".to_string()).unwrap());

        let symbols = vec![
            "aapl".to_string(),
            "msft".to_string(),
            "AAPL".to_string(),
        ];
        let entries = fetch_batch(equity, crypto, &symbols, AssetClass::Equity).await;

        assert_eq!(entries.len(), 3);
        let out: Vec<&str> = entries.iter().map(|e| e.symbol.as_str()).collect();
        assert_eq!(out, ["AAPL", "MSFT", "AAPL"]);
        for entry in &entries {
            assert_eq!(entry.current_price, Some(0.0));
            assert_eq!(entry.price_change, 0.0);
        }
    }

    #[test]
    fn test_placeholder_price_convention_per_asset_class() {
        let error = Error::NotFound("no match".to_string());

        let equity = placeholder_entry("NOPE123", AssetClass::Equity, &error);
        assert_eq!(equity.current_price, Some(0.0));
        assert_eq!(equity.price_change, 0.0);

        let crypto = placeholder_entry("NOPE123", AssetClass::Crypto, &error);
        assert_eq!(crypto.current_price, None);
        assert_eq!(crypto.price_change, 0.0);
    }
}
