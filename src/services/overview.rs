//! Market overview composer
//!
//! Aggregates the fixed watch-lists (indices, sector proxies, popular
//! stocks) into a single cross-sectional snapshot, and composes the crypto
//! market overview from the provider's aggregate endpoints. Symbols whose
//! fetch fails are excluded from aggregates rather than backfilled with
//! zeros; only the batch aggregator backfills placeholders.

use crate::constants::{
    BATCH_CONCURRENCY, CRYPTO_SNAPSHOT_SIZE, INDEX_SYMBOLS, POPULAR_STOCKS, SECTOR_SYMBOLS,
    TOP_COINS_COUNT, TOP_MOVERS_COUNT,
};
use crate::error::Error;
use crate::models::{Granularity, Period};
use crate::services::crypto_client::{CoinMarket, CryptoClient, GlobalStats, TrendingCoin};
use crate::services::equity_client::EquityClient;
use crate::services::normalizer::RawSeries;
use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::warn;

/// Index row: price plus 1-day change
#[derive(Debug, Clone, Serialize)]
pub struct IndexSnapshot {
    pub symbol: String,
    pub name: String,
    pub current_price: f64,
    pub change_percent: f64,
}

/// Sector row: price plus 5-day change.
///
/// Sectors intentionally use a longer lookback than the daily window used
/// for indices; the asymmetry is part of the product contract.
#[derive(Debug, Clone, Serialize)]
pub struct SectorSnapshot {
    pub symbol: String,
    pub sector: String,
    pub current_price: f64,
    pub change_percent: f64,
}

/// Popular-stock row used for the gainers/losers ranking
#[derive(Debug, Clone, Serialize)]
pub struct MoverEntry {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub current_price: f64,
    pub change_percent: f64,
}

#[derive(Debug, Serialize)]
pub struct MarketOverview {
    pub indices: Vec<IndexSnapshot>,
    pub sectors: Vec<SectorSnapshot>,
    pub top_gainers: Vec<MoverEntry>,
    pub top_losers: Vec<MoverEntry>,
    pub by_sector: BTreeMap<String, Vec<MoverEntry>>,
}

#[derive(Debug, Serialize)]
pub struct CryptoOverview {
    pub global: GlobalStats,
    pub top_coins: Vec<CoinMarket>,
    pub trending: Vec<TrendingCoin>,
    /// Share of the market snapshot trading up over 24h, in percent;
    /// `trending_down_percent` is its complement so the two always sum
    /// to 100
    pub trending_up_percent: u32,
    pub trending_down_percent: u32,
}

/// Compose the equity market overview from the fixed watch-lists
pub async fn compose_market_overview(equity: Arc<EquityClient>) -> MarketOverview {
    let semaphore = Arc::new(Semaphore::new(BATCH_CONCURRENCY));

    let index_tasks = INDEX_SYMBOLS.iter().map(|&(symbol, name)| {
        let equity = equity.clone();
        let semaphore = semaphore.clone();
        async move {
            let _permit = semaphore.acquire().await;
            match equity.fetch_quote(symbol).await {
                Ok(quote) => Some(IndexSnapshot {
                    symbol: symbol.to_string(),
                    name: name.to_string(),
                    current_price: quote.current_price,
                    change_percent: quote.price_change_percent(),
                }),
                Err(e) => {
                    warn!(symbol, "Index quote failed: {}", e);
                    None
                }
            }
        }
    });

    let sector_tasks = SECTOR_SYMBOLS.iter().map(|&(symbol, sector)| {
        let equity = equity.clone();
        let semaphore = semaphore.clone();
        async move {
            let _permit = semaphore.acquire().await;
            match equity
                .fetch_history(symbol, Some(Period::FiveDays), Granularity::Day1)
                .await
            {
                Ok((raw, _)) => {
                    let closes = row_closes(&raw);
                    window_change(&closes).map(|(current, change_percent)| SectorSnapshot {
                        symbol: symbol.to_string(),
                        sector: sector.to_string(),
                        current_price: current,
                        change_percent,
                    })
                }
                Err(e) => {
                    warn!(symbol, "Sector history failed: {}", e);
                    None
                }
            }
        }
    });

    let mover_tasks = POPULAR_STOCKS.iter().map(|&(symbol, name, sector)| {
        let equity = equity.clone();
        let semaphore = semaphore.clone();
        async move {
            let _permit = semaphore.acquire().await;
            match equity.fetch_quote(symbol).await {
                Ok(quote) => Some(MoverEntry {
                    symbol: symbol.to_string(),
                    name: name.to_string(),
                    sector: sector.to_string(),
                    current_price: quote.current_price,
                    change_percent: quote.price_change_percent(),
                }),
                Err(e) => {
                    warn!(symbol, "Popular stock quote failed: {}", e);
                    None
                }
            }
        }
    });

    let (indices, sectors, movers) = tokio::join!(
        join_all(index_tasks),
        join_all(sector_tasks),
        join_all(mover_tasks),
    );

    let movers: Vec<MoverEntry> = movers.into_iter().flatten().collect();
    let (top_gainers, top_losers) = top_movers(&movers, TOP_MOVERS_COUNT);

    let mut by_sector: BTreeMap<String, Vec<MoverEntry>> = BTreeMap::new();
    for mover in &movers {
        by_sector
            .entry(mover.sector.clone())
            .or_default()
            .push(mover.clone());
    }

    MarketOverview {
        indices: indices.into_iter().flatten().collect(),
        sectors: sectors.into_iter().flatten().collect(),
        top_gainers,
        top_losers,
        by_sector,
    }
}

/// Compose the crypto market overview from the provider's aggregate
/// endpoints
pub async fn compose_crypto_overview(crypto: Arc<CryptoClient>) -> Result<CryptoOverview, Error> {
    // The global block is the backbone of the payload; the snapshot and
    // trending sections degrade to empty on failure
    let global = crypto.global().await?;

    let snapshot = match crypto.markets(CRYPTO_SNAPSHOT_SIZE).await {
        Ok(markets) => markets,
        Err(e) => {
            warn!("Market snapshot failed: {}", e);
            Vec::new()
        }
    };
    let trending = match crypto.trending().await {
        Ok(coins) => coins,
        Err(e) => {
            warn!("Trending lookup failed: {}", e);
            Vec::new()
        }
    };

    let changes: Vec<Option<f64>> = snapshot
        .iter()
        .map(|c| c.price_change_percentage_24h)
        .collect();
    let (trending_up_percent, trending_down_percent) =
        trend_percentages(&changes).unwrap_or((0, 0));

    let top_coins = snapshot.into_iter().take(TOP_COINS_COUNT).collect();

    Ok(CryptoOverview {
        global,
        top_coins,
        trending,
        trending_up_percent,
        trending_down_percent,
    })
}

/// Extract closes from a row series in timestamp order
fn row_closes(raw: &RawSeries) -> Vec<f64> {
    match raw {
        RawSeries::Rows(rows) => rows.iter().filter_map(|r| r.close).collect(),
        RawSeries::Points(points) => points.iter().map(|p| p.price).collect(),
    }
}

/// Current price and percentage change across a close window (first to
/// last). None when the window has fewer than two closes.
pub fn window_change(closes: &[f64]) -> Option<(f64, f64)> {
    if closes.len() < 2 {
        return None;
    }
    let first = *closes.first()?;
    let last = *closes.last()?;
    if first == 0.0 {
        return None;
    }
    Some((last, (last - first) / first * 100.0))
}

/// Rank movers into top-N gainers (descending by % change) and top-N
/// losers (ascending). The sort is stable, so ties keep input order.
pub fn top_movers(movers: &[MoverEntry], n: usize) -> (Vec<MoverEntry>, Vec<MoverEntry>) {
    let mut gainers = movers.to_vec();
    gainers.sort_by(|a, b| {
        b.change_percent
            .partial_cmp(&a.change_percent)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    gainers.truncate(n);

    let mut losers = movers.to_vec();
    losers.sort_by(|a, b| {
        a.change_percent
            .partial_cmp(&b.change_percent)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    losers.truncate(n);

    (gainers, losers)
}

/// Share of coins trading up over 24h across a market snapshot.
///
/// Coins with no reported change are excluded from the count. The down
/// share is computed as the complement of the rounded up share, so the two
/// always sum to exactly 100. None when no coin has data.
pub fn trend_percentages(changes: &[Option<f64>]) -> Option<(u32, u32)> {
    let present: Vec<f64> = changes.iter().copied().flatten().collect();
    if present.is_empty() {
        return None;
    }

    let positive = present.iter().filter(|&&c| c > 0.0).count();
    let up = (positive as f64 * 100.0 / present.len() as f64).round() as u32;
    Some((up, 100 - up))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mover(symbol: &str, change_percent: f64) -> MoverEntry {
        MoverEntry {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            sector: "Technology".to_string(),
            current_price: 100.0,
            change_percent,
        }
    }

    #[test]
    fn test_top_movers_ordering() {
        let movers = vec![
            mover("A", 1.0),
            mover("B", -2.0),
            mover("C", 5.0),
            mover("D", 0.5),
            mover("E", -0.1),
            mover("F", 3.0),
            mover("G", -4.0),
        ];
        let (gainers, losers) = top_movers(&movers, 5);

        let gainer_symbols: Vec<&str> = gainers.iter().map(|m| m.symbol.as_str()).collect();
        assert_eq!(gainer_symbols, ["C", "F", "A", "D", "E"]);

        let loser_symbols: Vec<&str> = losers.iter().map(|m| m.symbol.as_str()).collect();
        assert_eq!(loser_symbols, ["G", "B", "E", "D", "A"]);
    }

    #[test]
    fn test_top_movers_stable_ties_keep_input_order() {
        let movers = vec![mover("A", 1.0), mover("B", 1.0), mover("C", 1.0)];
        let (gainers, _) = top_movers(&movers, 3);
        let symbols: Vec<&str> = gainers.iter().map(|m| m.symbol.as_str()).collect();
        assert_eq!(symbols, ["A", "B", "C"]);
    }

    #[test]
    fn test_trend_percentages_sum_to_hundred_by_complement() {
        // 1 of 3 positive: up = round(33.3) = 33, down = 67
        let changes = vec![Some(2.0), Some(-1.0), Some(-0.5)];
        assert_eq!(trend_percentages(&changes), Some((33, 67)));

        // 2 of 3 positive: up = round(66.7) = 67, down = 33
        let changes = vec![Some(2.0), Some(1.0), Some(-0.5)];
        assert_eq!(trend_percentages(&changes), Some((67, 33)));
    }

    #[test]
    fn test_trend_percentages_exclude_missing_data() {
        let changes = vec![Some(2.0), None, Some(-1.0), None];
        assert_eq!(trend_percentages(&changes), Some((50, 50)));

        assert_eq!(trend_percentages(&[None, None]), None);
        assert_eq!(trend_percentages(&[]), None);
    }

    #[test]
    fn test_window_change() {
        assert_eq!(window_change(&[100.0, 105.0, 110.0]), Some((110.0, 10.0)));
        assert_eq!(window_change(&[100.0]), None);
        assert_eq!(window_change(&[]), None);
    }
}
