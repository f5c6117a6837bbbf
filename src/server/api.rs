use crate::constants::POPULAR_STOCKS;
use crate::error::AppError;
use crate::models::{day_count, interval_for, AssetClass, Period, Series, TimestampFormat};
use crate::server::AppState;
use crate::services::batch::{fetch_batch, BatchEntry};
use crate::services::indicator_engine::{self, IndicatorReport};
use crate::services::news_client::{NewsArticle, NewsTopic};
use crate::services::normalizer::normalize;
use crate::services::overview::{self, CryptoOverview, MarketOverview};
use crate::services::resolver;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Candle in the client-facing schema, timestamp pre-formatted per the
/// period policy
#[derive(Debug, Serialize)]
pub struct CandleResponse {
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    pub close: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vwap: Option<f64>,
}

fn candles_to_response(series: &Series, format: TimestampFormat) -> Vec<CandleResponse> {
    series
        .iter()
        .map(|c| CandleResponse {
            time: format.format(c.time),
            open: c.open,
            high: c.high,
            low: c.low,
            close: c.close,
            volume: c.volume,
            vwap: c.vwap,
        })
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SymbolMetadata {
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
    pub price_change: f64,
    pub price_change_percent: f64,
}

#[derive(Debug, Serialize)]
pub struct SymbolDataResponse {
    pub metadata: SymbolMetadata,
    pub candles: Vec<CandleResponse>,
}

/// GET /symbol/{symbol}?period= - candles + metadata for one equity
#[instrument(skip(state))]
pub async fn get_symbol_handler(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<PeriodQuery>,
) -> Result<Json<SymbolDataResponse>, AppError> {
    let symbol_ref = resolver::resolve_equity(&symbol);
    let period = params.period.as_deref().and_then(Period::parse);
    let (granularity, format) = interval_for(period);

    let (raw, meta) = state
        .equity
        .fetch_history(&symbol_ref.canonical_id, period, granularity)
        .await?;
    let series = normalize(raw);

    // Descriptive metadata is best-effort and must not fail the request
    let profile = state.equity.fetch_profile(&symbol_ref.canonical_id).await;

    let current_price = meta
        .regular_market_price
        .or_else(|| series.last().map(|c| c.close));
    let previous_close = meta.previous_close.or(meta.chart_previous_close);
    let (price_change, price_change_percent) = match (current_price, previous_close) {
        (Some(current), Some(prev)) if prev != 0.0 => {
            (current - prev, (current - prev) / prev * 100.0)
        }
        _ => (0.0, 0.0),
    };

    info!(
        symbol = %symbol_ref.display_symbol,
        candles = series.len(),
        "Returning equity data"
    );

    Ok(Json(SymbolDataResponse {
        metadata: SymbolMetadata {
            symbol: symbol_ref.display_symbol,
            name: profile.name.or(meta.long_name),
            sector: profile.sector,
            current_price,
            price_change,
            price_change_percent,
        },
        candles: candles_to_response(&series, format),
    }))
}

/// GET /crypto/{symbol}?period= - candles + metadata for one crypto asset
#[instrument(skip(state))]
pub async fn get_crypto_handler(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<PeriodQuery>,
) -> Result<Json<SymbolDataResponse>, AppError> {
    let symbol_ref = resolver::resolve_crypto(&state.crypto, &symbol).await?;
    let period = params.period.as_deref().and_then(Period::parse);
    let (_, format) = interval_for(period);
    let days = day_count(period);

    let raw = state
        .crypto
        .market_chart(&symbol_ref.canonical_id, days)
        .await?;
    let series = normalize(raw);

    // Detail lookup is best-effort; the chart is the core payload
    let detail = state.crypto.coin_detail(&symbol_ref.canonical_id).await.ok();

    let (name, current_price, price_change, price_change_percent) = match detail {
        Some(d) => (
            Some(d.name),
            d.current_price.or_else(|| series.last().map(|c| c.close)),
            d.price_change_24h.unwrap_or(0.0),
            d.price_change_percentage_24h.unwrap_or(0.0),
        ),
        None => (None, series.last().map(|c| c.close), 0.0, 0.0),
    };

    info!(
        symbol = %symbol_ref.display_symbol,
        slug = %symbol_ref.canonical_id,
        candles = series.len(),
        "Returning crypto data"
    );

    Ok(Json(SymbolDataResponse {
        metadata: SymbolMetadata {
            symbol: symbol_ref.display_symbol,
            name,
            sector: None,
            current_price,
            price_change,
            price_change_percent,
        },
        candles: candles_to_response(&series, format),
    }))
}

#[derive(Debug, Serialize)]
pub struct IndicatorResponse {
    pub symbol: String,
    #[serde(flatten)]
    pub report: IndicatorReport,
}

/// GET /indicators/{symbol} - indicator snapshot + historical points
///
/// Computed over six months of daily candles; fewer than 30 available
/// candles is a client error (400), not a provider failure.
#[instrument(skip(state))]
pub async fn get_indicators_handler(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<IndicatorResponse>, AppError> {
    let symbol_ref = resolver::resolve_equity(&symbol);

    // Indicators need daily resolution regardless of the period policy:
    // six months of weekly candles would never reach the 30-candle minimum
    let (raw, _) = state
        .equity
        .fetch_history(
            &symbol_ref.canonical_id,
            Some(Period::SixMonths),
            crate::models::Granularity::Day1,
        )
        .await?;
    let series = normalize(raw);

    let report = indicator_engine::compute(&series)?;

    Ok(Json(IndicatorResponse {
        symbol: symbol_ref.display_symbol,
        report,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StockMatch {
    pub symbol: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CryptoMatch {
    pub symbol: String,
    pub name: String,
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub stocks: Vec<StockMatch>,
    pub cryptos: Vec<CryptoMatch>,
}

/// GET /search?query= - matching symbols across both asset classes
#[instrument(skip(state))]
pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, AppError> {
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::InvalidRequest("No query provided".to_string()))?;

    let stocks = match_stocks(query);

    // Crypto search degrades to empty on provider failure
    let cryptos = match state.crypto.search(query).await {
        Ok(matches) => matches
            .into_iter()
            .take(20)
            .map(|c| CryptoMatch {
                symbol: c.symbol.to_uppercase(),
                name: c.name,
                id: c.id,
            })
            .collect(),
        Err(e) => {
            tracing::warn!("Crypto search failed: {}", e);
            Vec::new()
        }
    };

    Ok(Json(SearchResponse { stocks, cryptos }))
}

fn match_stocks(query: &str) -> Vec<StockMatch> {
    let needle = query.to_lowercase();
    POPULAR_STOCKS
        .iter()
        .filter(|(symbol, name, _)| {
            symbol.to_lowercase().contains(&needle) || name.to_lowercase().contains(&needle)
        })
        .map(|&(symbol, name, _)| StockMatch {
            symbol: symbol.to_string(),
            name: name.to_string(),
        })
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct BatchQuery {
    pub symbols: Option<String>,
    #[serde(default, alias = "assetClass")]
    pub asset_class: AssetClass,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub asset_class: AssetClass,
    pub results: Vec<BatchEntry>,
}

/// GET /batch?symbols=a,b,c&asset_class= - quote summaries for many symbols
///
/// Always returns one entry per requested symbol, in request order, with
/// placeholders for failures; a bad batch never becomes a request error.
#[instrument(skip(state))]
pub async fn batch_handler(
    State(state): State<AppState>,
    Query(params): Query<BatchQuery>,
) -> Result<Json<BatchResponse>, AppError> {
    let symbols: Vec<String> = params
        .symbols
        .as_deref()
        .unwrap_or("")
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if symbols.is_empty() {
        return Err(AppError::InvalidRequest(
            "No symbols provided".to_string(),
        ));
    }

    let results = fetch_batch(
        state.equity.clone(),
        state.crypto.clone(),
        &symbols,
        params.asset_class,
    )
    .await;

    Ok(Json(BatchResponse {
        asset_class: params.asset_class,
        results,
    }))
}

/// GET /market-overview - indices, sectors, gainers/losers
///
/// Individual symbol failures are excluded from the aggregates; the
/// endpoint itself always answers.
#[instrument(skip(state))]
pub async fn market_overview_handler(State(state): State<AppState>) -> Json<MarketOverview> {
    Json(overview::compose_market_overview(state.equity.clone()).await)
}

/// GET /crypto-market-overview - global stats, top coins, trending
#[instrument(skip(state))]
pub async fn crypto_market_overview_handler(
    State(state): State<AppState>,
) -> Result<Json<CryptoOverview>, AppError> {
    let payload = overview::compose_crypto_overview(state.crypto.clone()).await?;
    Ok(Json(payload))
}

#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    pub topic: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NewsResponse {
    pub topic: String,
    pub articles: Vec<NewsArticle>,
}

/// GET /news?topic= - articles for a topic (economy/market/crypto)
#[instrument(skip(state))]
pub async fn news_handler(
    State(state): State<AppState>,
    Query(params): Query<NewsQuery>,
) -> Result<Json<NewsResponse>, AppError> {
    let raw_topic = params.topic.as_deref().unwrap_or("economy");
    let topic = NewsTopic::parse(raw_topic).ok_or_else(|| {
        AppError::InvalidRequest(format!(
            "Unknown topic '{}'. Valid topics: economy, market, crypto",
            raw_topic
        ))
    })?;

    let articles = state.news.fetch_articles(topic).await?;

    Ok(Json(NewsResponse {
        topic: raw_topic.to_lowercase(),
        articles,
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
}

/// GET /health - liveness probe
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "markethub",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Candle;
    use chrono::NaiveDate;

    #[test]
    fn test_candles_formatted_per_policy() {
        let time = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let series = vec![Candle::new(time, 100.0)];

        let daily = candles_to_response(&series, TimestampFormat::Date);
        assert_eq!(daily[0].time, "2024-03-15");

        let intraday = candles_to_response(&series, TimestampFormat::DateTime);
        assert_eq!(intraday[0].time, "2024-03-15 09:30:00");
    }

    #[test]
    fn test_stock_search_matches_symbol_and_name() {
        let by_symbol = match_stocks("aapl");
        assert!(by_symbol.iter().any(|m| m.symbol == "AAPL"));

        let by_name = match_stocks("goldman");
        assert!(by_name.iter().any(|m| m.symbol == "GS"));

        assert!(match_stocks("zzzz").is_empty());
    }
}
