//! Candle normalizer
//!
//! Converts provider-specific time-series payloads into the canonical
//! `Candle` series. Two raw shapes exist: row-oriented OHLCV records (equity
//! chart provider) and parallel price/volume point arrays (crypto provider,
//! which exposes no true intrabar range). The two are dispatched explicitly
//! as a tagged union, never duck-typed.

use crate::constants::MAX_SERIES_POINTS;
use crate::models::{Candle, Series};
use chrono::NaiveDateTime;

/// Row-oriented record with named OHLCV fields
///
/// Any numeric field may be null in the provider payload; nulls pass
/// through unmodified and are never coerced to zero.
#[derive(Debug, Clone)]
pub struct RawRow {
    pub time: NaiveDateTime,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
}

/// Price/volume point from a provider that only exposes close-side data
#[derive(Debug, Clone)]
pub struct PricePoint {
    pub time: NaiveDateTime,
    pub price: f64,
    pub volume: Option<f64>,
}

/// Raw series in one of the two supported provider shapes
#[derive(Debug, Clone)]
pub enum RawSeries {
    Rows(Vec<RawRow>),
    Points(Vec<PricePoint>),
}

/// Normalize a raw provider series into the canonical candle shape.
///
/// Rows without a close are dropped (the provider reported a gap). For
/// point series, open is synthesized as the previous point's price (the
/// current price for the first point) and high/low are both set to the
/// current price (an approximation, not true intrabar range). Series longer
/// than `MAX_SERIES_POINTS` are downsampled by a fixed stride, and a
/// cumulative VWAP is attached when every retained candle carries volume.
pub fn normalize(raw: RawSeries) -> Series {
    let mut candles = match raw {
        RawSeries::Rows(rows) => rows
            .into_iter()
            .filter_map(|row| {
                let close = row.close?;
                Some(Candle {
                    time: row.time,
                    open: row.open,
                    high: row.high,
                    low: row.low,
                    close,
                    volume: row.volume,
                    vwap: None,
                })
            })
            .collect::<Vec<_>>(),
        RawSeries::Points(points) => {
            let mut candles = Vec::with_capacity(points.len());
            let mut prev_price: Option<f64> = None;
            for point in points {
                candles.push(Candle {
                    time: point.time,
                    open: Some(prev_price.unwrap_or(point.price)),
                    high: Some(point.price),
                    low: Some(point.price),
                    close: point.price,
                    volume: point.volume.map(|v| v.max(0.0) as u64),
                    vwap: None,
                });
                prev_price = Some(point.price);
            }
            candles
        }
    };

    candles.sort_by_key(|c| c.time);
    candles.dedup_by_key(|c| c.time);

    let mut series = downsample(candles, MAX_SERIES_POINTS);
    attach_cumulative_vwap(&mut series);
    series
}

/// Reduce a series to at most `cap` points by taking every k-th candle,
/// k = max(1, len / cap). Deterministic given the input length.
pub fn downsample(candles: Vec<Candle>, cap: usize) -> Vec<Candle> {
    if cap == 0 || candles.len() <= cap {
        return candles;
    }

    let stride = (candles.len() / cap).max(1);
    candles
        .into_iter()
        .step_by(stride)
        .collect()
}

/// Attach a cumulative volume-weighted average price over the returned
/// window. Only computed when every candle in the window carries volume;
/// otherwise the field stays null for the whole series.
fn attach_cumulative_vwap(series: &mut [Candle]) {
    if series.is_empty() || series.iter().any(|c| c.volume.is_none()) {
        return;
    }

    let mut price_volume = 0.0;
    let mut volume_total = 0.0;
    for candle in series.iter_mut() {
        let volume = candle.volume.unwrap_or(0) as f64;
        price_volume += candle.close * volume;
        volume_total += volume;
        if volume_total > 0.0 {
            candle.vwap = Some(price_volume / volume_total);
        }
    }
}
