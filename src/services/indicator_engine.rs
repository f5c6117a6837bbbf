//! Indicator engine
//!
//! Computes the rolling indicator snapshot (RSI-14, SMA-50, EMA-20, rolling
//! VWAP-20) over a normalized series and derives qualitative signals from
//! fixed thresholds. Each signal is evaluated independently, so several may
//! co-occur for one series.

use crate::constants::{INDICATOR_HISTORY_POINTS, MIN_CANDLES_FOR_INDICATORS};
use crate::error::Error;
use crate::models::indicators::{rolling_ema, rolling_rsi, rolling_sma, rolling_vwap};
use crate::models::Series;
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorKind {
    Rsi14,
    Sma50,
    Ema20,
    Vwap20,
    Trend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Oversold,
    Overbought,
    Above,
    Below,
    Bullish,
    Bearish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalStrength {
    Moderate,
    Strong,
}

/// One derived qualitative signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Signal {
    pub indicator: IndicatorKind,
    pub signal: SignalKind,
    pub strength: SignalStrength,
}

/// Scalar indicator snapshot for one series
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorSet {
    pub rsi14: Option<f64>,
    pub sma50: Option<f64>,
    pub ema20: Option<f64>,
    pub vwap_rolling20: Option<f64>,
    pub signals: Vec<Signal>,
}

/// Point-in-time indicator values for charting; unavailable values stay
/// null, never interpolated
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorPoint {
    #[serde(serialize_with = "serialize_time_as_date")]
    pub time: NaiveDateTime,
    pub close: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi14: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma50: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ema20: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vwap20: Option<f64>,
}

fn serialize_time_as_date<S>(time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&time.format("%Y-%m-%d").to_string())
}

/// Full engine output: scalar snapshot plus trailing history
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorReport {
    #[serde(flatten)]
    pub indicators: IndicatorSet,
    pub history: Vec<IndicatorPoint>,
}

/// Compute the indicator snapshot for a normalized series.
///
/// Requires at least `MIN_CANDLES_FOR_INDICATORS` candles; shorter series
/// yield `InsufficientData`.
pub fn compute(series: &Series) -> Result<IndicatorReport, Error> {
    if series.len() < MIN_CANDLES_FOR_INDICATORS {
        return Err(Error::InsufficientData);
    }

    let closes: Vec<f64> = series.iter().map(|c| c.close).collect();
    let volumes: Vec<Option<u64>> = series.iter().map(|c| c.volume).collect();

    let rsi_series = rolling_rsi(&closes, 14);
    let sma_series = rolling_sma(&closes, 50);
    let ema_series = rolling_ema(&closes, 20);
    let vwap_series = rolling_vwap(&closes, &volumes, 20);

    let rsi14 = *rsi_series.last().unwrap_or(&None);
    let sma50 = *sma_series.last().unwrap_or(&None);
    let ema20 = *ema_series.last().unwrap_or(&None);
    let vwap_rolling20 = *vwap_series.last().unwrap_or(&None);

    let last_close = *closes.last().unwrap_or(&0.0);
    let mut signals = Vec::new();
    if let Some(rsi) = rsi14 {
        signals.extend(rsi_signal(rsi));
    }
    if let Some(sma) = sma50 {
        signals.extend(ratio_signal(IndicatorKind::Sma50, last_close, sma, 1.05, 0.95));
    }
    if let Some(ema) = ema20 {
        signals.extend(ratio_signal(IndicatorKind::Ema20, last_close, ema, 1.03, 0.97));
    }
    if let Some(vwap) = vwap_rolling20 {
        signals.extend(ratio_signal(IndicatorKind::Vwap20, last_close, vwap, 1.02, 0.98));
    }
    signals.extend(trend_signal(&closes));

    let start = series.len().saturating_sub(INDICATOR_HISTORY_POINTS);
    let history = (start..series.len())
        .map(|i| IndicatorPoint {
            time: series[i].time,
            close: closes[i],
            rsi14: rsi_series[i],
            sma50: sma_series[i],
            ema20: ema_series[i],
            vwap20: vwap_series[i],
        })
        .collect();

    Ok(IndicatorReport {
        indicators: IndicatorSet {
            rsi14,
            sma50,
            ema20,
            vwap_rolling20,
            signals,
        },
        history,
    })
}

/// RSI thresholds: < 30 strongly oversold, 30–40 moderately oversold,
/// 60–70 moderately overbought, > 70 strongly overbought
fn rsi_signal(rsi: f64) -> Option<Signal> {
    let (signal, strength) = if rsi < 30.0 {
        (SignalKind::Oversold, SignalStrength::Strong)
    } else if rsi <= 40.0 {
        (SignalKind::Oversold, SignalStrength::Moderate)
    } else if rsi > 70.0 {
        (SignalKind::Overbought, SignalStrength::Strong)
    } else if rsi >= 60.0 {
        (SignalKind::Overbought, SignalStrength::Moderate)
    } else {
        return None;
    };

    Some(Signal {
        indicator: IndicatorKind::Rsi14,
        signal,
        strength,
    })
}

/// Price-versus-reference signal with symmetric moderate bands at 1.0 and
/// strong bands at the given ratios
fn ratio_signal(
    indicator: IndicatorKind,
    price: f64,
    reference: f64,
    strong_above: f64,
    strong_below: f64,
) -> Option<Signal> {
    if reference <= 0.0 {
        return None;
    }
    let ratio = price / reference;

    let (signal, strength) = if ratio > strong_above {
        (SignalKind::Above, SignalStrength::Strong)
    } else if ratio > 1.0 {
        (SignalKind::Above, SignalStrength::Moderate)
    } else if ratio < strong_below {
        (SignalKind::Below, SignalStrength::Strong)
    } else if ratio < 1.0 {
        (SignalKind::Below, SignalStrength::Moderate)
    } else {
        return None;
    };

    Some(Signal {
        indicator,
        signal,
        strength,
    })
}

/// Short-term trend: mean of the last 5 closes against the mean of the last
/// 10. Requires at least 10 candles.
fn trend_signal(closes: &[f64]) -> Option<Signal> {
    if closes.len() < 10 {
        return None;
    }

    let mean5 = mean(&closes[closes.len() - 5..]);
    let mean10 = mean(&closes[closes.len() - 10..]);
    if mean10 <= 0.0 {
        return None;
    }
    let ratio = mean5 / mean10;

    let (signal, strength) = if ratio > 1.02 {
        (SignalKind::Bullish, SignalStrength::Strong)
    } else if ratio > 1.0 {
        (SignalKind::Bullish, SignalStrength::Moderate)
    } else if ratio < 0.98 {
        (SignalKind::Bearish, SignalStrength::Strong)
    } else if ratio < 1.0 {
        (SignalKind::Bearish, SignalStrength::Moderate)
    } else {
        return None;
    };

    Some(Signal {
        indicator: IndicatorKind::Trend,
        signal,
        strength,
    })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Candle;
    use chrono::NaiveDate;

    fn daily_series(closes: &[f64], volume: Option<u64>) -> Series {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let time = NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
                    + chrono::Duration::days(i as i64);
                Candle {
                    time,
                    open: Some(close),
                    high: Some(close),
                    low: Some(close),
                    close,
                    volume,
                    vwap: None,
                }
            })
            .collect()
    }

    #[test]
    fn test_insufficient_data_below_thirty_candles() {
        let series = daily_series(&vec![100.0; 29], Some(100));
        assert!(matches!(compute(&series), Err(Error::InsufficientData)));

        let series = daily_series(&vec![100.0; 30], Some(100));
        assert!(compute(&series).is_ok());
    }

    #[test]
    fn test_monotonic_uptrend_scenario() {
        // 35 daily closes rising by 1 with constant volume 100
        let closes: Vec<f64> = (0..35).map(|i| 100.0 + i as f64).collect();
        let series = daily_series(&closes, Some(100));
        let report = compute(&series).unwrap();

        // SMA-50 needs 50 candles
        assert_eq!(report.indicators.sma50, None);

        // Pure uptrend saturates RSI near the ceiling
        let rsi = report.indicators.rsi14.unwrap();
        assert!(rsi > 99.0, "got {}", rsi);

        // EMA-20 lands within the recent close range
        let ema = report.indicators.ema20.unwrap();
        assert!(ema > closes[0] && ema < *closes.last().unwrap());

        // 5-day mean exceeds 10-day mean by more than 2%
        let trend = report
            .indicators
            .signals
            .iter()
            .find(|s| s.indicator == IndicatorKind::Trend)
            .unwrap();
        assert_eq!(trend.signal, SignalKind::Bullish);
        assert_eq!(trend.strength, SignalStrength::Strong);
    }

    #[test]
    fn test_history_capped_at_thirty_points() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i % 7) as f64).collect();
        let series = daily_series(&closes, Some(100));
        let report = compute(&series).unwrap();

        assert_eq!(report.history.len(), 30);
        assert_eq!(report.history.last().unwrap().close, *closes.last().unwrap());
        // SMA-50 only exists from index 49 onward
        assert_eq!(report.history[0].sma50, None);
        assert!(report.history.last().unwrap().sma50.is_some());
    }

    #[test]
    fn test_vwap_null_without_volume() {
        let closes: Vec<f64> = (0..35).map(|i| 100.0 + i as f64).collect();
        let series = daily_series(&closes, None);
        let report = compute(&series).unwrap();

        assert_eq!(report.indicators.vwap_rolling20, None);
        assert!(!report
            .indicators
            .signals
            .iter()
            .any(|s| s.indicator == IndicatorKind::Vwap20));
    }

    #[test]
    fn test_rsi_signal_thresholds() {
        let strong = rsi_signal(25.0).unwrap();
        assert_eq!(
            (strong.signal, strong.strength),
            (SignalKind::Oversold, SignalStrength::Strong)
        );

        let moderate = rsi_signal(35.0).unwrap();
        assert_eq!(
            (moderate.signal, moderate.strength),
            (SignalKind::Oversold, SignalStrength::Moderate)
        );

        assert!(rsi_signal(50.0).is_none());

        let moderate = rsi_signal(65.0).unwrap();
        assert_eq!(
            (moderate.signal, moderate.strength),
            (SignalKind::Overbought, SignalStrength::Moderate)
        );

        let strong = rsi_signal(75.0).unwrap();
        assert_eq!(
            (strong.signal, strong.strength),
            (SignalKind::Overbought, SignalStrength::Strong)
        );
    }

    #[test]
    fn test_ratio_signal_thresholds() {
        let strong = ratio_signal(IndicatorKind::Sma50, 106.0, 100.0, 1.05, 0.95).unwrap();
        assert_eq!(
            (strong.signal, strong.strength),
            (SignalKind::Above, SignalStrength::Strong)
        );

        let moderate = ratio_signal(IndicatorKind::Sma50, 102.0, 100.0, 1.05, 0.95).unwrap();
        assert_eq!(
            (moderate.signal, moderate.strength),
            (SignalKind::Above, SignalStrength::Moderate)
        );

        let strong = ratio_signal(IndicatorKind::Sma50, 94.0, 100.0, 1.05, 0.95).unwrap();
        assert_eq!(
            (strong.signal, strong.strength),
            (SignalKind::Below, SignalStrength::Strong)
        );

        // Exactly at the reference: no signal either way
        assert!(ratio_signal(IndicatorKind::Sma50, 100.0, 100.0, 1.05, 0.95).is_none());
    }

    #[test]
    fn test_multiple_signals_co_occur() {
        let closes: Vec<f64> = (0..35).map(|i| 100.0 + i as f64).collect();
        let series = daily_series(&closes, Some(100));
        let report = compute(&series).unwrap();

        // Uptrend drives overbought RSI, price above EMA20/VWAP20, bullish
        // trend, all at once
        assert!(report.indicators.signals.len() >= 3);
    }
}
