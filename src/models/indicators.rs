//! Rolling technical indicator calculations
//!
//! All functions take a close-price slice (and volumes where relevant) and
//! return a vector of the same length, with `None` for every index where the
//! lookback window is not yet filled. Values are never interpolated.

/// Simple moving average over `period` closes
pub fn rolling_sma(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut values = vec![None; closes.len()];

    if period == 0 || closes.len() < period {
        return values;
    }

    let mut window_sum: f64 = closes[..period].iter().sum();
    values[period - 1] = Some(window_sum / period as f64);

    for i in period..closes.len() {
        window_sum += closes[i] - closes[i - period];
        values[i] = Some(window_sum / period as f64);
    }

    values
}

/// Exponential moving average over `period` closes
///
/// Seeded with the simple average of the first `period` closes, then the
/// standard recursion with smoothing factor 2 / (period + 1).
pub fn rolling_ema(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut values = vec![None; closes.len()];

    if period == 0 || closes.len() < period {
        return values;
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut ema: f64 = closes[..period].iter().sum::<f64>() / period as f64;
    values[period - 1] = Some(ema);

    for i in period..closes.len() {
        ema = (closes[i] - ema) * alpha + ema;
        values[i] = Some(ema);
    }

    values
}

/// Wilder relative strength index over `period` closes
///
/// Seeded from the first window's average gain/loss (Wilder's worksheet
/// convention: the first close carries no change), then smoothed with the
/// (period - 1) / period recursion. Output is bounded [0, 100]; a window
/// with zero losses saturates at 100.
pub fn rolling_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut values = vec![None; closes.len()];

    if period == 0 || closes.len() < period {
        return values;
    }

    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;
    for i in 1..period {
        let change = closes[i] - closes[i - 1];
        if change > 0.0 {
            gain_sum += change;
        } else {
            loss_sum -= change;
        }
    }

    let mut avg_gain = gain_sum / period as f64;
    let mut avg_loss = loss_sum / period as f64;
    values[period - 1] = Some(rsi_from_averages(avg_gain, avg_loss));

    let w = period as f64;
    for i in period..closes.len() {
        let change = closes[i] - closes[i - 1];
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { -change } else { 0.0 };

        avg_gain = (avg_gain * (w - 1.0) + gain) / w;
        avg_loss = (avg_loss * (w - 1.0) + loss) / w;
        values[i] = Some(rsi_from_averages(avg_gain, avg_loss));
    }

    values
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    }
}

/// Rolling volume-weighted average price over `period` candles
///
/// Requires volume for every candle in the window; windows with a missing
/// volume or zero total volume yield `None`.
pub fn rolling_vwap(
    closes: &[f64],
    volumes: &[Option<u64>],
    period: usize,
) -> Vec<Option<f64>> {
    let len = closes.len().min(volumes.len());
    let mut values = vec![None; closes.len()];

    if period == 0 || len < period {
        return values;
    }

    for i in (period - 1)..len {
        let window = (i + 1 - period)..=i;
        let mut price_volume = 0.0;
        let mut volume_total = 0.0;
        let mut complete = true;

        for j in window {
            match volumes[j] {
                Some(v) => {
                    price_volume += closes[j] * v as f64;
                    volume_total += v as f64;
                }
                None => {
                    complete = false;
                    break;
                }
            }
        }

        if complete && volume_total > 0.0 {
            values[i] = Some(price_volume / volume_total);
        }
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_window_boundary() {
        let closes = vec![10.0, 11.0, 12.0, 13.0, 14.0, 15.0];
        let ma3 = rolling_sma(&closes, 3);

        assert_eq!(ma3[0], None);
        assert_eq!(ma3[1], None);
        assert_eq!(ma3[2], Some(11.0)); // (10+11+12)/3
        assert_eq!(ma3[3], Some(12.0));
        assert_eq!(ma3[5], Some(14.0));
    }

    #[test]
    fn test_sma_null_iff_short_series() {
        let closes = vec![1.0; 49];
        assert!(rolling_sma(&closes, 50).iter().all(|v| v.is_none()));

        let closes = vec![1.0; 50];
        assert!(rolling_sma(&closes, 50).last().unwrap().is_some());
    }

    #[test]
    fn test_ema_seeded_with_sma() {
        let closes = vec![1.0, 2.0, 3.0, 4.0];
        let ema3 = rolling_ema(&closes, 3);

        assert_eq!(ema3[0], None);
        assert_eq!(ema3[1], None);
        assert_eq!(ema3[2], Some(2.0)); // seed = (1+2+3)/3
        // alpha = 0.5: (4 - 2) * 0.5 + 2 = 3
        assert_eq!(ema3[3], Some(3.0));
    }

    #[test]
    fn test_rsi_saturates_in_pure_uptrend() {
        let closes: Vec<f64> = (0..35).map(|i| 100.0 + i as f64).collect();
        let rsi = rolling_rsi(&closes, 14);

        assert_eq!(rsi[12], None);
        let last = rsi.last().unwrap().unwrap();
        assert!(last > 99.0, "pure uptrend should saturate RSI, got {}", last);
    }

    #[test]
    fn test_rsi_pure_downtrend_near_zero() {
        let closes: Vec<f64> = (0..35).map(|i| 100.0 - i as f64).collect();
        let last = rolling_rsi(&closes, 14).last().unwrap().unwrap();
        assert!(last < 1.0, "pure downtrend should floor RSI, got {}", last);
    }

    #[test]
    fn test_rsi_null_iff_short_series() {
        let closes = vec![1.0; 13];
        assert!(rolling_rsi(&closes, 14).iter().all(|v| v.is_none()));

        let closes = vec![1.0; 14];
        assert!(rolling_rsi(&closes, 14).last().unwrap().is_some());
    }

    #[test]
    fn test_rsi_bounded() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            45.61, 46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64,
        ];
        for value in rolling_rsi(&closes, 14).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn test_rolling_vwap_requires_complete_volume() {
        let closes = vec![10.0, 20.0, 30.0, 40.0];
        let volumes = vec![Some(100), Some(100), None, Some(100)];
        let vwap = rolling_vwap(&closes, &volumes, 2);

        assert_eq!(vwap[0], None);
        assert_eq!(vwap[1], Some(15.0));
        assert_eq!(vwap[2], None); // window covers the missing volume
        assert_eq!(vwap[3], None);
    }

    #[test]
    fn test_rolling_vwap_weights_by_volume() {
        let closes = vec![10.0, 20.0];
        let volumes = vec![Some(300), Some(100)];
        let vwap = rolling_vwap(&closes, &volumes, 2);
        // (10*300 + 20*100) / 400 = 12.5
        assert_eq!(vwap[1], Some(12.5));
    }
}
