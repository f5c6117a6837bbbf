use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One OHLCV sample in the canonical shape
///
/// `close` is always present; the remaining numeric fields are nullable
/// because providers omit them for thin bars. Timestamps are second
/// precision and timezone-naive (provider-local).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: NaiveDateTime,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,

    pub close: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,

    /// Cumulative volume-weighted average price from the start of the
    /// returned window; present only when every candle carries volume
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vwap: Option<f64>,
}

impl Candle {
    pub fn new(time: NaiveDateTime, close: f64) -> Self {
        Self {
            time,
            open: None,
            high: None,
            low: None,
            close,
            volume: None,
            vwap: None,
        }
    }
}

/// Ordered candle sequence, ascending by timestamp, no duplicate timestamps
pub type Series = Vec<Candle>;
