use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse requested time range, as accepted by the `period` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "5y")]
    FiveYears,
}

/// Provider fetch granularity for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Minute5,
    Hour1,
    Day1,
    Week1,
    Month1,
}

impl Granularity {
    /// Interval string understood by the equity chart provider
    pub fn to_provider_interval(&self) -> &'static str {
        match self {
            Granularity::Minute5 => "5m",
            Granularity::Hour1 => "1h",
            Granularity::Day1 => "1d",
            Granularity::Week1 => "1wk",
            Granularity::Month1 => "1mo",
        }
    }
}

/// Display format for candle timestamps in API responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampFormat {
    /// YYYY-MM-DD
    Date,
    /// YYYY-MM-DD HH:MM:SS
    DateTime,
}

impl TimestampFormat {
    pub fn format(&self, time: NaiveDateTime) -> String {
        match self {
            TimestampFormat::Date => time.format("%Y-%m-%d").to_string(),
            TimestampFormat::DateTime => time.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

impl Period {
    /// Parse a period string; unknown values return None and callers fall
    /// back to the default policy rather than erroring
    pub fn parse(s: &str) -> Option<Period> {
        match s {
            "1d" => Some(Period::OneDay),
            "5d" => Some(Period::FiveDays),
            "1mo" => Some(Period::OneMonth),
            "3mo" => Some(Period::ThreeMonths),
            "6mo" => Some(Period::SixMonths),
            "1y" => Some(Period::OneYear),
            "5y" => Some(Period::FiveYears),
            _ => None,
        }
    }

    /// Range string understood by the equity chart provider
    pub fn to_provider_range(&self) -> &'static str {
        match self {
            Period::OneDay => "1d",
            Period::FiveDays => "5d",
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::FiveYears => "5y",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_provider_range())
    }
}

/// Map a requested period to fetch granularity and display timestamp format.
///
/// Unrecognized periods (None) fall back to daily granularity with date-only
/// timestamps, never an error.
pub fn interval_for(period: Option<Period>) -> (Granularity, TimestampFormat) {
    match period {
        Some(Period::OneDay) => (Granularity::Minute5, TimestampFormat::DateTime),
        Some(Period::FiveDays) => (Granularity::Hour1, TimestampFormat::DateTime),
        Some(Period::OneMonth) => (Granularity::Day1, TimestampFormat::Date),
        Some(Period::ThreeMonths) => (Granularity::Day1, TimestampFormat::Date),
        Some(Period::SixMonths) => (Granularity::Week1, TimestampFormat::Date),
        Some(Period::OneYear) => (Granularity::Month1, TimestampFormat::Date),
        Some(Period::FiveYears) => (Granularity::Month1, TimestampFormat::Date),
        None => (Granularity::Day1, TimestampFormat::Date),
    }
}

/// Day-count equivalent of a period, for providers whose history endpoint is
/// parameterized by day-count rather than a named range.
///
/// The fallback mirrors `interval_for`: unknown periods behave like 1mo.
pub fn day_count(period: Option<Period>) -> u32 {
    match period {
        Some(Period::OneDay) => 1,
        Some(Period::FiveDays) => 5,
        Some(Period::OneMonth) => 30,
        Some(Period::ThreeMonths) => 90,
        Some(Period::SixMonths) => 180,
        Some(Period::OneYear) => 365,
        Some(Period::FiveYears) => 1825,
        None => 30,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_table_matches_policy() {
        let cases = [
            ("1d", Granularity::Minute5, TimestampFormat::DateTime),
            ("5d", Granularity::Hour1, TimestampFormat::DateTime),
            ("1mo", Granularity::Day1, TimestampFormat::Date),
            ("3mo", Granularity::Day1, TimestampFormat::Date),
            ("6mo", Granularity::Week1, TimestampFormat::Date),
            ("1y", Granularity::Month1, TimestampFormat::Date),
            ("5y", Granularity::Month1, TimestampFormat::Date),
        ];
        for (raw, granularity, format) in cases {
            let period = Period::parse(raw);
            assert!(period.is_some(), "{} should parse", raw);
            assert_eq!(interval_for(period), (granularity, format), "period {}", raw);
        }
    }

    #[test]
    fn test_unknown_period_falls_back_to_daily() {
        for raw in ["2w", "max", "", "1D", "ytd"] {
            let period = Period::parse(raw);
            assert!(period.is_none());
            assert_eq!(
                interval_for(period),
                (Granularity::Day1, TimestampFormat::Date)
            );
        }
    }

    #[test]
    fn test_day_count_table() {
        let cases = [
            ("1d", 1),
            ("5d", 5),
            ("1mo", 30),
            ("3mo", 90),
            ("6mo", 180),
            ("1y", 365),
            ("5y", 1825),
        ];
        for (raw, days) in cases {
            assert_eq!(day_count(Period::parse(raw)), days, "period {}", raw);
        }
        assert_eq!(day_count(None), 30);
    }

    #[test]
    fn test_timestamp_formats() {
        let time = chrono::NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(TimestampFormat::Date.format(time), "2024-03-15");
        assert_eq!(
            TimestampFormat::DateTime.format(time),
            "2024-03-15 09:30:00"
        );
    }
}
