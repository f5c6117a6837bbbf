//! Watch-lists and tuning constants
//!
//! Fixed symbol lists used by the search and market-overview endpoints.
//! These are configuration data loaded once at process start, never mutated.

/// Maximum number of candles returned per series; longer raw series are
/// downsampled with a fixed stride
pub const MAX_SERIES_POINTS: usize = 300;

/// Minimum number of candles required before any indicator is computed
pub const MIN_CANDLES_FOR_INDICATORS: usize = 30;

/// Number of trailing candles paired with point-in-time indicator values
pub const INDICATOR_HISTORY_POINTS: usize = 30;

/// Number of entries in each of the gainers/losers lists
pub const TOP_MOVERS_COUNT: usize = 5;

/// Coins sampled for the trending up/down percentages in the crypto overview
pub const CRYPTO_SNAPSHOT_SIZE: usize = 100;

/// Coins listed in the crypto overview top section
pub const TOP_COINS_COUNT: usize = 10;

/// Concurrent per-symbol fetches in batch and overview fan-out
pub const BATCH_CONCURRENCY: usize = 4;

/// Maximum crypto provider calls per minute (free tier allowance)
pub const CRYPTO_RATE_LIMIT_PER_MINUTE: u32 = 30;

/// Maximum equity provider calls per minute
pub const EQUITY_RATE_LIMIT_PER_MINUTE: u32 = 120;

/// Maximum articles returned by the news endpoint
pub const MAX_NEWS_ARTICLES: usize = 30;

/// Index symbols shown in the market overview: (provider symbol, display name)
pub const INDEX_SYMBOLS: &[(&str, &str)] = &[
    ("^GSPC", "S&P 500"),
    ("^DJI", "Dow Jones Industrial Average"),
    ("^IXIC", "NASDAQ Composite"),
    ("^RUT", "Russell 2000"),
];

/// Sector proxy ETFs: (provider symbol, sector name)
///
/// Sector changes are computed over a 5-day window, unlike the daily window
/// used for indices.
pub const SECTOR_SYMBOLS: &[(&str, &str)] = &[
    ("XLK", "Technology"),
    ("XLF", "Financials"),
    ("XLE", "Energy"),
    ("XLV", "Health Care"),
    ("XLY", "Consumer Discretionary"),
    ("XLP", "Consumer Staples"),
    ("XLI", "Industrials"),
    ("XLU", "Utilities"),
    ("XLB", "Materials"),
    ("XLRE", "Real Estate"),
    ("XLC", "Communication Services"),
];

/// Popular stocks watch-list: (symbol, display name, sector)
///
/// Backs the equity side of /search and the gainers/losers section of the
/// market overview.
pub const POPULAR_STOCKS: &[(&str, &str, &str)] = &[
    ("AAPL", "Apple Inc.", "Technology"),
    ("GOOGL", "Alphabet Inc.", "Technology"),
    ("MSFT", "Microsoft Corporation", "Technology"),
    ("AMZN", "Amazon.com Inc.", "Consumer Discretionary"),
    ("META", "Meta Platforms Inc.", "Technology"),
    ("NVDA", "NVIDIA Corporation", "Technology"),
    ("INTC", "Intel Corporation", "Technology"),
    ("CSCO", "Cisco Systems Inc.", "Technology"),
    ("ORCL", "Oracle Corporation", "Technology"),
    ("ADBE", "Adobe Inc.", "Technology"),
    ("JPM", "JPMorgan Chase & Co.", "Financials"),
    ("BAC", "Bank of America Corporation", "Financials"),
    ("WFC", "Wells Fargo & Company", "Financials"),
    ("GS", "The Goldman Sachs Group Inc.", "Financials"),
    ("MS", "Morgan Stanley", "Financials"),
    ("V", "Visa Inc.", "Financials"),
    ("MA", "Mastercard Incorporated", "Financials"),
    ("XOM", "Exxon Mobil Corporation", "Energy"),
    ("CVX", "Chevron Corporation", "Energy"),
    ("COP", "ConocoPhillips", "Energy"),
    ("SLB", "Schlumberger Limited", "Energy"),
    ("JNJ", "Johnson & Johnson", "Health Care"),
    ("PFE", "Pfizer Inc.", "Health Care"),
    ("MRK", "Merck & Co. Inc.", "Health Care"),
    ("UNH", "UnitedHealth Group Incorporated", "Health Care"),
    ("ABT", "Abbott Laboratories", "Health Care"),
    ("CAT", "Caterpillar Inc.", "Industrials"),
    ("HON", "Honeywell International Inc.", "Industrials"),
    ("BA", "The Boeing Company", "Industrials"),
    ("UNP", "Union Pacific Corporation", "Industrials"),
    ("MMM", "3M Company", "Industrials"),
    ("WMT", "Walmart Inc.", "Consumer Staples"),
    ("TGT", "Target Corporation", "Consumer Discretionary"),
    ("HD", "The Home Depot Inc.", "Consumer Discretionary"),
    ("COST", "Costco Wholesale Corporation", "Consumer Staples"),
    ("LOW", "Lowe's Companies Inc.", "Consumer Discretionary"),
    ("TSLA", "Tesla Inc.", "Consumer Discretionary"),
    ("NFLX", "Netflix Inc.", "Communication Services"),
    ("PYPL", "PayPal Holdings Inc.", "Financials"),
    ("CRM", "Salesforce Inc.", "Technology"),
    ("UBER", "Uber Technologies Inc.", "Industrials"),
];

/// Look up the display name for a watch-list symbol
pub fn stock_display_name(symbol: &str) -> Option<&'static str> {
    POPULAR_STOCKS
        .iter()
        .find(|(s, _, _)| *s == symbol)
        .map(|(_, name, _)| *name)
}

/// Look up the sector for a watch-list symbol
pub fn stock_sector(symbol: &str) -> Option<&'static str> {
    POPULAR_STOCKS
        .iter()
        .find(|(s, _, _)| *s == symbol)
        .map(|(_, _, sector)| *sector)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_list_lookup() {
        assert_eq!(stock_display_name("AAPL"), Some("Apple Inc."));
        assert_eq!(stock_sector("JPM"), Some("Financials"));
        assert_eq!(stock_display_name("NOPE"), None);
    }

    #[test]
    fn test_watch_list_symbols_are_upper_case() {
        for (symbol, _, _) in POPULAR_STOCKS {
            assert_eq!(*symbol, symbol.to_uppercase());
        }
    }
}
