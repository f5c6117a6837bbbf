//! Symbol resolver
//!
//! Maps a user-supplied, possibly ambiguous ticker string to the canonical
//! provider identifier for its asset class. Equity providers index by ticker
//! directly, so resolution is pure string work; the crypto provider indexes
//! by an internal slug and requires a search round trip.
//!
//! Crypto resolution takes the FIRST search match. Ticker collisions across
//! coins make this inherently ambiguous; first-match is a documented
//! tie-break policy, not a correctness guarantee.

use crate::error::Error;
use crate::models::{AssetClass, SymbolRef};
use crate::services::crypto_client::CryptoClient;
use tracing::debug;

/// Resolve an equity ticker. No network lookup: the canonical id is the
/// upper-cased ticker itself, and existence is only confirmed once a
/// provider fetch succeeds.
pub fn resolve_equity(raw_query: &str) -> SymbolRef {
    let ticker = raw_query.trim().to_uppercase();
    SymbolRef {
        raw_query: raw_query.to_string(),
        asset_class: AssetClass::Equity,
        canonical_id: ticker.clone(),
        display_symbol: ticker,
    }
}

/// Strip one trailing case-insensitive "USDT" pair suffix before searching.
/// Clients habitually send exchange pair symbols (BTCUSDT) where the
/// provider expects the bare coin ticker.
pub fn strip_pair_suffix(raw_query: &str) -> &str {
    let trimmed = raw_query.trim();
    let len = trimmed.len();
    if len > 4
        && trimmed.is_char_boundary(len - 4)
        && trimmed[len - 4..].eq_ignore_ascii_case("usdt")
    {
        &trimmed[..len - 4]
    } else {
        trimmed
    }
}

/// Resolve a crypto symbol to the provider's internal slug via search
pub async fn resolve_crypto(
    client: &CryptoClient,
    raw_query: &str,
) -> Result<SymbolRef, Error> {
    let query = strip_pair_suffix(raw_query);
    let matches = client.search(query).await?;

    let first = matches.into_iter().next().ok_or_else(|| {
        Error::NotFound(format!("No cryptocurrency found for '{}'", raw_query))
    })?;
    debug!(raw_query, slug = %first.id, "Resolved crypto symbol");

    Ok(SymbolRef {
        raw_query: raw_query.to_string(),
        asset_class: AssetClass::Crypto,
        canonical_id: first.id,
        display_symbol: first.symbol.to_uppercase(),
    })
}

/// Resolve one symbol for the given asset class
pub async fn resolve(
    client: &CryptoClient,
    raw_query: &str,
    asset_class: AssetClass,
) -> Result<SymbolRef, Error> {
    match asset_class {
        AssetClass::Equity => Ok(resolve_equity(raw_query)),
        AssetClass::Crypto => resolve_crypto(client, raw_query).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equity_resolution_uppercases_without_lookup() {
        let symbol = resolve_equity(" aapl ");
        assert_eq!(symbol.canonical_id, "AAPL");
        assert_eq!(symbol.display_symbol, "AAPL");
        assert_eq!(symbol.raw_query, " aapl ");
        assert_eq!(symbol.asset_class, AssetClass::Equity);
    }

    #[test]
    fn test_pair_suffix_stripping() {
        assert_eq!(strip_pair_suffix("BTCUSDT"), "BTC");
        assert_eq!(strip_pair_suffix("btcusdt"), "btc");
        assert_eq!(strip_pair_suffix("ethUsdt"), "eth");
        assert_eq!(strip_pair_suffix("BTC"), "BTC");
        // A bare "USDT" query is the stablecoin itself, not a pair
        assert_eq!(strip_pair_suffix("USDT"), "USDT");
        assert_eq!(strip_pair_suffix("usdt"), "usdt");
    }
}
