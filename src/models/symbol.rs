use serde::{Deserialize, Serialize};

/// Asset class of a tradable instrument
///
/// Determines which provider resolves and serves the symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    /// Stock tickers, served by the equity chart provider
    #[serde(alias = "stock", alias = "stocks")]
    Equity,

    /// Cryptocurrencies, served by the crypto market-data provider
    #[serde(alias = "cryptos")]
    Crypto,
}

impl Default for AssetClass {
    fn default() -> Self {
        AssetClass::Equity
    }
}

impl AssetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Equity => "equity",
            AssetClass::Crypto => "crypto",
        }
    }
}

/// Canonical reference to a tradable instrument
///
/// Constructed fresh per request by the symbol resolver; never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolRef {
    /// Original user input, unmodified
    pub raw_query: String,

    pub asset_class: AssetClass,

    /// Provider-specific id used for all subsequent calls: the ticker
    /// itself for equities, the provider's internal slug for crypto
    pub canonical_id: String,

    /// Upper-cased short symbol for presentation
    pub display_symbol: String,
}
