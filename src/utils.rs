/// Get equity provider base URL from environment variable or use default
pub fn get_equity_api_base() -> String {
    std::env::var("EQUITY_API_BASE")
        .unwrap_or_else(|_| "https://query1.finance.yahoo.com".to_string())
}

/// Get crypto provider base URL from environment variable or use default
pub fn get_crypto_api_base() -> String {
    std::env::var("CRYPTO_API_BASE").unwrap_or_else(|_| "https://api.coingecko.com".to_string())
}

/// Get news provider base URL from environment variable or use default
pub fn get_news_api_base() -> String {
    std::env::var("NEWS_API_BASE").unwrap_or_else(|_| "https://newsapi.org".to_string())
}

/// Get news provider API key (required for the /news endpoint)
pub fn get_news_api_key() -> Option<String> {
    std::env::var("NEWS_API_KEY").ok().filter(|k| !k.is_empty())
}

/// Get server port from PORT environment variable or use default
pub fn get_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_port() {
        std::env::remove_var("PORT");
        assert_eq!(get_port(), 8080);
    }
}
