use crate::server::{self, AppState};
use crate::services::{CryptoClient, EquityClient, NewsClient};
use crate::utils;
use std::sync::Arc;
use std::time::Instant;

pub async fn run(port: u16) {
    println!("🚀 Starting markethub server on port {}", port);

    let equity_base = utils::get_equity_api_base();
    let crypto_base = utils::get_crypto_api_base();
    let news_base = utils::get_news_api_base();
    println!("📈 Equity provider: {}", equity_base);
    println!("🪙 Crypto provider: {}", crypto_base);
    println!("📰 News provider:   {}", news_base);

    let news_key = utils::get_news_api_key();
    if news_key.is_none() {
        eprintln!("⚠️  NEWS_API_KEY not set - the /news endpoint will return errors");
    }

    let equity = match EquityClient::new(equity_base) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            eprintln!("❌ Failed to create equity client: {}", e);
            std::process::exit(1);
        }
    };
    let crypto = match CryptoClient::new(crypto_base) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            eprintln!("❌ Failed to create crypto client: {}", e);
            std::process::exit(1);
        }
    };
    let news = match NewsClient::new(news_base, news_key) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            eprintln!("❌ Failed to create news client: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState {
        equity,
        crypto,
        news,
        started_at: Instant::now(),
    };

    if let Err(e) = server::serve(state, port).await {
        eprintln!("❌ Server error: {}", e);
        std::process::exit(1);
    }
}
