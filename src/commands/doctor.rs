use crate::models::{Granularity, Period};
use crate::services::{CryptoClient, EquityClient, NewsClient, NewsTopic};
use crate::utils;

/// Probe each provider with a known-good request and report reachability
pub async fn run() {
    println!("🔍 Checking provider connectivity...\n");
    let mut failures = 0;

    match EquityClient::new(utils::get_equity_api_base()) {
        Ok(client) => {
            print!("   Equity provider (AAPL daily history)... ");
            match client
                .fetch_history("AAPL", Some(Period::FiveDays), Granularity::Day1)
                .await
            {
                Ok(_) => println!("✓"),
                Err(e) => {
                    println!("❌ {}", e);
                    failures += 1;
                }
            }
        }
        Err(e) => {
            println!("   Equity provider... ❌ {}", e);
            failures += 1;
        }
    }

    match CryptoClient::new(utils::get_crypto_api_base()) {
        Ok(client) => {
            print!("   Crypto provider (search 'bitcoin')... ");
            match client.search("bitcoin").await {
                Ok(matches) if !matches.is_empty() => println!("✓"),
                Ok(_) => {
                    println!("❌ search returned no results");
                    failures += 1;
                }
                Err(e) => {
                    println!("❌ {}", e);
                    failures += 1;
                }
            }
        }
        Err(e) => {
            println!("   Crypto provider... ❌ {}", e);
            failures += 1;
        }
    }

    match utils::get_news_api_key() {
        Some(key) => match NewsClient::new(utils::get_news_api_base(), Some(key)) {
            Ok(client) => {
                print!("   News provider (economy headlines)... ");
                match client.fetch_articles(NewsTopic::Economy).await {
                    Ok(_) => println!("✓"),
                    Err(e) => {
                        println!("❌ {}", e);
                        failures += 1;
                    }
                }
            }
            Err(e) => {
                println!("   News provider... ❌ {}", e);
                failures += 1;
            }
        },
        None => println!("   News provider... skipped (NEWS_API_KEY not set)"),
    }

    println!();
    if failures == 0 {
        println!("✅ All configured providers reachable");
    } else {
        eprintln!("❌ {} provider check(s) failed", failures);
        std::process::exit(1);
    }
}
