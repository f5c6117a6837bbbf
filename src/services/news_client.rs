//! News provider client
//!
//! Proxies a NewsAPI-style endpoint for a fixed set of topics and reshapes
//! articles into the client-facing schema.

use crate::constants::MAX_NEWS_ARTICLES;
use crate::error::Error;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Supported news topics, mapped to provider query strings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsTopic {
    Economy,
    Market,
    Crypto,
}

impl NewsTopic {
    pub fn parse(s: &str) -> Option<NewsTopic> {
        match s.to_lowercase().as_str() {
            "economy" => Some(NewsTopic::Economy),
            "market" => Some(NewsTopic::Market),
            "crypto" => Some(NewsTopic::Crypto),
            _ => None,
        }
    }

    fn query(&self) -> &'static str {
        match self {
            NewsTopic::Economy => "economy",
            NewsTopic::Market => "stock market",
            NewsTopic::Crypto => "cryptocurrency",
        }
    }
}

/// Article in the client-facing schema
#[derive(Debug, Clone, Serialize)]
pub struct NewsArticle {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub url: String,
    #[serde(rename = "publishedAt", skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    source: Option<RawSource>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    name: Option<String>,
}

pub struct NewsClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl NewsClient {
    pub fn new(base_url: String, api_key: Option<String>) -> Result<Self, Error> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent("markethub/0.1")
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// Fetch articles for a topic, dropping entries without title or url
    pub async fn fetch_articles(&self, topic: NewsTopic) -> Result<Vec<NewsArticle>, Error> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Config("NEWS_API_KEY is not set".to_string()))?;

        let url = format!(
            "{}/v2/everything?q={}&sortBy=publishedAt&language=en&apiKey={}",
            self.base_url,
            topic.query().replace(' ', "%20"),
            api_key
        );
        debug!(?topic, "Fetching news");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let payload: NewsResponse = response.json().await?;
        if payload.status != "ok" {
            return Err(Error::Upstream {
                status: status.as_u16(),
                message: payload
                    .message
                    .unwrap_or_else(|| "Unable to fetch news".to_string()),
            });
        }

        Ok(reshape_articles(payload.articles))
    }
}

fn reshape_articles(raw: Vec<RawArticle>) -> Vec<NewsArticle> {
    raw.into_iter()
        .filter_map(|article| {
            // Title and url are mandatory in the client schema
            let title = article.title?;
            let url = article.url?;
            Some(NewsArticle {
                title,
                description: article.description,
                url,
                published_at: article.published_at,
                source: article.source.and_then(|s| s.name),
            })
        })
        .take(MAX_NEWS_ARTICLES)
        .collect()
}
