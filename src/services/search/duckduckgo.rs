//! DuckDuckGo search provider
//!
//! Uses DuckDuckGo's HTML interface. No API key required.

use async_trait::async_trait;
use reqwest::{header, Client};
use scraper::{Html, Selector};

use super::provider::{news_query, SearchError, SearchProvider};
use super::snippet::RawSnippet;

const DDG_HTML_URL: &str = "https://html.duckduckgo.com/html/";
const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const MAX_SNIPPETS: usize = 5;

pub struct DuckDuckGoProvider {
    client: Client,
    endpoint: String,
}

impl DuckDuckGoProvider {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            endpoint: DDG_HTML_URL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    async fn search(&self, query: &str) -> Result<RawSnippet, SearchError> {
        let q = news_query(query);
        let response = self
            .client
            .post(&self.endpoint)
            // Blocked without a browser-like agent.
            .header(header::USER_AGENT, BROWSER_UA)
            .form(&[("q", q.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SearchError::ApiError {
                status: response.status().as_u16(),
                message: "DuckDuckGo request failed".to_string(),
            });
        }

        let html = response.text().await?;
        let text = parse_snippets(&html, MAX_SNIPPETS);
        if text.is_empty() {
            return Err(SearchError::NoResults {
                provider: "duckduckgo",
            });
        }
        Ok(RawSnippet::Text(text))
    }

    fn name(&self) -> &'static str {
        "duckduckgo"
    }
}

/// Joins the text of the first `max` `.result__snippet` elements.
fn parse_snippets(html: &str, max: usize) -> String {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse(".result__snippet") else {
        return String::new();
    };

    document
        .select(&selector)
        .map(|el| {
            el.text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|s| !s.is_empty())
        .take(max)
        .collect::<Vec<_>>()
        .join(" ")
}
