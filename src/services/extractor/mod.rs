//! URL to article text, through an ordered chain of extraction strategies.
//!
//! Strategies run cheapest and most accurate first. The first one that
//! produces more than [`MIN_ARTICLE_CHARS`] characters wins; a strategy
//! failure is logged and the next one is tried.

pub mod html;
pub mod strategies;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};

pub use strategies::{ArticleBodyStrategy, PageTextStrategy, RenderedPageStrategy};

/// Extracted text must be longer than this to count as an article.
pub const MIN_ARTICLE_CHARS: usize = 100;

/// Failure of a single strategy. Never leaves the extractor.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("no API key configured for {0}")]
    NoApiKey(&'static str),

    #[error("{0}")]
    Upstream(String),
}

#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    async fn extract(&self, url: &Url) -> std::result::Result<String, ExtractError>;

    fn name(&self) -> &'static str;
}

#[derive(Clone)]
pub struct ContentExtractor {
    strategies: Vec<Arc<dyn ExtractionStrategy>>,
}

impl ContentExtractor {
    pub fn new(strategies: Vec<Arc<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Article body, then whole-page text, then a rendering fetch.
    pub fn from_config(config: &Config, client: &Client) -> Self {
        let strategies: Vec<Arc<dyn ExtractionStrategy>> = vec![
            Arc::new(ArticleBodyStrategy::new(client.clone())),
            Arc::new(PageTextStrategy::new(client.clone())),
            Arc::new(RenderedPageStrategy::new(
                client.clone(),
                config.firecrawl_api_key.clone(),
            )),
        ];
        Self::new(strategies)
    }

    pub async fn extract(&self, url: &str) -> Result<String> {
        let url = parse_article_url(url)?;

        for strategy in &self.strategies {
            match strategy.extract(&url).await {
                Ok(text) => {
                    let text = text.trim();
                    let chars = text.chars().count();
                    if chars > MIN_ARTICLE_CHARS {
                        tracing::info!(strategy = strategy.name(), %url, chars, "Extracted article text");
                        return Ok(text.to_string());
                    }
                    tracing::warn!(strategy = strategy.name(), %url, chars, "Extracted text too short");
                }
                Err(e) => {
                    tracing::warn!(strategy = strategy.name(), %url, error = %e, "Extraction strategy failed");
                }
            }
        }

        Err(Error::Extraction(
            "Article content is empty or could not be parsed".to_string(),
        ))
    }
}

/// Accepts absolute http(s) URLs with a host.
pub fn parse_article_url(raw: &str) -> Result<Url> {
    let invalid = || Error::Extraction("Invalid URL format".to_string());
    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    let web_scheme = matches!(url.scheme(), "http" | "https");
    if !web_scheme || url.host_str().map_or(true, str::is_empty) {
        return Err(invalid());
    }
    Ok(url)
}
