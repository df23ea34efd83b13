//! Topic search: providers, snippet validation, and the fallback chain that
//! ends in a model-written article when no provider produces usable text.

pub mod duckduckgo;
pub mod fallback;
pub mod provider;
pub mod serper;
pub mod snippet;
pub mod tavily;

use std::sync::Arc;

use reqwest::Client;

pub use fallback::{GeneratedArticle, SearchFallbackChain, TopicArticle};
pub use provider::{SearchError, SearchProvider};
pub use snippet::{is_valid_snippet, preprocess_topic, RawSnippet, ValidatedContent};

use crate::config::Config;

/// Builds providers in the order listed by `SEARCH_PROVIDERS`.
pub fn providers_from_config(config: &Config, client: &Client) -> Vec<Arc<dyn SearchProvider>> {
    let mut providers: Vec<Arc<dyn SearchProvider>> = Vec::new();
    for name in &config.search_providers {
        match name.as_str() {
            "tavily" => providers.push(Arc::new(tavily::TavilyProvider::new(
                client.clone(),
                config.tavily_api_key.clone(),
            ))),
            "duckduckgo" => providers.push(Arc::new(duckduckgo::DuckDuckGoProvider::new(
                client.clone(),
            ))),
            "serper" => providers.push(Arc::new(serper::SerperProvider::new(
                client.clone(),
                config.serper_api_key.clone(),
            ))),
            other => tracing::warn!(provider = other, "Unknown search provider in SEARCH_PROVIDERS, skipping"),
        }
    }
    providers
}
