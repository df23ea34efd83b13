//! Search provider trait definition

use async_trait::async_trait;
use thiserror::Error;

use super::snippet::RawSnippet;

/// Errors a single provider can raise. The fallback chain treats every one of
/// them exactly like an unusable snippet and moves on.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("No API key configured for {provider}")]
    NoApiKey { provider: &'static str },

    #[error("Search API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Search timeout")]
    Timeout,

    #[error("{provider} returned no results")]
    NoResults { provider: &'static str },
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SearchError::Timeout
        } else {
            SearchError::ApiError {
                status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                message: e.to_string(),
            }
        }
    }
}

/// One external source of topic text.
///
/// Implementations return whatever shape their upstream produces; the chain
/// normalizes it into a single string before validation.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<RawSnippet, SearchError>;

    /// Name used in logs.
    fn name(&self) -> &'static str;
}

/// Providers search for recent coverage of the subject.
pub(crate) fn news_query(topic: &str) -> String {
    format!("{} news", topic)
}
