//! Tavily search provider (news-oriented, API key required).

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};

use super::provider::{news_query, SearchError, SearchProvider};
use super::snippet::RawSnippet;

const TAVILY_URL: &str = "https://api.tavily.com/search";

pub struct TavilyProvider {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
}

impl TavilyProvider {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            endpoint: TAVILY_URL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SearchProvider for TavilyProvider {
    async fn search(&self, query: &str) -> Result<RawSnippet, SearchError> {
        #[derive(serde::Serialize)]
        struct Req<'a> {
            api_key: &'a str,
            query: String,
            max_results: u8,
        }
        #[derive(serde::Deserialize)]
        struct Resp {
            #[serde(default)]
            results: Vec<Map<String, Value>>,
        }

        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SearchError::NoApiKey { provider: "tavily" })?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&Req {
                api_key,
                query: news_query(query),
                max_results: 1,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::ApiError { status, message });
        }

        let body: Resp = response.json().await?;
        body.results
            .into_iter()
            .next()
            .map(RawSnippet::Record)
            .ok_or(SearchError::NoResults { provider: "tavily" })
    }

    fn name(&self) -> &'static str {
        "tavily"
    }
}
