//! Serper (Google results) search provider.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::provider::{news_query, SearchError, SearchProvider};
use super::snippet::RawSnippet;

const SERPER_URL: &str = "https://google.serper.dev/search";

pub struct SerperProvider {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
}

impl SerperProvider {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            endpoint: SERPER_URL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SearchProvider for SerperProvider {
    async fn search(&self, query: &str) -> Result<RawSnippet, SearchError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SearchError::NoApiKey { provider: "serper" })?;

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", api_key)
            .json(&serde_json::json!({ "q": news_query(query) }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::ApiError { status, message });
        }

        let body: Value = response.json().await?;
        let text = collect_snippets(&body);
        if text.is_empty() {
            return Err(SearchError::NoResults { provider: "serper" });
        }
        Ok(RawSnippet::Text(text))
    }

    fn name(&self) -> &'static str {
        "serper"
    }
}

/// Answer box first, then the knowledge graph, then organic snippets.
fn collect_snippets(body: &Value) -> String {
    let mut parts: Vec<&str> = Vec::new();

    if let Some(answer) = body.get("answerBox") {
        if let Some(s) = answer
            .get("answer")
            .or_else(|| answer.get("snippet"))
            .and_then(Value::as_str)
        {
            parts.push(s);
        }
    }
    if let Some(s) = body
        .get("knowledgeGraph")
        .and_then(|kg| kg.get("description"))
        .and_then(Value::as_str)
    {
        parts.push(s);
    }
    if let Some(organic) = body.get("organic").and_then(Value::as_array) {
        parts.extend(
            organic
                .iter()
                .filter_map(|r| r.get("snippet").and_then(Value::as_str)),
        );
    }

    parts
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
