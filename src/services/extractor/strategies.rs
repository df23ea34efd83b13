use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::json;
use url::Url;

use super::html;
use super::{ExtractError, ExtractionStrategy};

const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const FIRECRAWL_SCRAPE_URL: &str = "https://api.firecrawl.dev/v1/scrape";

async fn fetch_html(client: &Client, url: &Url) -> Result<String, ExtractError> {
    let response = client
        .get(url.as_str())
        .header(header::USER_AGENT, BROWSER_UA)
        .header(header::ACCEPT, "text/html,application/xhtml+xml")
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(ExtractError::Status(response.status().as_u16()));
    }
    Ok(response.text().await?)
}

/// Semantic article containers with boilerplate removed.
pub struct ArticleBodyStrategy {
    client: Client,
}

impl ArticleBodyStrategy {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ExtractionStrategy for ArticleBodyStrategy {
    async fn extract(&self, url: &Url) -> Result<String, ExtractError> {
        let page = fetch_html(&self.client, url).await?;
        html::article_body(&page)
            .ok_or_else(|| ExtractError::Upstream("no article container found".to_string()))
    }

    fn name(&self) -> &'static str {
        "article_body"
    }
}

/// Whole-page visible text, no article heuristics.
pub struct PageTextStrategy {
    client: Client,
}

impl PageTextStrategy {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ExtractionStrategy for PageTextStrategy {
    async fn extract(&self, url: &Url) -> Result<String, ExtractError> {
        let page = fetch_html(&self.client, url).await?;
        Ok(html::page_text(&page))
    }

    fn name(&self) -> &'static str {
        "page_text"
    }
}

/// Firecrawl scrape API for pages that only render with JavaScript.
pub struct RenderedPageStrategy {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
}

impl RenderedPageStrategy {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            endpoint: FIRECRAWL_SCRAPE_URL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl ExtractionStrategy for RenderedPageStrategy {
    async fn extract(&self, url: &Url) -> Result<String, ExtractError> {
        #[derive(serde::Deserialize)]
        struct ScrapeData {
            markdown: Option<String>,
        }
        #[derive(serde::Deserialize)]
        struct ScrapeResp {
            #[serde(default)]
            success: bool,
            data: Option<ScrapeData>,
            error: Option<String>,
        }

        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ExtractError::NoApiKey("firecrawl"))?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&json!({ "url": url.as_str(), "formats": ["markdown"] }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ExtractError::Status(response.status().as_u16()));
        }

        let body: ScrapeResp = response.json().await?;
        if !body.success {
            return Err(ExtractError::Upstream(
                body.error.unwrap_or_else(|| "scrape unsuccessful".to_string()),
            ));
        }
        body.data
            .and_then(|d| d.markdown)
            .ok_or_else(|| ExtractError::Upstream("scrape returned no markdown".to_string()))
    }

    fn name(&self) -> &'static str {
        "rendered_page"
    }
}
