use std::sync::Arc;

use crate::error::{Error, Result};
use crate::services::extractor::{ContentExtractor, MIN_ARTICLE_CHARS};
use crate::services::llm_service::{CompletionOptions, LanguageModel, CLEANUP_TEMPERATURE};
use crate::services::search::SearchFallbackChain;

/// Placeholder value API explorers fill into an empty `url` field.
const URL_PLACEHOLDER: &str = "string";

/// Strips model chatter and stray symbols, returns clean Markdown.
#[derive(Clone)]
pub struct ArticleFormatter {
    llm: Arc<dyn LanguageModel>,
}

impl ArticleFormatter {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    pub async fn format(&self, article: &str) -> Result<String> {
        let prompt = format!(
            r####"You are a strict article formatter. Clean the raw article below and format it using only clean Markdown.

Remove completely:
- Response markers such as "Sure!", "Here's the cleaned version:", "Certainly!"
- Repeated or duplicated headlines or subheadings
- Extra whitespace, line breaks, or symbols (e.g. "**", ">>", "---", "### Output") that are not part of the article
- Any phrases that are not part of the article itself

Keep and normalize:
- Headline as `#`, subheadings as `##`, section headers as `###`
- Paragraphs with proper sentence spacing and punctuation
- Bullet points, if present in the original content
- Bold or italics only if clearly part of the original content

Output only the cleaned and formatted article, with no commentary.

### Raw Article:
{article}"####
        );
        let cleaned = self
            .llm
            .complete(&prompt, CompletionOptions::with_temperature(CLEANUP_TEMPERATURE))
            .await?;
        Ok(cleaned.trim().to_string())
    }
}

/// Topic or URL in, cleaned article text out.
#[derive(Clone)]
pub struct ArticleService {
    extractor: ContentExtractor,
    search: SearchFallbackChain,
    formatter: ArticleFormatter,
}

impl ArticleService {
    pub fn new(
        extractor: ContentExtractor,
        search: SearchFallbackChain,
        formatter: ArticleFormatter,
    ) -> Self {
        Self {
            extractor,
            search,
            formatter,
        }
    }

    /// A usable URL always wins over the topic, and a failed extraction is
    /// reported rather than retried through search.
    pub async fn get_article(
        &self,
        topic: Option<&str>,
        url: Option<&str>,
        regenerate: bool,
    ) -> Result<String> {
        let topic = topic.map(str::trim).filter(|t| !t.is_empty());
        let url = url
            .map(str::trim)
            .filter(|u| !u.is_empty() && !u.eq_ignore_ascii_case(URL_PLACEHOLDER));

        let article = match (url, topic) {
            (Some(url), _) => {
                tracing::info!(url, "Acquiring article from URL");
                self.extractor.extract(url).await?
            }
            (None, Some(topic)) => {
                tracing::info!(topic, regenerate, "Acquiring article for topic");
                self.search.find_article(topic, regenerate).await?.into_text()
            }
            (None, None) => {
                return Err(Error::Input(
                    "Provide either a topic or a valid URL.".to_string(),
                ))
            }
        };

        let article = article.trim();
        if article.chars().count() < MIN_ARTICLE_CHARS {
            return Err(Error::Generation("No useful content retrieved.".to_string()));
        }

        self.formatter.format(article).await
    }
}
