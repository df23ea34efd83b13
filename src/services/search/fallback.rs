use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::services::llm_service::{CompletionOptions, LanguageModel, FALLBACK_ARTICLE_TEMPERATURE};

use super::provider::SearchProvider;
use super::snippet::{preprocess_topic, ValidatedContent};

/// Model-written explainer. Trusted as-is: it is freshly prompted rather than
/// scraped, so the snippet validator is never applied to it.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedArticle(String);

impl GeneratedArticle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Terminal outcome of [`SearchFallbackChain::find_article`].
#[derive(Debug, Clone, PartialEq)]
pub enum TopicArticle {
    Found {
        provider: &'static str,
        content: ValidatedContent,
    },
    Generated(GeneratedArticle),
}

impl TopicArticle {
    pub fn as_str(&self) -> &str {
        match self {
            TopicArticle::Found { content, .. } => content.as_str(),
            TopicArticle::Generated(article) => article.as_str(),
        }
    }

    pub fn into_text(self) -> String {
        match self {
            TopicArticle::Found { content, .. } => content.into_inner(),
            TopicArticle::Generated(article) => article.0,
        }
    }
}

/// Ordered search providers followed by a generated article.
#[derive(Clone)]
pub struct SearchFallbackChain {
    providers: Vec<Arc<dyn SearchProvider>>,
    llm: Arc<dyn LanguageModel>,
    deadline: Option<Duration>,
}

impl SearchFallbackChain {
    pub fn new(providers: Vec<Arc<dyn SearchProvider>>, llm: Arc<dyn LanguageModel>) -> Self {
        Self {
            providers,
            llm,
            deadline: None,
        }
    }

    /// Bounds the whole provider phase. When it elapses the chain goes
    /// straight to generation.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Only fails on a blank topic or when the generation call itself fails.
    pub async fn find_article(&self, topic: &str, regenerate: bool) -> Result<TopicArticle> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(Error::Input("Topic must not be empty.".to_string()));
        }

        if regenerate {
            tracing::info!(topic, "Regenerate requested, skipping search providers");
        } else {
            let cleaned = preprocess_topic(topic);
            let query = if cleaned.is_empty() {
                topic.to_string()
            } else {
                cleaned
            };

            let found = match self.deadline {
                Some(deadline) => {
                    match tokio::time::timeout(deadline, self.try_providers(&query)).await {
                        Ok(found) => found,
                        Err(_) => {
                            tracing::warn!(
                                topic,
                                deadline_secs = deadline.as_secs(),
                                "Search deadline elapsed"
                            );
                            None
                        }
                    }
                }
                None => self.try_providers(&query).await,
            };

            if let Some(article) = found {
                return Ok(article);
            }
            tracing::warn!(topic, "No usable search result, generating fallback article");
        }

        self.generate(topic).await.map(TopicArticle::Generated)
    }

    async fn try_providers(&self, query: &str) -> Option<TopicArticle> {
        for provider in &self.providers {
            tracing::info!(provider = provider.name(), query, "Trying search provider");
            match provider.search(query).await {
                Ok(raw) => {
                    let content = raw.normalize().and_then(ValidatedContent::check);
                    if let Some(content) = content {
                        tracing::info!(provider = provider.name(), "Provider returned valid content");
                        return Some(TopicArticle::Found {
                            provider: provider.name(),
                            content,
                        });
                    }
                    tracing::warn!(provider = provider.name(), "Provider returned no useful result");
                }
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "Search provider failed");
                }
            }
        }
        None
    }

    async fn generate(&self, topic: &str) -> Result<GeneratedArticle> {
        let prompt = fallback_article_prompt(topic);
        let text = self
            .llm
            .complete(
                &prompt,
                CompletionOptions::with_temperature(FALLBACK_ARTICLE_TEMPERATURE),
            )
            .await?;
        Ok(GeneratedArticle(text.trim().to_string()))
    }
}

fn fallback_article_prompt(topic: &str) -> String {
    format!(
        r#"Write a clear, detailed, and technically accurate article about "{topic}".
It should be around 250-300 words, well-structured, and useful for creating multiple-choice quiz questions.
Include definitions, examples, and practical applications.
Make sure the explanation is original and not repeated from earlier responses."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::search::{RawSnippet, SearchError};
    use async_trait::async_trait;
    use mockall::mock;

    mock! {
        pub Provider {}
        #[async_trait]
        impl SearchProvider for Provider {
            async fn search(&self, query: &str) -> std::result::Result<RawSnippet, SearchError>;
            fn name(&self) -> &'static str;
        }
    }

    mock! {
        pub Model {}
        #[async_trait]
        impl LanguageModel for Model {
            async fn complete(&self, prompt: &str, options: CompletionOptions) -> Result<String>;
        }
    }

    fn long_text(word: &str) -> String {
        vec![word; 40].join(" ")
    }

    fn provider(name: &'static str, reply: std::result::Result<RawSnippet, SearchError>) -> MockProvider {
        let mut p = MockProvider::new();
        p.expect_name().return_const(name);
        let mut reply = Some(reply);
        p.expect_search()
            .times(1)
            .returning(move |_| reply.take().unwrap_or(Err(SearchError::Timeout)));
        p
    }

    fn unused_provider(name: &'static str) -> MockProvider {
        let mut p = MockProvider::new();
        p.expect_name().return_const(name);
        p.expect_search().never();
        p
    }

    fn generating_model(times: usize) -> MockModel {
        let mut m = MockModel::new();
        m.expect_complete()
            .times(times)
            .returning(|_, _| Ok("  A generated explainer.  ".to_string()));
        m
    }

    fn chain(providers: Vec<MockProvider>, model: MockModel) -> SearchFallbackChain {
        SearchFallbackChain::new(
            providers
                .into_iter()
                .map(|p| Arc::new(p) as Arc<dyn SearchProvider>)
                .collect(),
            Arc::new(model),
        )
    }

    #[tokio::test]
    async fn first_valid_snippet_wins() {
        let first = provider("first", Ok(RawSnippet::Text(long_text("ownership"))));
        let second = unused_provider("second");

        let article = chain(vec![first, second], generating_model(0))
            .find_article("Rust ownership", false)
            .await
            .unwrap();
        assert!(matches!(article, TopicArticle::Found { provider: "first", .. }));
    }

    #[tokio::test]
    async fn errors_and_invalid_snippets_advance_the_chain() {
        let failing = provider("failing", Err(SearchError::NoApiKey { provider: "failing" }));
        let short = provider("short", Ok(RawSnippet::Text("too short".into())));
        let good = provider("good", Ok(RawSnippet::Text(long_text("borrowing"))));

        let article = chain(vec![failing, short, good], generating_model(0))
            .find_article("Borrowing", false)
            .await
            .unwrap();
        assert!(matches!(article, TopicArticle::Found { provider: "good", .. }));
        assert!(article.as_str().starts_with("borrowing"));
    }

    #[tokio::test]
    async fn exhausted_providers_end_in_generation() {
        let errored = provider("errored", Ok(RawSnippet::Text(long_text("error"))));
        let empty = provider("empty", Err(SearchError::NoResults { provider: "empty" }));

        let article = chain(vec![errored, empty], generating_model(1))
            .find_article("Tries", false)
            .await
            .unwrap();
        assert_eq!(
            article,
            TopicArticle::Generated(GeneratedArticle("A generated explainer.".into()))
        );
    }

    #[tokio::test]
    async fn generated_text_is_not_validated() {
        // Short and mentions "error", but it's trusted.
        let mut model = MockModel::new();
        model
            .expect_complete()
            .returning(|_, _| Ok("Error handling in Rust.".to_string()));

        let article = chain(vec![], model).find_article("Errors", false).await.unwrap();
        assert_eq!(article.into_text(), "Error handling in Rust.");
    }

    #[tokio::test]
    async fn regenerate_skips_providers() {
        let article = chain(vec![unused_provider("tavily")], generating_model(1))
            .find_article("Graphs", true)
            .await
            .unwrap();
        assert!(matches!(article, TopicArticle::Generated(_)));
    }

    #[tokio::test]
    async fn providers_receive_preprocessed_topic() {
        let mut p = MockProvider::new();
        p.expect_name().return_const("tavily");
        p.expect_search()
            .withf(|query: &str| query == "Binary search trees")
            .times(1)
            .returning(|_| Ok(RawSnippet::Text(long_text("tree"))));

        chain(vec![p], generating_model(0))
            .find_article("binary search trees interview questions", false)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn topic_of_only_junk_is_searched_verbatim() {
        let mut p = MockProvider::new();
        p.expect_name().return_const("tavily");
        p.expect_search()
            .withf(|query: &str| query == "MCQ")
            .times(1)
            .returning(|_| Ok(RawSnippet::Text(long_text("quiz"))));

        chain(vec![p], generating_model(0))
            .find_article("  MCQ ", false)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn fallback_prompt_uses_original_topic_and_temperature() {
        let mut model = MockModel::new();
        model
            .expect_complete()
            .withf(|prompt: &str, options: &CompletionOptions| {
                prompt.contains("\"Rust MCQ\"")
                    && options.temperature == FALLBACK_ARTICLE_TEMPERATURE
            })
            .times(1)
            .returning(|_, _| Ok("text".to_string()));

        chain(vec![], model).find_article("Rust MCQ", false).await.unwrap();
    }

    #[tokio::test]
    async fn blank_topic_is_an_input_error() {
        let err = chain(vec![unused_provider("tavily")], generating_model(0))
            .find_article("   ", false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Input(_)));
    }

    struct SlowProvider;

    #[async_trait]
    impl SearchProvider for SlowProvider {
        async fn search(&self, _query: &str) -> std::result::Result<RawSnippet, SearchError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(RawSnippet::Text(long_text("late")))
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_cuts_the_provider_phase_short() {
        let slow: Arc<dyn SearchProvider> = Arc::new(SlowProvider);
        let chain = SearchFallbackChain::new(vec![slow], Arc::new(generating_model(1)))
            .with_deadline(Some(Duration::from_secs(5)));

        let article = chain.find_article("Async", false).await.unwrap();
        assert!(matches!(article, TopicArticle::Generated(_)));
    }
}
