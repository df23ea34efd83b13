pub mod config;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::config::Config;
use crate::services::{
    article_service::{ArticleFormatter, ArticleService},
    chat_service::ChatService,
    document_service::DocumentService,
    embed_service::{EmbedService, Embedder},
    extractor::ContentExtractor,
    llm_service::{ChatCompletionsClient, LanguageModel},
    question_service::QuestionService,
    search::{providers_from_config, SearchFallbackChain},
    vector_store::VectorStore,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub article_service: ArticleService,
    pub question_service: QuestionService,
    pub document_service: DocumentService,
    pub chat_service: ChatService,
}

impl AppState {
    pub fn new(config: &Config) -> error::Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        let llm: Arc<dyn LanguageModel> = Arc::new(ChatCompletionsClient::new(
            http_client.clone(),
            config.llm_base_url.clone(),
            config.llm_api_key.clone(),
            config.generation_model.clone(),
        ));
        let embedder: Arc<dyn Embedder> = Arc::new(EmbedService::new(
            http_client.clone(),
            config.embedding_base_url.clone(),
            config.embedding_api_key.clone(),
            config.embedding_model.clone(),
        ));
        let extractor = ContentExtractor::from_config(config, &http_client);
        let search = SearchFallbackChain::new(providers_from_config(config, &http_client), llm.clone())
            .with_deadline(
                (config.search_deadline_secs > 0)
                    .then(|| Duration::from_secs(config.search_deadline_secs)),
            );

        Ok(Self::from_parts(
            config.clone(),
            llm,
            embedder,
            extractor,
            search,
        ))
    }

    /// Wires services around the given collaborators. Tests use this to swap
    /// in fake models, embedders, extractors and providers.
    pub fn from_parts(
        config: Config,
        llm: Arc<dyn LanguageModel>,
        embedder: Arc<dyn Embedder>,
        extractor: ContentExtractor,
        search: SearchFallbackChain,
    ) -> Self {
        let document_service = DocumentService::new(config.max_upload_bytes);
        let article_service = ArticleService::new(
            extractor.clone(),
            search,
            ArticleFormatter::new(llm.clone()),
        );
        let question_service = QuestionService::new(
            llm.clone(),
            config.generation_temperature,
            config.shuffle_quiz_options,
        );
        let chat_service = ChatService::new(
            VectorStore::new(config.max_namespaces),
            embedder,
            llm,
            document_service.clone(),
            extractor,
        );

        Self {
            config: Arc::new(config),
            article_service,
            question_service,
            document_service,
            chat_service,
        }
    }
}
