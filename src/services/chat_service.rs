use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{Error, Result};
use crate::services::document_service::{DocumentService, UploadedFile};
use crate::services::embed_service::Embedder;
use crate::services::extractor::ContentExtractor;
use crate::services::llm_service::{CompletionOptions, LanguageModel, CHAT_TEMPERATURE};
use crate::services::vector_store::{ChunkIndex, ChunkMetadata, IndexedChunk, ScoredChunk, VectorStore};
use crate::utils::text::{chunk_text, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};

pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_TOP_K: usize = 4;
/// Inputs per `/embeddings` request. Hosted endpoints cap the batch size.
pub const EMBED_BATCH_SIZE: usize = 64;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IngestSummary {
    pub filename: String,
    pub namespace: String,
    pub chunks: usize,
    pub text_length: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SourceChunk {
    pub text: String,
    pub source: String,
    pub chunk_index: usize,
    pub score: f32,
}

impl From<ScoredChunk> for SourceChunk {
    fn from(c: ScoredChunk) -> Self {
        Self {
            text: c.text,
            source: c.metadata.source,
            chunk_index: c.metadata.chunk_index,
            score: c.score,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChatAnswer {
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<SourceChunk>>,
}

/// Retrieval-augmented answers over uploaded documents or a single web page.
#[derive(Clone)]
pub struct ChatService {
    store: VectorStore,
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn LanguageModel>,
    documents: DocumentService,
    extractor: ContentExtractor,
}

impl ChatService {
    pub fn new(
        store: VectorStore,
        embedder: Arc<dyn Embedder>,
        llm: Arc<dyn LanguageModel>,
        documents: DocumentService,
        extractor: ContentExtractor,
    ) -> Self {
        Self {
            store,
            embedder,
            llm,
            documents,
            extractor,
        }
    }

    pub async fn ingest_document(&self, file: &UploadedFile, namespace: &str) -> Result<IngestSummary> {
        let text = self.documents.extract_text(file).await?;
        let chunks = self.embed_chunks(&text, &file.filename).await?;
        let count = chunks.len();
        let total = self.store.add(namespace, chunks);

        tracing::info!(filename = %file.filename, namespace, chunks = count, total, "Ingested document");
        Ok(IngestSummary {
            filename: file.filename.clone(),
            namespace: namespace.to_string(),
            chunks: count,
            text_length: text.chars().count(),
        })
    }

    pub async fn chat_on_docs(
        &self,
        topic: &str,
        namespace: &str,
        top_k: usize,
        include_sources: bool,
    ) -> Result<ChatAnswer> {
        let topic = non_blank_topic(topic)?;
        if !self.store.contains(namespace) {
            return Err(not_found(namespace));
        }

        let query = self.embedder.embed_query(topic).await?;
        // Could have been evicted while embedding.
        let hits = self
            .store
            .search(namespace, &query, top_k)
            .ok_or_else(|| not_found(namespace))?;

        let prompt = docs_prompt(topic, &hits);
        self.answer(&prompt, hits, include_sources).await
    }

    pub async fn chat_on_url(
        &self,
        topic: &str,
        url: &str,
        top_k: usize,
        include_sources: bool,
    ) -> Result<ChatAnswer> {
        let topic = non_blank_topic(topic)?;
        let article = self.extractor.extract(url).await?;

        let mut index = ChunkIndex::new();
        index.extend(self.embed_chunks(&article, url.trim()).await?);
        let query = self.embedder.embed_query(topic).await?;
        let hits = index.search(&query, top_k);

        let prompt = url_prompt(topic, &hits);
        self.answer(&prompt, hits, include_sources).await
    }

    async fn embed_chunks(&self, text: &str, source: &str) -> Result<Vec<IndexedChunk>> {
        let pieces = chunk_text(text, DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP);
        let mut embeddings = Vec::with_capacity(pieces.len());
        for batch in pieces.chunks(EMBED_BATCH_SIZE) {
            let vectors = self.embedder.embed_texts(batch).await?;
            if vectors.len() != batch.len() {
                return Err(Error::Internal(format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    vectors.len()
                )));
            }
            embeddings.extend(vectors);
        }
        tracing::debug!(source, chunks = pieces.len(), "Embedded chunks");
        Ok(pieces
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(chunk_index, (text, embedding))| {
                IndexedChunk::new(
                    text,
                    ChunkMetadata {
                        source: source.to_string(),
                        chunk_index,
                    },
                    embedding,
                )
            })
            .collect())
    }

    async fn answer(
        &self,
        prompt: &str,
        hits: Vec<ScoredChunk>,
        include_sources: bool,
    ) -> Result<ChatAnswer> {
        let answer = self
            .llm
            .complete(prompt, CompletionOptions::with_temperature(CHAT_TEMPERATURE))
            .await?;
        Ok(ChatAnswer {
            answer,
            sources: include_sources.then(|| hits.into_iter().map(SourceChunk::from).collect()),
        })
    }
}

fn non_blank_topic(topic: &str) -> Result<&str> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(Error::Input("Topic must not be empty.".to_string()));
    }
    Ok(topic)
}

fn not_found(namespace: &str) -> Error {
    Error::NotFound(format!("No documents ingested for namespace '{}'", namespace))
}

fn context_block(hits: &[ScoredChunk]) -> String {
    hits.iter()
        .map(|h| format!("Source: {}\n\n{}", h.metadata.source, h.text))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

fn docs_prompt(topic: &str, hits: &[ScoredChunk]) -> String {
    format!(
        "You are an expert assistant. Use the provided context to answer the question accurately.\n\
         Answer strictly from the context. If the context does not contain the answer, say so.\n\n\
         <context>\n{}\n</context>\n\n\
         Question: {}\n\n\
         Answer:",
        context_block(hits),
        topic
    )
}

fn url_prompt(topic: &str, hits: &[ScoredChunk]) -> String {
    format!(
        "You are an expert assistant answering questions using the provided context.\n\n\
         Context:\n{}\n\n\
         User question: {}\n\n\
         Instructions:\n\
         - Use the context to answer; note when the context is missing something.\n\
         - Concise answer (5-8 sentences) and a brief explanation.\n\
         - List sources.\n\n\
         Answer:",
        context_block(hits),
        topic
    )
}
