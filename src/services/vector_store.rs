//! In-memory vector indexes, one per namespace.
//!
//! Namespaces are created on first write and held in an LRU bounded by
//! `MAX_NAMESPACES`; writing a new namespace into a full store evicts the
//! least recently used one. Each index is append-only and searched by
//! brute-force cosine similarity.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::services::embed_service::cosine_sim;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ChunkMetadata {
    pub source: String,
    pub chunk_index: usize,
}

#[derive(Debug, Clone)]
pub struct IndexedChunk {
    pub id: Uuid,
    pub text: String,
    pub metadata: ChunkMetadata,
    pub embedding: Vec<f32>,
}

impl IndexedChunk {
    pub fn new(text: String, metadata: ChunkMetadata, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            metadata,
            embedding,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub text: String,
    pub metadata: ChunkMetadata,
    pub score: f32,
}

/// Flat cosine-similarity index.
#[derive(Debug, Clone, Default)]
pub struct ChunkIndex {
    chunks: Vec<IndexedChunk>,
}

impl ChunkIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, chunks: impl IntoIterator<Item = IndexedChunk>) {
        self.chunks.extend(chunks);
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Best `k` chunks, highest score first.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<(f32, &IndexedChunk)> = self
            .chunks
            .iter()
            .map(|c| (cosine_sim(query, &c.embedding), c))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored
            .into_iter()
            .take(k)
            .map(|(score, c)| ScoredChunk {
                text: c.text.clone(),
                metadata: c.metadata.clone(),
                score,
            })
            .collect()
    }
}

#[derive(Clone)]
pub struct VectorStore {
    namespaces: Arc<Mutex<LruCache<String, ChunkIndex>>>,
}

impl VectorStore {
    pub fn new(max_namespaces: usize) -> Self {
        let cap = NonZeroUsize::new(max_namespaces).unwrap_or(NonZeroUsize::MIN);
        Self {
            namespaces: Arc::new(Mutex::new(LruCache::new(cap))),
        }
    }

    /// Appends to `namespace`, creating it if needed. Returns the namespace size.
    pub fn add(&self, namespace: &str, chunks: Vec<IndexedChunk>) -> usize {
        let mut guard = self.namespaces.lock().expect("vector store mutex poisoned");
        if let Some(index) = guard.get_mut(namespace) {
            index.extend(chunks);
            return index.len();
        }

        let mut index = ChunkIndex::new();
        index.extend(chunks);
        let len = index.len();
        if let Some((evicted, _)) = guard.push(namespace.to_string(), index) {
            tracing::info!(namespace = %evicted, "Evicted least recently used namespace");
        }
        len
    }

    /// `None` when the namespace was never written (or has been evicted).
    pub fn search(&self, namespace: &str, query: &[f32], k: usize) -> Option<Vec<ScoredChunk>> {
        let mut guard = self.namespaces.lock().expect("vector store mutex poisoned");
        guard.get(namespace).map(|index| index.search(query, k))
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.namespaces
            .lock()
            .expect("vector store mutex poisoned")
            .contains(namespace)
    }
}
