use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::services::chat_service::{ChatAnswer, IngestSummary, DEFAULT_NAMESPACE, DEFAULT_TOP_K};

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ChatDocsRequest {
    pub topic: String,
    #[serde(default = "default_top_k")]
    #[validate(range(min = 1, max = 50))]
    pub top_k: usize,
    #[serde(default = "default_namespace")]
    #[validate(length(min = 1, max = 128))]
    pub namespace: String,
    #[serde(default)]
    pub include_sources: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ChatUrlRequest {
    pub topic: String,
    pub url: String,
    #[serde(default = "default_top_k")]
    #[validate(range(min = 1, max = 50))]
    pub top_k: usize,
    #[serde(default)]
    pub include_sources: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChatResponse {
    pub success: bool,
    pub response: ChatAnswer,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub details: IngestSummary,
}
