pub mod article_service;
pub mod chat_service;
pub mod document_service;
pub mod embed_service;
pub mod extractor;
pub mod json_recovery;
pub mod llm_service;
pub mod question_service;
pub mod search;
pub mod vector_store;
