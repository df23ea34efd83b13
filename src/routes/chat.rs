use axum::{
    extract::{Multipart, State},
    Json,
};
use validator::Validate;

use crate::dto::chat_dto::{ChatDocsRequest, ChatResponse, ChatUrlRequest, UploadResponse};
use crate::dto::upload_dto::UploadForm;
use crate::error::Result;
use crate::services::chat_service::DEFAULT_NAMESPACE;
use crate::AppState;

#[utoipa::path(
    post,
    path = "/chat/upload-file",
    request_body(content = ChatUploadSchema, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File ingested", body = UploadResponse),
        (status = 400, description = "Missing, empty, oversized or unsupported file"),
    ),
)]
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut form = UploadForm::from_multipart(multipart).await?;
    let file = form.take_file()?;
    let namespace = form
        .namespace
        .take()
        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

    let details = state.chat_service.ingest_document(&file, &namespace).await?;
    Ok(Json(UploadResponse {
        success: true,
        details,
    }))
}

#[utoipa::path(
    post,
    path = "/chat/chat-on-docs",
    request_body = ChatDocsRequest,
    responses(
        (status = 200, description = "Answer from ingested documents", body = ChatResponse),
        (status = 404, description = "Nothing ingested for the namespace"),
        (status = 422, description = "Blank topic"),
    ),
)]
pub async fn chat_on_docs(
    State(state): State<AppState>,
    Json(payload): Json<ChatDocsRequest>,
) -> Result<Json<ChatResponse>> {
    payload.validate()?;
    let response = state
        .chat_service
        .chat_on_docs(
            &payload.topic,
            &payload.namespace,
            payload.top_k,
            payload.include_sources,
        )
        .await?;
    Ok(Json(ChatResponse {
        success: true,
        response,
    }))
}

#[utoipa::path(
    post,
    path = "/chat/chat-url",
    request_body = ChatUrlRequest,
    responses(
        (status = 200, description = "Answer from the page content", body = ChatResponse),
        (status = 400, description = "URL could not be extracted"),
        (status = 422, description = "Blank topic"),
    ),
)]
pub async fn chat_url(
    State(state): State<AppState>,
    Json(payload): Json<ChatUrlRequest>,
) -> Result<Json<ChatResponse>> {
    payload.validate()?;
    let response = state
        .chat_service
        .chat_on_url(
            &payload.topic,
            &payload.url,
            payload.top_k,
            payload.include_sources,
        )
        .await?;
    Ok(Json(ChatResponse {
        success: true,
        response,
    }))
}
