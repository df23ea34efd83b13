use axum::Json;
use utoipa::OpenApi;

use crate::dto::chat_dto::{ChatDocsRequest, ChatResponse, ChatUrlRequest, UploadResponse};
use crate::dto::question_dto::{InterviewResponse, QuestionRequest, QuizResponse};
use crate::dto::upload_dto::{ChatUploadSchema, QuestionUploadSchema};
use crate::models::question::{InterviewQuestion, QuizQuestion};
use crate::services::chat_service::{ChatAnswer, IngestSummary, SourceChunk};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::health::health,
        super::questions::quiz_question,
        super::questions::quiz_question_file,
        super::questions::interview_question,
        super::questions::interview_question_file,
        super::chat::upload_file,
        super::chat::chat_on_docs,
        super::chat::chat_url,
    ),
    components(schemas(
        QuestionRequest,
        QuizResponse,
        InterviewResponse,
        QuizQuestion,
        InterviewQuestion,
        ChatDocsRequest,
        ChatUrlRequest,
        ChatResponse,
        ChatAnswer,
        SourceChunk,
        UploadResponse,
        IngestSummary,
        QuestionUploadSchema,
        ChatUploadSchema,
    )),
    tags((name = "learning-backend", description = "Quiz, interview and document chat generation"))
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
