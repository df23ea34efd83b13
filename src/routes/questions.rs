use axum::{
    extract::{Multipart, State},
    Json,
};
use validator::Validate;

use crate::dto::question_dto::{InterviewResponse, QuestionRequest, QuizResponse};
use crate::dto::upload_dto::UploadForm;
use crate::error::{Error, Result};
use crate::services::question_service::DEFAULT_QUESTION_COUNT;
use crate::AppState;

fn checked_count(state: &AppState, requested: usize) -> Result<usize> {
    let max = state.config.max_questions;
    if requested == 0 || requested > max {
        return Err(Error::BadRequest(format!(
            "numberOfQuestions must be between 1 and {}",
            max
        )));
    }
    Ok(requested)
}

async fn article_for(state: &AppState, payload: &QuestionRequest) -> Result<String> {
    state
        .article_service
        .get_article(
            payload.topic.as_deref(),
            payload.url.as_deref(),
            payload.regenerate,
        )
        .await
}

async fn uploaded_text(state: &AppState, multipart: Multipart) -> Result<(String, usize)> {
    let mut form = UploadForm::from_multipart(multipart).await?;
    let count = checked_count(state, form.number_of_questions.unwrap_or(DEFAULT_QUESTION_COUNT))?;
    let file = form.take_file()?;
    let text = state.document_service.extract_text(&file).await?;
    Ok((text, count))
}

#[utoipa::path(
    post,
    path = "/api/quiz-question",
    request_body = QuestionRequest,
    responses(
        (status = 200, description = "Generated quiz questions", body = QuizResponse),
        (status = 400, description = "Invalid request or URL extraction failed"),
        (status = 422, description = "Neither topic nor url provided"),
        (status = 500, description = "Generation or output recovery failed"),
    ),
)]
pub async fn quiz_question(
    State(state): State<AppState>,
    Json(payload): Json<QuestionRequest>,
) -> Result<Json<QuizResponse>> {
    payload.validate()?;
    let count = checked_count(&state, payload.number_of_questions)?;
    let article = article_for(&state, &payload).await?;
    let questions = state.question_service.generate_quiz(&article, count).await?;
    Ok(Json(QuizResponse {
        success: true,
        questions,
    }))
}

#[utoipa::path(
    post,
    path = "/api/quiz-question-file",
    request_body(content = QuestionUploadSchema, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Generated quiz questions", body = QuizResponse),
        (status = 400, description = "Missing, empty, oversized or unsupported file"),
        (status = 500, description = "Generation or output recovery failed"),
    ),
)]
pub async fn quiz_question_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<QuizResponse>> {
    let (text, count) = uploaded_text(&state, multipart).await?;
    let questions = state.question_service.generate_quiz(&text, count).await?;
    Ok(Json(QuizResponse {
        success: true,
        questions,
    }))
}

#[utoipa::path(
    post,
    path = "/api/interview-question",
    request_body = QuestionRequest,
    responses(
        (status = 200, description = "Generated interview questions", body = InterviewResponse),
        (status = 400, description = "Invalid request or URL extraction failed"),
        (status = 422, description = "Neither topic nor url provided"),
        (status = 500, description = "Generation or output recovery failed"),
    ),
)]
pub async fn interview_question(
    State(state): State<AppState>,
    Json(payload): Json<QuestionRequest>,
) -> Result<Json<InterviewResponse>> {
    payload.validate()?;
    let count = checked_count(&state, payload.number_of_questions)?;
    let article = article_for(&state, &payload).await?;
    let questions = state
        .question_service
        .generate_interview(&article, count)
        .await?;
    Ok(Json(InterviewResponse {
        success: true,
        questions,
    }))
}

#[utoipa::path(
    post,
    path = "/api/interview-question-file",
    request_body(content = QuestionUploadSchema, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Generated interview questions", body = InterviewResponse),
        (status = 400, description = "Missing, empty, oversized or unsupported file"),
        (status = 500, description = "Generation or output recovery failed"),
    ),
)]
pub async fn interview_question_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<InterviewResponse>> {
    let (text, count) = uploaded_text(&state, multipart).await?;
    let questions = state.question_service.generate_interview(&text, count).await?;
    Ok(Json(InterviewResponse {
        success: true,
        questions,
    }))
}
