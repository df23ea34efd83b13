pub mod chat;
pub mod docs;
pub mod health;
pub mod questions;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::middleware::cors::permissive_cors;
use crate::middleware::rate_limit::{rps_middleware, RateLimiter};
use crate::AppState;

/// Multipart framing on top of the largest accepted file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn app(state: AppState) -> Router {
    let limiter = RateLimiter::new(state.config.public_rps);
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    let base_routes = Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/api-docs/openapi.json", get(docs::openapi_json));

    let question_api = Router::new()
        .route("/api/quiz-question", post(questions::quiz_question))
        .route("/api/quiz-question-file", post(questions::quiz_question_file))
        .route("/api/interview-question", post(questions::interview_question))
        .route(
            "/api/interview-question-file",
            post(questions::interview_question_file),
        );

    let chat_api = Router::new()
        .route("/chat/upload-file", post(chat::upload_file))
        .route("/chat/chat-on-docs", post(chat::chat_on_docs))
        .route("/chat/chat-url", post(chat::chat_url));

    let limited = question_api
        .merge(chat_api)
        .layer(axum::middleware::from_fn_with_state(limiter, rps_middleware));

    base_routes
        .merge(limited)
        .with_state(state)
        .layer(permissive_cors())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(body_limit))
}
