use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::services::json_recovery::RecoveryError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing or blank topic/url and similar caller mistakes.
    #[error("{0}")]
    Input(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Every URL extraction strategy was exhausted, or the URL is unusable.
    #[error("Could not extract article content: {0}")]
    Extraction(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("No JSON object found in model output")]
    NoJsonFound,

    #[error("Model output is not valid JSON: {message}")]
    MalformedModelOutput { message: String, span: String },

    #[error("Model output does not match the expected shape: {0}")]
    SchemaMismatch(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Input(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::BadRequest(_)
            | Error::Validation(_)
            | Error::Extraction(_)
            | Error::Multipart(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Reqwest(_) => StatusCode::BAD_GATEWAY,
            Error::Config(_)
            | Error::Generation(_)
            | Error::NoJsonFound
            | Error::MalformedModelOutput { .. }
            | Error::SchemaMismatch(_)
            | Error::Json(_)
            | Error::Anyhow(_)
            | Error::Internal(_)
            | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let error_message = match &self {
            Error::Reqwest(err) => format!("External service error: {}", err),
            Error::Io(_) => "An unexpected error occurred".to_string(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(json!({ "success": false, "error": error_message }));
        (status, body).into_response()
    }
}

impl From<RecoveryError> for Error {
    fn from(err: RecoveryError) -> Self {
        match err {
            RecoveryError::NoJsonFound => Error::NoJsonFound,
            RecoveryError::Malformed { message, span } => {
                Error::MalformedModelOutput { message, span }
            }
            RecoveryError::SchemaMismatch(msg) => Error::SchemaMismatch(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_client_and_server_errors() {
        assert_eq!(
            Error::Input("x".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            Error::Extraction("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(Error::NoJsonFound.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            Error::SchemaMismatch("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn recovery_errors_keep_the_offending_span() {
        let err: Error = RecoveryError::Malformed {
            message: "eof".into(),
            span: "{\"a\":".into(),
        }
        .into();
        match err {
            Error::MalformedModelOutput { span, .. } => assert_eq!(span, "{\"a\":"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
