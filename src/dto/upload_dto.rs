use axum::extract::Multipart;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::{Error, Result};
use crate::services::document_service::UploadedFile;

/// Fields accepted by the multipart upload routes.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<UploadedFile>,
    pub number_of_questions: Option<usize>,
    pub namespace: Option<String>,
}

impl UploadForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await.map_err(Error::Multipart)? {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "file" => {
                    let filename = field.file_name().unwrap_or("upload").to_string();
                    let data = field.bytes().await.map_err(Error::Multipart)?;
                    form.file = Some(UploadedFile { filename, data });
                }
                "numberOfQuestions" => {
                    let raw = field.text().await.map_err(Error::Multipart)?;
                    let count = raw.trim().parse::<usize>().map_err(|_| {
                        Error::BadRequest(format!("numberOfQuestions must be a positive integer, got '{}'", raw.trim()))
                    })?;
                    form.number_of_questions = Some(count);
                }
                "namespace" => {
                    let raw = field.text().await.map_err(Error::Multipart)?;
                    let raw = raw.trim();
                    if !raw.is_empty() {
                        form.namespace = Some(raw.to_string());
                    }
                }
                other => {
                    tracing::debug!(field = other, "Ignoring unknown multipart field");
                }
            }
        }

        Ok(form)
    }

    pub fn take_file(&mut self) -> Result<UploadedFile> {
        self.file
            .take()
            .ok_or_else(|| Error::BadRequest("Missing 'file' field.".to_string()))
    }
}

/// OpenAPI shape of the question upload forms.
#[allow(dead_code)]
#[derive(Deserialize, ToSchema)]
pub struct QuestionUploadSchema {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
    #[serde(rename = "numberOfQuestions")]
    number_of_questions: Option<usize>,
}

/// OpenAPI shape of the chat upload form.
#[allow(dead_code)]
#[derive(Deserialize, ToSchema)]
pub struct ChatUploadSchema {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
    namespace: Option<String>,
}
