use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::question::{InterviewQuestion, QuizQuestion};
use crate::services::question_service::DEFAULT_QUESTION_COUNT;

fn default_question_count() -> usize {
    DEFAULT_QUESTION_COUNT
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct QuestionRequest {
    pub topic: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "numberOfQuestions", default = "default_question_count")]
    #[validate(range(min = 1))]
    pub number_of_questions: usize,
    /// Skip search and generate a fresh source article.
    #[serde(default)]
    pub regenerate: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuizResponse {
    pub success: bool,
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InterviewResponse {
    pub success: bool,
    pub questions: Vec<InterviewQuestion>,
}
