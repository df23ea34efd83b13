use serde::{de::DeserializeOwned, Deserialize, Serialize};
use utoipa::ToSchema;

/// A record the model is asked to emit inside `{"questions": [...]}`.
pub trait QuestionRecord: DeserializeOwned {
    /// Field-level checks that serde's shape matching cannot express.
    fn check(&self) -> Result<(), String>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InterviewQuestion {
    pub question: String,
    pub answer: String,
}

impl QuestionRecord for QuizQuestion {
    fn check(&self) -> Result<(), String> {
        if self.question.trim().is_empty() {
            return Err("question text is empty".to_string());
        }
        if self.options.len() < 2 {
            return Err(format!("expected at least 2 options, got {}", self.options.len()));
        }
        if self.answer.trim().is_empty() {
            return Err("answer is empty".to_string());
        }
        Ok(())
    }
}

impl QuestionRecord for InterviewQuestion {
    fn check(&self) -> Result<(), String> {
        if self.question.trim().is_empty() {
            return Err("question text is empty".to_string());
        }
        if self.answer.trim().is_empty() {
            return Err("answer is empty".to_string());
        }
        Ok(())
    }
}
