use std::sync::Arc;

use rand::seq::SliceRandom;

use crate::error::{Error, Result};
use crate::models::question::{InterviewQuestion, QuestionRecord, QuizQuestion};
use crate::services::json_recovery::recover_questions;
use crate::services::llm_service::{CompletionOptions, LanguageModel};

pub const DEFAULT_QUESTION_COUNT: usize = 5;

#[derive(Clone)]
pub struct QuestionService {
    llm: Arc<dyn LanguageModel>,
    temperature: f32,
    shuffle_options: bool,
}

impl QuestionService {
    pub fn new(llm: Arc<dyn LanguageModel>, temperature: f32, shuffle_options: bool) -> Self {
        Self {
            llm,
            temperature,
            shuffle_options,
        }
    }

    pub async fn generate_quiz(&self, article: &str, count: usize) -> Result<Vec<QuizQuestion>> {
        let mut questions: Vec<QuizQuestion> = self.generate(&quiz_prompt(article, count), count).await?;
        if self.shuffle_options {
            shuffle_options(&mut questions);
        }
        Ok(questions)
    }

    pub async fn generate_interview(
        &self,
        article: &str,
        count: usize,
    ) -> Result<Vec<InterviewQuestion>> {
        self.generate(&interview_prompt(article, count), count).await
    }

    async fn generate<T: QuestionRecord>(&self, prompt: &str, count: usize) -> Result<Vec<T>> {
        let raw = self
            .llm
            .complete(prompt, CompletionOptions::with_temperature(self.temperature))
            .await?;

        let mut questions = recover_questions::<T>(&raw).map_err(|e| {
            tracing::error!(error = %e, output_len = raw.len(), "Could not recover questions from model output");
            Error::from(e)
        })?;

        if questions.is_empty() {
            return Err(Error::SchemaMismatch("`questions` is empty".to_string()));
        }
        if questions.len() < count {
            tracing::warn!(requested = count, returned = questions.len(), "Model returned fewer questions than requested");
        }
        questions.truncate(count);
        Ok(questions)
    }
}

/// Answers are option text, not positions, so shuffling keeps them correct.
fn shuffle_options(questions: &mut [QuizQuestion]) {
    let mut rng = rand::thread_rng();
    for q in questions {
        q.options.shuffle(&mut rng);
    }
}

fn quiz_prompt(article: &str, count: usize) -> String {
    format!(
        r#"You are an expert MCQ generator for Computer Science, AI, and IT.
Generate exactly {count} multiple-choice questions from the given content.

Rules for ALL questions:
- Each question must be technical and relevant to the content.
- Exactly 4 distinct options per question.
- Exactly 1 correct answer, copied verbatim from the options.
- Provide a concise explanation for the correct answer.
- Include code snippets or examples if relevant.
- Escape all newlines in strings using \n.
- Output ONLY valid JSON, nothing else.

Ensure the questions cover all key concepts from the content.

Content:
{article}

JSON Format:
{{
  "questions": [
    {{
      "question": "Example?",
      "options": ["A", "B", "C", "D"],
      "answer": "A",
      "explanation": "Why A is correct, with escaped newlines"
    }}
  ]
}}"#
    )
}

fn interview_prompt(article: &str, count: usize) -> String {
    format!(
        r#"You are an expert technical interviewer.

Generate exactly {count} unique technical interview questions from the given content.

Rules for ALL questions:
- Each question must be technical and relevant to the content.
- Provide a detailed answer for each question.
- Include code snippets or real-world examples where useful.
- Escape all newlines inside strings using \n.
- Output ONLY valid JSON, nothing else.
- The JSON must be a single line (no actual line breaks inside string values).

Content:
{article}

JSON Format:
{{
  "questions": [
    {{
      "question": "Example interview question?",
      "answer": "Detailed explanation here with escaped newlines"
    }}
  ]
}}"#
    )
}
