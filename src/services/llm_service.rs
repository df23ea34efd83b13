use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;

pub const FALLBACK_ARTICLE_TEMPERATURE: f32 = 0.7;
pub const CLEANUP_TEMPERATURE: f32 = 0.1;
pub const CHAT_TEMPERATURE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f32,
}

impl CompletionOptions {
    pub fn with_temperature(temperature: f32) -> Self {
        Self { temperature }
    }
}

/// Hosted text-generation model. Returns the raw reply text.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str, options: CompletionOptions) -> Result<String>;
}

/// OpenAI-compatible `/chat/completions` client (Groq, OpenAI, OpenRouter).
/// Requests time out with the shared client (`HTTP_TIMEOUT_SECS`).
#[derive(Clone)]
pub struct ChatCompletionsClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl ChatCompletionsClient {
    pub fn new(client: Client, base_url: String, api_key: Option<String>, model: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl LanguageModel for ChatCompletionsClient {
    async fn complete(&self, prompt: &str, options: CompletionOptions) -> Result<String> {
        #[derive(serde::Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(serde::Serialize)]
        struct Req<'a> {
            model: &'a str,
            temperature: f32,
            messages: Vec<Msg<'a>>,
        }
        #[derive(serde::Deserialize)]
        struct RespChoiceMsg {
            content: Option<String>,
        }
        #[derive(serde::Deserialize)]
        struct RespChoice {
            message: RespChoiceMsg,
        }
        #[derive(serde::Deserialize)]
        struct Resp {
            choices: Vec<RespChoice>,
        }

        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Config("LLM_API_KEY is not set".to_string()))?;

        let req = Req {
            model: &self.model,
            temperature: options.temperature,
            messages: vec![Msg {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "Sending completion request");

        let res = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&req)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(Error::Generation(format!(
                "model API error {}: {}",
                status, text
            )));
        }

        let body: Resp = res.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::Generation("model returned an empty completion".to_string()))
    }
}
