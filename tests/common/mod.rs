#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use learning_backend::{
    config::Config,
    error::Result,
    routes,
    services::{
        embed_service::Embedder,
        extractor::{ArticleBodyStrategy, ContentExtractor, ExtractionStrategy, PageTextStrategy},
        llm_service::{CompletionOptions, LanguageModel},
        search::{RawSnippet, SearchError, SearchFallbackChain, SearchProvider},
    },
    AppState,
};
use serde_json::Value as JsonValue;
use tower::ServiceExt;

pub const QUIZ_REPLY: &str = r#"Here you go:
```json
{"questions": [
  {"question": "What does the borrow checker enforce?", "options": ["Aliasing XOR mutation", "Garbage collection", "Green threads", "Reflection"], "answer": "Aliasing XOR mutation", "explanation": "Shared or mutable,
never both."},
  {"question": "Which trait marks thread-safe sharing?", "options": ["Sync", "Copy", "Sized", "Unpin"], "answer": "Sync", "explanation": "&T is Send when T is Sync."},
  {"question": "What does `?` do?", "options": ["Propagates errors", "Panics", "Clones", "Logs"], "answer": "Propagates errors", "explanation": "Early return on Err."}
]}
```"#;

pub const INTERVIEW_REPLY: &str = r#"{"questions": [
  {"question": "Explain ownership.", "answer": "Each value has a single owner;
it is dropped when the owner goes out of scope."},
  {"question": "What is a lifetime?", "answer": "A region of code a reference is valid for."}
]}"#;

pub const CLEANED_ARTICLE: &str = "# Rust\n\nCleaned article body.";

/// Answers by prompt kind and records every prompt.
pub struct ScriptedModel {
    pub quiz_reply: String,
    pub interview_reply: String,
    pub prompts: Mutex<Vec<String>>,
}

impl Default for ScriptedModel {
    fn default() -> Self {
        Self {
            quiz_reply: QUIZ_REPLY.to_string(),
            interview_reply: INTERVIEW_REPLY.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedModel {
    pub fn prompts_containing(&self, needle: &str) -> usize {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.contains(needle))
            .count()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &str, _options: CompletionOptions) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let reply = if prompt.contains("strict article formatter") {
            CLEANED_ARTICLE.to_string()
        } else if prompt.contains("MCQ generator") {
            self.quiz_reply.clone()
        } else if prompt.contains("technical interviewer") {
            self.interview_reply.clone()
        } else if prompt.contains("Write a clear, detailed") {
            "Generated explainer. ".repeat(20)
        } else {
            "Answer from context.".to_string()
        };
        Ok(reply)
    }
}

/// Two-dimensional embedding: "rust" or not.
pub struct KeywordEmbedder;

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                if t.to_lowercase().contains("rust") {
                    vec![1.0, 0.0]
                } else {
                    vec![0.0, 1.0]
                }
            })
            .collect())
    }
}

/// Returns the same snippet for every query and counts calls.
pub struct StaticProvider {
    pub snippet: String,
    pub calls: AtomicUsize,
}

impl StaticProvider {
    pub fn new(snippet: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            snippet: snippet.into(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchProvider for StaticProvider {
    async fn search(&self, _query: &str) -> std::result::Result<RawSnippet, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(RawSnippet::Text(self.snippet.clone()))
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

pub fn news_snippet() -> String {
    "Rust news: the language keeps growing in systems programming. ".repeat(6)
}

pub fn test_config() -> Config {
    Config {
        public_rps: 1000,
        max_questions: 10,
        max_upload_bytes: 1024 * 1024,
        shuffle_quiz_options: false,
        ..Config::default()
    }
}

pub struct TestApp {
    pub router: Router,
    pub model: Arc<ScriptedModel>,
    pub provider: Arc<StaticProvider>,
}

pub fn build_app(config: Config, model: ScriptedModel) -> TestApp {
    let model = Arc::new(model);
    let provider = StaticProvider::new(news_snippet());

    let client = reqwest::Client::new();
    let strategies: Vec<Arc<dyn ExtractionStrategy>> = vec![
        Arc::new(ArticleBodyStrategy::new(client.clone())),
        Arc::new(PageTextStrategy::new(client)),
    ];
    let providers: Vec<Arc<dyn SearchProvider>> = vec![provider.clone()];
    let search = SearchFallbackChain::new(providers, model.clone());

    let state = AppState::from_parts(
        config,
        model.clone(),
        Arc::new(KeywordEmbedder),
        ContentExtractor::new(strategies),
        search,
    );

    TestApp {
        router: routes::app(state),
        model,
        provider,
    }
}

pub fn default_app() -> TestApp {
    build_app(test_config(), ScriptedModel::default())
}

pub async fn send(router: &Router, req: Request<Body>) -> (StatusCode, JsonValue) {
    let res = router.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null);
    (status, body)
}

pub fn json_post(path: &str, body: JsonValue) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub const BOUNDARY: &str = "----learning-backend-test";

/// Builds a multipart request with one file part and extra text fields.
pub fn multipart_post(path: &str, filename: &str, content: &[u8], fields: &[(&str, &str)]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(path)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// A minimal `.docx` whose body holds one paragraph per entry.
pub fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{p}</w:t></w:r></w:p>"))
        .collect();
    let xml = format!(
        "<w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body>{body}</w:body></w:document>"
    );

    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

pub const ARTICLE_PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>Rust 2024</title></head>
<body>
  <nav>Home | About</nav>
  <article>
    <h1>Rust 2024 edition</h1>
    <p>The Rust 2024 edition stabilises a set of language changes that were prepared over several release cycles.
    It tightens lifetime capture rules in return-position impl Trait and reserves new syntax for future features.</p>
    <p>Most crates migrate automatically with cargo fix, and editions remain interoperable across the ecosystem.</p>
  </article>
  <footer>Copyright</footer>
</body></html>"#;
