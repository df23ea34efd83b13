use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub llm_base_url: String,
    pub llm_api_key: Option<String>,
    pub generation_model: String,
    pub generation_temperature: f32,
    pub embedding_base_url: String,
    pub embedding_api_key: Option<String>,
    pub embedding_model: String,
    pub tavily_api_key: Option<String>,
    pub serper_api_key: Option<String>,
    pub firecrawl_api_key: Option<String>,
    /// Search providers in the order the fallback chain tries them.
    pub search_providers: Vec<String>,
    /// Upper bound on the whole provider phase; `0` disables it.
    pub search_deadline_secs: u64,
    pub http_timeout_secs: u64,
    pub public_rps: u32,
    pub max_questions: usize,
    pub max_upload_bytes: usize,
    pub max_namespaces: usize,
    pub shuffle_quiz_options: bool,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Default for Config {
    fn default() -> Self {
        Self {
            server_address: "0.0.0.0:8000".to_string(),
            llm_base_url: "https://api.groq.com/openai/v1".to_string(),
            llm_api_key: None,
            generation_model: "llama-3.1-8b-instant".to_string(),
            generation_temperature: 0.6,
            embedding_base_url: "https://openrouter.ai/api/v1".to_string(),
            embedding_api_key: None,
            embedding_model: "nomic-ai/nomic-embed-text-v1.5".to_string(),
            tavily_api_key: None,
            serper_api_key: None,
            firecrawl_api_key: None,
            search_providers: vec!["tavily".to_string(), "duckduckgo".to_string()],
            search_deadline_secs: 45,
            http_timeout_secs: 60,
            public_rps: 20,
            max_questions: 20,
            max_upload_bytes: 50 * 1024 * 1024,
            max_namespaces: 64,
            shuffle_quiz_options: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            server_address: get_env_or("SERVER_ADDRESS", defaults.server_address),
            llm_base_url: get_env_or("LLM_BASE_URL", defaults.llm_base_url),
            llm_api_key: get_env_opt("LLM_API_KEY").or_else(|| get_env_opt("GROQ_API_KEY")),
            generation_model: get_env_or("GENERATION_MODEL", defaults.generation_model),
            generation_temperature: get_env_parse_or(
                "GENERATION_TEMPERATURE",
                defaults.generation_temperature,
            )?,
            embedding_base_url: get_env_or("EMBEDDING_BASE_URL", defaults.embedding_base_url),
            embedding_api_key: get_env_opt("EMBEDDING_API_KEY"),
            embedding_model: get_env_or("EMBEDDING_MODEL", defaults.embedding_model),
            tavily_api_key: get_env_opt("TAVILY_API_KEY"),
            serper_api_key: get_env_opt("SERPER_API_KEY"),
            firecrawl_api_key: get_env_opt("FIRECRAWL_API_KEY"),
            search_providers: get_env_opt("SEARCH_PROVIDERS")
                .map(|raw| parse_list(&raw))
                .unwrap_or(defaults.search_providers),
            search_deadline_secs: get_env_parse_or(
                "SEARCH_DEADLINE_SECS",
                defaults.search_deadline_secs,
            )?,
            http_timeout_secs: get_env_parse_or("HTTP_TIMEOUT_SECS", defaults.http_timeout_secs)?,
            public_rps: get_env_parse_or("PUBLIC_RPS", defaults.public_rps)?,
            max_questions: get_env_parse_or("MAX_QUESTIONS", defaults.max_questions)?,
            max_upload_bytes: get_env_parse_or("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            max_namespaces: get_env_parse_or("MAX_NAMESPACES", defaults.max_namespaces)?,
            shuffle_quiz_options: get_env_parse_or(
                "SHUFFLE_QUIZ_OPTIONS",
                defaults.shuffle_quiz_options,
            )?,
        })
    }
}

fn get_env_opt(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn get_env_or(name: &str, default: String) -> String {
    get_env_opt(name).unwrap_or(default)
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_opt(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
