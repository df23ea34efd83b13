use serde_json::{Map, Value};

/// Fewer whitespace-delimited words than this and a snippet is not an article.
pub const MIN_SNIPPET_WORDS: usize = 30;

/// Meta-language that describes what the user wants to do with a subject
/// rather than the subject itself.
const JUNK_PHRASES: &[&str] = &[
    "question for backend practice",
    "quiz for practice",
    "test questions",
    "interview questions",
    "mcq",
];

/// Keys that may carry the text of a record-shaped result, highest priority first.
const SNIPPET_KEYS: &[&str] = &["snippet", "content", "text"];

/// Untyped result from a search provider.
#[derive(Debug, Clone, PartialEq)]
pub enum RawSnippet {
    Text(String),
    Record(Map<String, Value>),
}

impl RawSnippet {
    /// Collapses the result into one string, or `None` when no text-bearing
    /// key holds a non-empty string.
    pub fn normalize(self) -> Option<String> {
        match self {
            RawSnippet::Text(text) => Some(text.trim().to_string()),
            RawSnippet::Record(map) => SNIPPET_KEYS
                .iter()
                .filter_map(|key| map.get(*key).and_then(Value::as_str))
                .map(str::trim)
                .find(|s| !s.is_empty())
                .map(str::to_string),
        }
    }
}

/// Search text that passed [`is_valid_snippet`]. Only this type, or a freshly
/// generated article, may feed question generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedContent(String);

impl ValidatedContent {
    pub fn check(snippet: String) -> Option<Self> {
        is_valid_snippet(&snippet).then_some(Self(snippet))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

pub fn is_valid_snippet(snippet: &str) -> bool {
    if snippet.trim().is_empty() {
        return false;
    }
    let lower = snippet.to_lowercase();
    if lower.contains("no useful result") || lower.contains("error") || lower.starts_with("http") {
        return false;
    }
    snippet.split_whitespace().count() >= MIN_SNIPPET_WORDS
}

/// Strips junk phrases (case-insensitively) and capitalizes what is left.
pub fn preprocess_topic(topic: &str) -> String {
    let mut clean = topic.to_lowercase();
    for phrase in JUNK_PHRASES {
        clean = clean.replace(phrase, "");
    }
    let clean = clean.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut chars = clean.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
