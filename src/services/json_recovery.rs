//! Recovery of a JSON object from free-form model output.
//!
//! Model replies are meant to be a single JSON object but routinely arrive
//! wrapped in commentary or a fenced block, with raw newlines or stray quotes
//! inside string values. Recovery runs in four steps:
//!
//! 1. isolate the candidate span (a ```` ```json ```` fence wins, otherwise the
//!    first `{` through the last `}`, which is also the retry span when a
//!    fenced body does not parse);
//! 2. repair it with a single string-aware pass that only rewrites characters
//!    which make the span invalid, so well-formed JSON passes through untouched;
//! 3. parse strictly, then once more with trailing commas removed;
//! 4. check the parsed object against the expected record shape.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::models::question::QuestionRecord;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RecoveryError {
    #[error("no JSON object found")]
    NoJsonFound,

    #[error("malformed JSON: {message}")]
    Malformed { message: String, span: String },

    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),
}

fn fenced_json() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"(?si)```json\s*(.*?)```").expect("valid fence regex"))
}

/// Returns the slice of `raw` most likely to hold the JSON object.
pub fn isolate_span(raw: &str) -> Result<&str, RecoveryError> {
    if let Some(body) = fenced_json()
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
    {
        if !body.is_empty() {
            return Ok(body);
        }
    }

    brace_span(raw).ok_or(RecoveryError::NoJsonFound)
}

/// First `{` through last `}` of the whole reply.
fn brace_span(raw: &str) -> Option<&str> {
    match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if end > start => Some(&raw[start..=end]),
        _ => None,
    }
}

/// Rewrites the characters that make a JSON span invalid while inside a string:
/// raw control characters become escapes, unescaped inner quotes are escaped,
/// and unknown escape sequences keep their backslash as data (`` \` `` becomes a
/// plain backtick, `\u` without four hex digits stays literal). Outside
/// strings nothing is touched.
pub fn repair_span(span: &str) -> String {
    let chars: Vec<char> = span.chars().collect();
    let mut out = String::with_capacity(span.len() + 16);
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if !in_string {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
            continue;
        }

        if escaped {
            escaped = false;
            match c {
                '"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't' => {
                    out.push('\\');
                    out.push(c);
                }
                'u' if is_unicode_escape(&chars[i + 1..]) => out.push_str("\\u"),
                'u' => out.push_str("\\\\u"),
                '`' | '\'' => out.push(c),
                '\n' => out.push_str("\\n"),
                other => {
                    out.push_str("\\\\");
                    push_string_char(&mut out, other);
                }
            }
            continue;
        }

        match c {
            '\\' => escaped = true,
            '"' if closes_string(&chars[i + 1..]) => {
                in_string = false;
                out.push('"');
            }
            '"' => out.push_str("\\\""),
            other => push_string_char(&mut out, other),
        }
    }

    if escaped {
        out.push_str("\\\\");
    }
    out
}

/// `\u` must be followed by exactly four hex digits to be a JSON escape.
fn is_unicode_escape(rest: &[char]) -> bool {
    rest.len() >= 4 && rest[..4].iter().all(char::is_ascii_hexdigit)
}

fn push_string_char(out: &mut String, c: char) {
    match c {
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
        c => out.push(c),
    }
}

/// A quote ends a string only when the next significant character could
/// follow a string value or key in valid JSON.
fn closes_string(rest: &[char]) -> bool {
    match rest.iter().find(|c| !c.is_whitespace()) {
        None => true,
        Some(next) => matches!(next, ',' | '}' | ']' | ':'),
    }
}

/// Drops commas that directly precede `}` or `]` outside of strings.
pub fn strip_trailing_commas(span: &str) -> String {
    let chars: Vec<char> = span.chars().collect();
    let mut out = String::with_capacity(span.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            out.push(c);
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Extracts the single JSON object carried by `raw_model_text`.
///
/// A fenced body that does not parse is retried as the widest brace span of
/// the reply, since a ```` ``` ```` inside a string value closes the fence early.
pub fn recover(raw_model_text: &str) -> Result<Map<String, Value>, RecoveryError> {
    let span = isolate_span(raw_model_text)?;

    let value = match parse_span(span) {
        Ok(value) => value,
        Err(err) => match brace_span(raw_model_text) {
            Some(wide) if wide != span => parse_span(wide).map_err(|_| err)?,
            _ => return Err(err),
        },
    };

    match value {
        Value::Object(map) => Ok(map),
        other => Err(RecoveryError::SchemaMismatch(format!(
            "expected a JSON object, found {}",
            json_kind(&other)
        ))),
    }
}

fn parse_span(span: &str) -> Result<Value, RecoveryError> {
    let repaired = repair_span(span);
    match serde_json::from_str::<Value>(&repaired) {
        Ok(value) => Ok(value),
        Err(strict) => serde_json::from_str::<Value>(&strip_trailing_commas(&repaired)).map_err(
            |_| RecoveryError::Malformed {
                message: strict.to_string(),
                span: span.to_string(),
            },
        ),
    }
}

/// Recovers `{"questions": [...]}` and checks every record.
pub fn recover_questions<T: QuestionRecord>(raw_model_text: &str) -> Result<Vec<T>, RecoveryError> {
    let mut map = recover(raw_model_text)?;
    let questions = map
        .remove("questions")
        .ok_or_else(|| RecoveryError::SchemaMismatch("missing `questions` key".to_string()))?;

    let items = match questions {
        Value::Array(items) => items,
        other => {
            return Err(RecoveryError::SchemaMismatch(format!(
                "`questions` must be an array, found {}",
                json_kind(&other)
            )))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            let record: T = serde_json::from_value(item).map_err(|e| {
                RecoveryError::SchemaMismatch(format!("question {}: {}", idx + 1, e))
            })?;
            record.check().map_err(|reason| {
                RecoveryError::SchemaMismatch(format!("question {}: {}", idx + 1, reason))
            })?;
            Ok(record)
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{InterviewQuestion, QuizQuestion};
    use serde_json::json;

    #[test]
    fn fenced_block_wins_over_surrounding_commentary() {
        let original = json!({
            "questions": [
                {"question": "What is a B-tree?", "answer": "A balanced search tree {often on disk}."}
            ]
        });
        let raw = format!(
            "Sure! Here are your questions {{as requested}}:\n```json\n{}\n```\nLet me know if you need more.",
            serde_json::to_string_pretty(&original).unwrap()
        );

        let recovered = recover(&raw).unwrap();
        assert_eq!(Value::Object(recovered), original);
    }

    #[test]
    fn brace_span_used_without_fence() {
        let raw = "Result: {\"a\": 1, \"b\": [true, null]} -- end";
        assert_eq!(isolate_span(raw).unwrap(), "{\"a\": 1, \"b\": [true, null]}");
        assert_eq!(Value::Object(recover(raw).unwrap()), json!({"a": 1, "b": [true, null]}));
    }

    #[test]
    fn raw_newlines_inside_strings_are_preserved_as_data() {
        let raw = "{\"questions\": [{\"question\": \"Line one\nLine two\", \"answer\": \"fn main() {\n    println!();\n}\"}]}";
        let questions: Vec<InterviewQuestion> = recover_questions(raw).unwrap();
        assert_eq!(questions[0].question, "Line one\nLine two");
        assert_eq!(questions[0].answer, "fn main() {\n    println!();\n}");
    }

    #[test]
    fn newlines_between_tokens_are_left_alone() {
        let span = "{\n  \"a\": \"x\"\n}";
        assert_eq!(repair_span(span), span);
    }

    #[test]
    fn already_valid_escapes_are_untouched() {
        let span = r#"{"path": "C:\\tmp\\file", "quote": "say \"hi\"", "nl": "a\nb", "u": "\u00e9"}"#;
        assert_eq!(repair_span(span), span);
        let map = recover(span).unwrap();
        assert_eq!(map["path"], "C:\\tmp\\file");
        assert_eq!(map["quote"], "say \"hi\"");
        assert_eq!(map["u"], "é");
    }

    #[test]
    fn escaped_backticks_become_plain_backticks() {
        let raw = r#"{"answer": "Use \`cargo test\` to run"}"#;
        assert_eq!(recover(raw).unwrap()["answer"], "Use `cargo test` to run");
    }

    #[test]
    fn unknown_escape_keeps_its_backslash() {
        let raw = r#"{"regex": "\d+"}"#;
        assert_eq!(recover(raw).unwrap()["regex"], "\\d+");
    }

    #[test]
    fn backslash_u_without_hex_digits_is_data() {
        let raw = r#"{"questions": [{"question": "Where?", "answer": "C:\users\me"}]}"#;
        let questions: Vec<InterviewQuestion> = recover_questions(raw).unwrap();
        assert_eq!(questions[0].answer, "C:\\users\\me");

        let raw = r#"{"short": "tail \u12", "ok": "\u00E9"}"#;
        let map = recover(raw).unwrap();
        assert_eq!(map["short"], "tail \\u12");
        assert_eq!(map["ok"], "é");
    }

    #[test]
    fn code_fence_inside_a_fenced_answer() {
        let raw = "```json\n{\"questions\": [{\"question\": \"How do I start?\", \"answer\": \"Use:\\n```rust\\nfn main() {}\\n```\\nDone\"}]}\n```";
        let questions: Vec<InterviewQuestion> = recover_questions(raw).unwrap();
        assert_eq!(questions[0].answer, "Use:\n```rust\nfn main() {}\n```\nDone");
    }

    #[test]
    fn broken_fence_reports_the_fenced_span() {
        let raw = "```json\n{\"questions\": [1, 2 3]}\n```";
        match recover(raw) {
            Err(RecoveryError::Malformed { span, .. }) => {
                assert_eq!(span, "{\"questions\": [1, 2 3]}")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unescaped_inner_quotes_are_escaped() {
        let raw = r#"{"question": "What does "borrow" mean?", "answer": "Temporary access"}"#;
        let map = recover(raw).unwrap();
        assert_eq!(map["question"], "What does \"borrow\" mean?");
    }

    #[test]
    fn tabs_and_carriage_returns_inside_strings() {
        let raw = "{\"code\": \"a\tb\r\nc\"}";
        assert_eq!(recover(raw).unwrap()["code"], "a\tb\r\nc");
    }

    #[test]
    fn trailing_commas_are_tolerated() {
        let raw = "{\"questions\": [{\"question\": \"Q\", \"answer\": \"A\",},],}";
        let questions: Vec<InterviewQuestion> = recover_questions(raw).unwrap();
        assert_eq!(questions.len(), 1);
    }

    #[test]
    fn commas_inside_strings_survive_trailing_comma_strip() {
        assert_eq!(strip_trailing_commas(r#"{"a": "x, }"}"#), r#"{"a": "x, }"}"#);
    }

    #[test]
    fn no_braces_is_no_json_found() {
        assert_eq!(recover("I cannot help with that."), Err(RecoveryError::NoJsonFound));
        assert_eq!(recover("} backwards {"), Err(RecoveryError::NoJsonFound));
    }

    #[test]
    fn malformed_span_is_reported_with_span() {
        let raw = "Here: {\"questions\": [1, 2 3]}";
        match recover(raw) {
            Err(RecoveryError::Malformed { span, .. }) => {
                assert_eq!(span, "{\"questions\": [1, 2 3]}")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_questions_key_is_schema_mismatch() {
        let err = recover_questions::<QuizQuestion>("{\"items\": []}").unwrap_err();
        assert!(matches!(err, RecoveryError::SchemaMismatch(msg) if msg.contains("questions")));
    }

    #[test]
    fn record_missing_field_is_schema_mismatch() {
        let raw = r#"{"questions": [{"question": "Q?", "options": ["a", "b"], "answer": "a"}]}"#;
        let err = recover_questions::<QuizQuestion>(raw).unwrap_err();
        assert!(matches!(err, RecoveryError::SchemaMismatch(msg) if msg.contains("explanation")));
    }

    #[test]
    fn quiz_records_round_trip() {
        let raw = r#"```json
{"questions": [{"question": "2+2?", "options": ["1", "2", "3", "4"], "answer": "4", "explanation": "Arithmetic."}]}
```"#;
        let questions: Vec<QuizQuestion> = recover_questions(raw).unwrap();
        assert_eq!(
            questions,
            vec![QuizQuestion {
                question: "2+2?".into(),
                options: vec!["1".into(), "2".into(), "3".into(), "4".into()],
                answer: "4".into(),
                explanation: "Arithmetic.".into(),
            }]
        );
    }
}
