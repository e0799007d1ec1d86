//! Gemini client module for configuration extraction and feedback.
//!
//! Both clients wrap a RIG agent over the Gemini provider and issue one
//! remote call per turn. Responses are plain text; any fenced JSON markup is
//! stripped before use.

mod extractor;
mod feedback;

pub use extractor::ConfigExtractor;
pub use feedback::FeedbackClient;

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Errors decoding a model response into usable output.
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("model returned an empty response")]
    Empty,
    #[error("model response is not a valid configuration: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").unwrap());

/// Unwrap fenced ```json blocks, returning the inner text.
///
/// Non-fenced input passes through unchanged; bare ``` fences are also
/// accepted because the model does not tag the language reliably.
pub fn strip_code_fences(text: &str) -> String {
    FENCE_RE.replace_all(text, "$1").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tagged_fence() {
        let text = "```json\n{\"project_name\": \"P\"}\n```";
        assert_eq!(strip_code_fences(text), "{\"project_name\": \"P\"}");
    }

    #[test]
    fn strips_bare_fence() {
        let text = "```\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(text), "{\"a\": 1}");
    }

    #[test]
    fn leaves_plain_text_alone() {
        let text = "Everything looks good!";
        assert_eq!(strip_code_fences(text), text);
    }

    #[test]
    fn unwraps_fence_embedded_in_prose() {
        let text = "Here is the update:\n```json\n{}\n```\nDone.";
        assert_eq!(strip_code_fences(text), "Here is the update:\n{}\nDone.");
    }

    #[test]
    fn strips_multiline_body() {
        let text = "```json\n{\n  \"phases\": [\n    \"Planning\"\n  ]\n}\n```";
        let stripped = strip_code_fences(text);
        assert!(stripped.starts_with('{'));
        assert!(stripped.ends_with('}'));
        assert!(stripped.contains("Planning"));
    }
}
