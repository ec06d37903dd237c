//! Log Redaction
//!
//! Scrubs API keys and bearer tokens from strings prior to logging.

use regex::Regex;
use std::sync::LazyLock;

static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(sk-[a-zA-Z0-9_\-]{20,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)").unwrap()
});

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    API_KEY_RE.replace_all(input, "[REDACTED_TOKEN]").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_anthropic_keys() {
        let raw = "auth failed for sk-ant-REDACTED";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("AbCdEf"));
        assert!(clean.starts_with("auth failed for [REDACTED_TOKEN]"));
    }

    #[test]
    fn redacts_bearer_tokens() {
        let clean = redact_sensitive_data("Bearer eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9");
        assert_eq!(clean, "[REDACTED_TOKEN]");
    }

    #[test]
    fn leaves_ordinary_text() {
        let text = "Error analysing bill: 529 Overloaded";
        assert_eq!(redact_sensitive_data(text), text);
    }
}
