//! Log Redaction
//!
//! Scrubs phone numbers from strings before they reach a log sink or a
//! log-stream client.

use regex::Regex;
use std::sync::LazyLock;

static TELEPHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap()
});

/// Redacts phone numbers in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    TELEPHONE_RE
        .replace_all(input, "[REDACTED_PHONE]")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redaction() {
        let raw = "Sending to +1-555-123-4567 via trunk";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("+1-555-123-4567"));
        assert_eq!(clean, "Sending to [REDACTED_PHONE] via trunk");
    }

    #[test]
    fn test_e164_number_redacted() {
        assert_eq!(redact_sensitive_data("+15551234567"), "[REDACTED_PHONE]");
    }

    #[test]
    fn test_text_without_number_unchanged() {
        assert_eq!(redact_sensitive_data("created dispatch"), "created dispatch");
    }
}
