use std::sync::LazyLock;

use regex::Regex;

use crate::application::services::truncate_chars;

const MAX_VISIBLE_CHARS: usize = 100;

static SECRETS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(bearer\s+|(?:api_key|key|token|password|secret)=)[^\s&"']+"#).unwrap()
});

/// Shortens model-derived text (captions, transcripts, prompts) for a log
/// line and masks anything that looks like a credential.
pub fn sanitize_for_log(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "[EMPTY]".to_string();
    }

    let total = trimmed.chars().count();
    let visible = if total > MAX_VISIBLE_CHARS {
        format!(
            "{}... ({} chars total)",
            truncate_chars(trimmed, MAX_VISIBLE_CHARS),
            total
        )
    } else {
        trimmed.to_string()
    };

    SECRETS.replace_all(&visible, "${1}[REDACTED]").into_owned()
}
