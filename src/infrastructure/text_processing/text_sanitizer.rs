use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static BROKEN_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w)-[ \t]*\r?\n[ \t]*(\w)").unwrap());

/// Cleans the raw text of one PDF page: NFKC normalization, words split
/// across lines rejoined, control characters dropped, runs of spaces
/// collapsed and at most one blank line kept between paragraphs.
pub fn sanitize_page_text(raw: &str) -> String {
    let normalized: String = raw.nfkc().collect();
    let rejoined = BROKEN_WORD.replace_all(&normalized, "$1$2");

    let mut paragraphs: Vec<String> = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for line in rejoined.lines() {
        let cleaned = line
            .chars()
            .filter(|c| !c.is_control() || *c == '\t')
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        if cleaned.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(cleaned);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }

    paragraphs.join("\n\n")
}
