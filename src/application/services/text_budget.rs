/// Truncates `text` to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Number of characters in `text` once surrounding whitespace is removed.
pub fn meaningful_len(text: &str) -> usize {
    text.trim().chars().count()
}
