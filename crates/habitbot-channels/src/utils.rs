//! Shared utilities for channel implementations.

/// Split a long message into chunks that respect a platform's character limit.
///
/// Chunk boundaries always fall on UTF-8 char boundaries. A newline inside
/// the window is preferred as the cut point.
pub fn split_message(text: &str, max_len: usize) -> Vec<&str> {
    if text.len() <= max_len || max_len == 0 {
        return vec![text];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let mut end = (start + max_len).min(text.len());
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        if end == start {
            // A single char wider than max_len; emit it whole.
            end = start + text[start..].chars().next().map_or(1, char::len_utf8);
        }
        let cut = if end < text.len() {
            text[start..end]
                .rfind('\n')
                .map(|i| start + i + 1)
                .filter(|&i| i > start)
                .unwrap_or(end)
        } else {
            end
        };
        chunks.push(&text[start..cut]);
        start = cut;
    }

    chunks
}
