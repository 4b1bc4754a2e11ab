//! Plain-text cleanup for article bodies before they go into a prompt.

use regex::Regex;
use std::sync::LazyLock;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("static regex compile"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static regex compile"));

/// Marker appended to text cut by [`truncate_chars`].
pub const ELLIPSIS: &str = "...";

/// Strip markup, decode HTML entities and collapse whitespace.
///
/// Tags are removed by pattern, not parsed, so malformed markup may leave
/// stray characters behind. The cleanup is repeated until the text stops
/// changing: decoding `&lt;b&gt;` yields a new tag that the next round strips,
/// which keeps the function idempotent.
pub fn clean_text(text: &str) -> String {
    let mut current = clean_once(text);
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_once(text: &str) -> String {
    let stripped = TAG.replace_all(text, "");
    let decoded = html_escape::decode_html_entities(&stripped);
    WHITESPACE.replace_all(&decoded, " ").trim().to_string()
}

/// Cut `text` to at most `max_chars` characters, appending [`ELLIPSIS`] when anything was dropped.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}{}", &text[..byte_index], ELLIPSIS),
        None => text.to_string(),
    }
}
