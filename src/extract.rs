//! HTML to plain text for the webpage tool

use scraper::{Html, Node};
use tracing::debug;

/// Character budget for extracted page text
pub const MAX_TEXT_CHARS: usize = 5000;

/// Appended when the text was cut at the budget
pub const TRUNCATION_MARKER: &str = "... [truncated]";

/// Elements whose text never reaches the model
const NON_CONTENT_TAGS: [&str; 5] = ["script", "style", "nav", "footer", "header"];

/// Extract the visible text of an HTML document.
///
/// `source` is only used for logging.
#[must_use]
pub fn extract_text(html: &[u8], source: &str, max_chars: usize) -> String {
    let html = String::from_utf8_lossy(html);
    let raw = visible_text(&html);
    let clean = collapse(&raw);
    let (text, truncated) = truncate_chars(&clean, max_chars);

    debug!(
        "Extracted {} chars from {}{}",
        clean.chars().count(),
        source,
        if truncated { " (truncated)" } else { "" }
    );
    text
}

/// Concatenated text nodes outside non-content elements
fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut text = String::new();

    for node in document.tree.root().descendants() {
        let Node::Text(chunk) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| NON_CONTENT_TAGS.contains(&el.name()))
        });
        if !hidden {
            text.push_str(chunk);
        }
    }

    text
}

/// Trim every line, split lines on double spaces, drop empty phrases and join
/// what is left with single spaces.
fn collapse(text: &str) -> String {
    text.split(is_line_break)
        .map(str::trim)
        .flat_map(|line| line.split("  "))
        .map(str::trim)
        .filter(|phrase| !phrase.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Keep the first `max_chars` characters and append the marker if anything was cut
fn truncate_chars(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => (format!("{}{TRUNCATION_MARKER}", &text[..cut]), true),
        None => (text.to_string(), false),
    }
}
