//! Plain-text cleanup for free-text fields scraped from HTML-bearing payloads.

use once_cell::sync::Lazy;
use regex::Regex;

// Tag-shaped, not a parser: matches open, close, self-closing and malformed tags.
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Strip markup, decode HTML entities and collapse whitespace.
///
/// Absent or empty input yields an empty string. Never fails; malformed markup
/// is cleaned on a best-effort basis.
pub fn sanitize(raw: Option<&str>) -> String {
    let raw = match raw {
        Some(s) if !s.is_empty() => s,
        _ => return String::new(),
    };

    let without_tags = TAG_RE.replace_all(raw, "");
    // Decoded `<` and `>` are text, so tags are stripped before decoding only
    let decoded = html_escape::decode_html_entities(&without_tags);
    // `\s` is Unicode-aware, so decoded &nbsp; collapses too
    WS_RE.replace_all(&decoded, " ").trim().to_string()
}
