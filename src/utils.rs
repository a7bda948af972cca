//! Utility functions.

use chrono::{DateTime, Local}; // timestamp formatting
use std::time::SystemTime; // file modification times
use unicode_width::UnicodeWidthChar; // terminal column widths

/// Convert a "character index" to a "byte index" in a UTF‑8 string.
///
/// Rust strings are UTF‑8, so you cannot safely slice with `s[a..b]` unless `a` and `b` are
/// **byte offsets** that lie on UTF‑8 character boundaries.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices().nth(char_idx).map_or(s.len(), |(bi, _)| bi)
}

/// Number of decimal digits in `n` (used to size the line-number gutter).
pub fn digits(n: usize) -> usize {
    n.to_string().len()
}

/// Terminal columns taken by the first `chars` characters of `s`.
pub fn display_width(s: &str, chars: usize) -> usize {
    s.chars().take(chars).map(|ch| UnicodeWidthChar::width(ch).unwrap_or(1)).sum()
}

/// Cut `s` so it fits into `width` terminal columns.
pub fn fit_width(s: &str, width: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(1);
        if used + w > width {
            break;
        }
        used += w;
        out.push(ch);
    }
    out
}

/// Local-time `YYYY-MM-DD HH:MM:SS`, or `-` when unknown.
pub fn format_mtime(t: Option<SystemTime>) -> String {
    t.map_or_else(
        || "-".to_string(),
        |t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}
