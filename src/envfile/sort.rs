//! Whole-buffer sort transforms.

use super::{classify, LineKind};
use serde::Deserialize;
use std::fmt;

/// Comparator applied to reorder profile lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    None,
    /// Lexicographic on the key.
    Key,
    /// Ascending key length.
    #[value(name = "keylen")]
    KeyLen,
    /// Ascending value length.
    #[value(name = "vallen")]
    ValLen,
}

impl SortMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Key => "key",
            Self::KeyLen => "keylen",
            Self::ValLen => "vallen",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key and value used for ordering. Comments and blanks sort as `("", "")`.
fn sort_fields(line: &str) -> (&str, &str) {
    match classify(line) {
        LineKind::Entry { key, value } => (key, value),
        LineKind::Blank | LineKind::Comment => ("", ""),
    }
}

/// Stable reorder of every line (nothing is filtered out).
pub fn sort_lines(lines: &mut [String], mode: SortMode) {
    match mode {
        SortMode::None => {}
        SortMode::Key => lines.sort_by(|a, b| sort_fields(a).0.cmp(sort_fields(b).0)),
        SortMode::KeyLen => {
            lines.sort_by_key(|l| sort_fields(l).0.chars().count());
        }
        SortMode::ValLen => {
            lines.sort_by_key(|l| sort_fields(l).1.chars().count());
        }
    }
}
