//! Profile file format: one `KEY=value`, `# comment` or blank line per line.
//!
//! Everything that needs to know what an "entry" is goes through [`classify`], so the entry
//! counter, the duplicate detector and the sort comparators always agree.

mod duplicates;
mod sort;

pub use duplicates::{detect_duplicates, DuplicateReport};
pub use sort::{sort_lines, SortMode};

/// What a single line of a profile holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Empty after trimming.
    Blank,
    /// Trimmed form starts with `#`.
    Comment,
    /// Anything else, split on the first `=`.
    Entry { key: &'a str, value: &'a str },
}

/// Classify a line.
///
/// Key and value are trimmed. A line without `=` is still an entry: the whole trimmed line is
/// the key and the value is empty.
pub fn classify(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if trimmed.starts_with('#') {
        return LineKind::Comment;
    }
    match trimmed.split_once('=') {
        Some((key, value)) => LineKind::Entry { key: key.trim(), value: value.trim() },
        None => LineKind::Entry { key: trimmed, value: "" },
    }
}

/// Number of entry lines.
pub fn count_entries<S: AsRef<str>>(lines: &[S]) -> usize {
    lines
        .iter()
        .filter(|l| matches!(classify(l.as_ref()), LineKind::Entry { .. }))
        .count()
}

/// Entry count plus duplicate report for a set of lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub entries: usize,
    pub duplicates: DuplicateReport,
}

impl Summary {
    pub fn of<S: AsRef<str>>(lines: &[S]) -> Self {
        Self {
            entries: count_entries(lines),
            duplicates: detect_duplicates(lines),
        }
    }
}
