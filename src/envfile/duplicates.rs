//! Duplicate key detection.

use super::{classify, LineKind};
use std::collections::HashMap;
use std::fmt;

/// A key that appears on more than one entry line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateKey {
    pub key: String,
    /// 1-based line numbers, ascending.
    pub lines: Vec<usize>,
}

/// Keys occurring at least twice, in the order each key was first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateReport(Vec<DuplicateKey>);

impl DuplicateReport {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DuplicateKey> {
        self.0.iter()
    }
}

/// Renders as `X (1, 3), Y (2, 4)`.
impl fmt::Display for DuplicateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, dup) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            let nums: Vec<String> = dup.lines.iter().map(ToString::to_string).collect();
            write!(f, "{} ({})", dup.key, nums.join(", "))?;
        }
        Ok(())
    }
}

/// Scan entry lines once and report every key seen more than once.
///
/// Comments and blank lines are skipped; line numbers still count them.
pub fn detect_duplicates<S: AsRef<str>>(lines: &[S]) -> DuplicateReport {
    let mut order: Vec<(&str, Vec<usize>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for (i, line) in lines.iter().enumerate() {
        if let LineKind::Entry { key, .. } = classify(line.as_ref()) {
            let slot = *index.entry(key).or_insert_with(|| {
                order.push((key, Vec::new()));
                order.len() - 1
            });
            order[slot].1.push(i + 1);
        }
    }

    DuplicateReport(
        order
            .into_iter()
            .filter(|(_, nums)| nums.len() > 1)
            .map(|(key, lines)| DuplicateKey { key: key.to_string(), lines })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(report: &DuplicateReport) -> Vec<(String, Vec<usize>)> {
        report.iter().map(|d| (d.key.clone(), d.lines.clone())).collect()
    }

    #[test]
    fn unique_keys_report_nothing() {
        let report = detect_duplicates(&["A=1", "B=2", "C=3"]);
        assert!(report.is_empty());
        assert_eq!(report.to_string(), "");
    }

    #[test]
    fn commented_duplicate_is_ignored() {
        let report = detect_duplicates(&["A=1", "A=2", "# A=3"]);
        assert_eq!(pairs(&report), vec![("A".to_string(), vec![1, 2])]);
    }

    #[test]
    fn line_numbers_count_every_line() {
        let report = detect_duplicates(&["X=1", "", "# c", "Y=2", "X=3"]);
        assert_eq!(pairs(&report), vec![("X".to_string(), vec![1, 5])]);
    }

    #[test]
    fn first_seen_order_is_kept() {
        let report = detect_duplicates(&["B=1", "A=1", "A=2", "B=2", "B=3"]);
        assert_eq!(
            pairs(&report),
            vec![("B".to_string(), vec![1, 4, 5]), ("A".to_string(), vec![2, 3])]
        );
        assert_eq!(report.to_string(), "B (1, 4, 5), A (2, 3)");
    }

    #[test]
    fn keys_compare_after_trimming() {
        let report = detect_duplicates(&["KEY=1", "  KEY = 2", "KEY"]);
        assert_eq!(pairs(&report), vec![("KEY".to_string(), vec![1, 2, 3])]);
    }

    #[test]
    fn empty_buffer() {
        let lines: [&str; 1] = [""];
        assert!(detect_duplicates(&lines).is_empty());
    }
}
