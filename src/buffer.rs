//! The line store: the profile text as a list of lines plus the editing primitives.

use crate::types::Pos; // cursor positions
use crate::utils::char_to_byte_index; // utf-8 index conversion
use anyhow::{Context, Result}; // load errors
use std::cmp::min; // comparison helpers
use std::fs; // file reads
use std::io::ErrorKind; // missing-file detection
use std::path::Path; // profile paths

/// Lines are always joined and split with this separator.
pub const SEPARATOR: &str = "\n";

/// A byte range that does not address the buffer.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("range {start}..{end} is reversed")]
    Reversed { start: usize, end: usize },
    #[error("offset {0} is past the end of the buffer ({1} bytes)")]
    OutOfBounds(usize, usize),
    #[error("offset {0} is not on a character boundary")]
    NotCharBoundary(usize),
}

/// The document buffer: a list of lines (each line is a `String`, never containing `\n`).
///
/// The buffer always equals `text.split('\n')` of the text it was built from, so an empty
/// text is a single empty line.
#[derive(Debug, Clone)]
pub struct Buffer {
    pub lines: Vec<String>,
}

impl Buffer {
    /// Build a buffer from text.
    pub fn from_string(s: &str) -> Self {
        Self { lines: s.split(SEPARATOR).map(str::to_string).collect() }
    }

    /// Read a profile from disk. A missing file is an empty buffer so a new profile can be
    /// opened straight into the editor; any other read failure is an error.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(s) => Ok(Self::from_string(&s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::from_string("")),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    /// The full text, lines joined with [`SEPARATOR`].
    pub fn text(&self) -> String {
        self.lines.join(SEPARATOR)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line_len_chars(&self, y: usize) -> usize {
        self.lines.get(y).map_or(0, |l| l.chars().count())
    }

    /// Total length of the joined text in bytes.
    pub fn len_bytes(&self) -> usize {
        self.line_offset(self.lines.len()).saturating_sub(SEPARATOR.len())
    }

    /// Byte offset at which line `y` starts in the joined text.
    ///
    /// This is the sum of the byte lengths of all preceding lines plus one separator after
    /// each of them. `y == line_count()` gives the offset just past the last separator.
    pub fn line_offset(&self, y: usize) -> usize {
        self.lines
            .iter()
            .take(y)
            .map(|l| l.len() + SEPARATOR.len())
            .sum()
    }

    /// Byte span `(start, end)` of line `y`, excluding its separator.
    pub fn line_span(&self, y: usize) -> Option<(usize, usize)> {
        let line = self.lines.get(y)?;
        let start = self.line_offset(y);
        Some((start, start + line.len()))
    }

    /// Swap the whole text.
    pub fn replace_all(&mut self, text: &str) {
        *self = Self::from_string(text);
    }

    /// Map a byte offset in the joined text to (line, byte-in-line).
    fn locate(&self, offset: usize) -> Result<(usize, usize), RangeError> {
        let mut start = 0;
        for (y, line) in self.lines.iter().enumerate() {
            let end = start + line.len();
            if offset <= end {
                let b = offset - start;
                if !line.is_char_boundary(b) {
                    return Err(RangeError::NotCharBoundary(offset));
                }
                return Ok((y, b));
            }
            start = end + SEPARATOR.len();
        }
        Err(RangeError::OutOfBounds(offset, self.len_bytes()))
    }

    /// Splice `text` over the bytes `start..end` of the joined text.
    ///
    /// Only the lines the range touches are rebuilt; everything else is left in place.
    pub fn replace_range(&mut self, start: usize, end: usize, text: &str) -> Result<(), RangeError> {
        if start > end {
            return Err(RangeError::Reversed { start, end });
        }
        let (y0, b0) = self.locate(start)?;
        let (y1, b1) = self.locate(end)?;

        let mut joined = String::with_capacity(b0 + text.len() + self.lines[y1].len() - b1);
        joined.push_str(&self.lines[y0][..b0]);
        joined.push_str(text);
        joined.push_str(&self.lines[y1][b1..]);

        let replacement: Vec<String> = joined.split(SEPARATOR).map(str::to_string).collect();
        self.lines.splice(y0..=y1, replacement);
        Ok(())
    }

    /// Clamp a position to a valid line and a valid column within that line.
    pub fn clamp_pos(&self, mut p: Pos) -> Pos {
        p.y = min(p.y, self.lines.len().saturating_sub(1));
        p.x = min(p.x, self.line_len_chars(p.y));
        p
    }

    /// Insert a single character at a position, returning the new cursor position.
    pub fn insert_char(&mut self, p: Pos, ch: char) -> Pos {
        let p = self.clamp_pos(p);
        let line = &mut self.lines[p.y];
        let bi = char_to_byte_index(line, p.x);
        line.insert(bi, ch);
        Pos { y: p.y, x: p.x + 1 }
    }

    /// Insert a newline at a position, splitting the current line in two.
    pub fn insert_newline(&mut self, p: Pos) -> Pos {
        let p = self.clamp_pos(p);
        let line = &mut self.lines[p.y];
        let bi = char_to_byte_index(line, p.x);
        let rest = line.split_off(bi);
        self.lines.insert(p.y + 1, rest);
        Pos { y: p.y + 1, x: 0 }
    }

    /// Backspace behavior:
    /// - If `x > 0`, delete the previous character.
    /// - If at start of line (`x == 0`) and not the first line, merge with previous line.
    pub fn delete_backspace(&mut self, p: Pos) -> Pos {
        let p = self.clamp_pos(p);
        if p.x > 0 {
            let line = &mut self.lines[p.y];
            let bi = char_to_byte_index(line, p.x - 1);
            line.remove(bi);
            Pos { y: p.y, x: p.x - 1 }
        } else if p.y > 0 {
            let cur = self.lines.remove(p.y);
            let prev = &mut self.lines[p.y - 1];
            let prev_len = prev.chars().count();
            prev.push_str(&cur);
            Pos { y: p.y - 1, x: prev_len }
        } else {
            p
        }
    }

    /// Delete-key behavior:
    /// - If within the line, delete the character at the cursor.
    /// - If at end of line and there is a next line, merge with next line.
    pub fn delete_delete(&mut self, p: Pos) -> Pos {
        let p = self.clamp_pos(p);
        if p.x < self.line_len_chars(p.y) {
            let line = &mut self.lines[p.y];
            let bi = char_to_byte_index(line, p.x);
            line.remove(bi);
        } else if p.y + 1 < self.lines.len() {
            let next = self.lines.remove(p.y + 1);
            self.lines[p.y].push_str(&next);
        }
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ==================== construction ====================

    #[test]
    fn from_string_empty_is_one_empty_line() {
        let buf = Buffer::from_string("");
        assert_eq!(buf.lines, vec![String::new()]);
        assert_eq!(buf.len_bytes(), 0);
    }

    #[test]
    fn from_string_keeps_trailing_empty_line() {
        let buf = Buffer::from_string("A=1\nB=2\n");
        assert_eq!(buf.lines, vec!["A=1", "B=2", ""]);
        assert_eq!(buf.text(), "A=1\nB=2\n");
    }

    #[test]
    fn load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let buf = Buffer::load(&dir.path().join("nope.env")).unwrap();
        assert_eq!(buf.text(), "");
    }

    #[test]
    fn load_reads_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dev.env");
        fs::write(&path, "A=1\n# c").unwrap();
        let buf = Buffer::load(&path).unwrap();
        assert_eq!(buf.lines, vec!["A=1", "# c"]);
    }

    #[test]
    fn load_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(Buffer::load(dir.path()).is_err());
    }

    #[test]
    fn replace_all_swaps_everything() {
        let mut buf = Buffer::from_string("old");
        buf.replace_all("a\nb");
        assert_eq!(buf.lines, vec!["a", "b"]);
    }

    // ==================== offsets ====================

    #[test]
    fn line_offsets_include_separators() {
        let buf = Buffer::from_string("ab\n\ncde");
        assert_eq!(buf.line_offset(0), 0);
        assert_eq!(buf.line_offset(1), 3);
        assert_eq!(buf.line_offset(2), 4);
        assert_eq!(buf.line_span(2), Some((4, 7)));
        assert_eq!(buf.line_span(3), None);
        assert_eq!(buf.len_bytes(), buf.text().len());
    }

    #[test]
    fn line_offsets_are_bytes() {
        let buf = Buffer::from_string("é=1\nB=2");
        assert_eq!(buf.line_span(0), Some((0, 4)));
        assert_eq!(buf.line_offset(1), 5);
    }

    // ==================== replace_range ====================

    #[test]
    fn replace_first_line() {
        let mut buf = Buffer::from_string("A=1\nB=2\nC=3");
        let (s, e) = buf.line_span(0).unwrap();
        buf.replace_range(s, e, "# A=1").unwrap();
        assert_eq!(buf.lines, vec!["# A=1", "B=2", "C=3"]);
    }

    #[test]
    fn replace_last_line() {
        let mut buf = Buffer::from_string("A=1\nB=2\nC=3");
        let (s, e) = buf.line_span(2).unwrap();
        buf.replace_range(s, e, "C=4").unwrap();
        assert_eq!(buf.lines, vec!["A=1", "B=2", "C=4"]);
    }

    #[test]
    fn replace_in_empty_buffer() {
        let mut buf = Buffer::from_string("");
        let (s, e) = buf.line_span(0).unwrap();
        assert_eq!((s, e), (0, 0));
        buf.replace_range(s, e, "# ").unwrap();
        assert_eq!(buf.lines, vec!["# "]);
    }

    #[test]
    fn replace_across_lines_and_with_newlines() {
        let mut buf = Buffer::from_string("ab\ncd\nef");
        buf.replace_range(1, 4, "X\nY").unwrap();
        assert_eq!(buf.lines, vec!["aX", "Yd", "ef"]);
    }

    #[test]
    fn replace_rejects_bad_ranges() {
        let mut buf = Buffer::from_string("é\nb");
        assert_eq!(buf.replace_range(2, 1, ""), Err(RangeError::Reversed { start: 2, end: 1 }));
        assert_eq!(buf.replace_range(0, 9, ""), Err(RangeError::OutOfBounds(9, 4)));
        assert_eq!(buf.replace_range(1, 1, ""), Err(RangeError::NotCharBoundary(1)));
        assert_eq!(buf.lines, vec!["é", "b"]);
    }

    // ==================== editing ====================

    #[test]
    fn insert_char_unicode() {
        let mut buf = Buffer::from_string("hllo");
        let pos = buf.insert_char(Pos { y: 0, x: 1 }, 'é');
        assert_eq!(pos, Pos { y: 0, x: 2 });
        assert_eq!(buf.lines[0], "héllo");
    }

    #[test]
    fn insert_newline_splits() {
        let mut buf = Buffer::from_string("KEY=value");
        let pos = buf.insert_newline(Pos { y: 0, x: 4 });
        assert_eq!(pos, Pos { y: 1, x: 0 });
        assert_eq!(buf.lines, vec!["KEY=", "value"]);
    }

    #[test]
    fn backspace_merges_lines() {
        let mut buf = Buffer::from_string("A=1\nB=2");
        let pos = buf.delete_backspace(Pos { y: 1, x: 0 });
        assert_eq!(pos, Pos { y: 0, x: 3 });
        assert_eq!(buf.lines, vec!["A=1B=2"]);
    }

    #[test]
    fn backspace_at_origin_is_noop() {
        let mut buf = Buffer::from_string("A");
        assert_eq!(buf.delete_backspace(Pos { y: 0, x: 0 }), Pos { y: 0, x: 0 });
        assert_eq!(buf.lines, vec!["A"]);
    }

    #[test]
    fn delete_merges_next_line() {
        let mut buf = Buffer::from_string("A=1\nB=2");
        let pos = buf.delete_delete(Pos { y: 0, x: 3 });
        assert_eq!(pos, Pos { y: 0, x: 3 });
        assert_eq!(buf.lines, vec!["A=1B=2"]);
    }

    #[test]
    fn clamp_pos_works() {
        let buf = Buffer::from_string("short\nlonger line");
        assert_eq!(buf.clamp_pos(Pos { y: 100, x: 0 }).y, 1);
        assert_eq!(buf.clamp_pos(Pos { y: 0, x: 100 }).x, 5);
    }
}
