//! Comment toggling for the line under the cursor.

use super::Editor;
use crate::buffer::Buffer;
use crate::types::MessageKind;

/// Marker put in front of a line when commenting it.
const COMMENT_PREFIX: &str = "# ";

/// The commented or uncommented form of `line`, and whether it was uncommented.
///
/// Uncommenting drops leading indentation, one `#`, and the whitespace right after it.
/// Commenting prefixes the line verbatim with `"# "`.
fn toggled(line: &str) -> (String, bool) {
    let trimmed = line.trim_start();
    match trimmed.strip_prefix('#') {
        Some(rest) => (rest.trim_start().to_string(), true),
        None => (format!("{COMMENT_PREFIX}{line}"), false),
    }
}

/// Toggle the comment on line `row`, returning the new cursor column.
///
/// The edit goes through [`Buffer::replace_range`] over the exact byte span of that line, so
/// no other line is touched. Returns `None` when `row` is out of range.
pub fn toggle_comment(buf: &mut Buffer, row: usize, col: usize) -> Option<usize> {
    let (start, end) = buf.line_span(row)?;
    let (new_line, uncommented) = toggled(&buf.lines[row]);
    let new_len = new_line.chars().count();
    buf.replace_range(start, end, &new_line).ok()?;

    let col = if uncommented { col.saturating_sub(2) } else { col + 2 };
    Some(col.min(new_len))
}

impl Editor {
    /// `Ctrl+\`: comment or uncomment the cursor line.
    pub fn toggle_comment_at_cursor(&mut self) {
        match toggle_comment(&mut self.buf, self.cursor.y, self.cursor.x) {
            Some(x) => {
                self.cursor.x = x;
                self.on_buffer_changed();
            }
            None => {
                tracing::warn!(row = self.cursor.y, "comment toggle on invalid line");
                self.set_status("Cannot toggle comment here.", MessageKind::Error, Some(super::SAVED_MSG_TTL));
            }
        }
    }
}
