//! Cursor movement.

use super::Editor; // main editor logic
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers}; // terminal events
use std::cmp::min; // comparison helpers

impl Editor {
    /// Move the cursor in response to a movement key.
    ///
    /// Home/End go to the start/end of the line; with Ctrl, to the top/bottom of the profile.
    pub fn move_cursor(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let page = self.body_height();
        let mut p = self.cursor;

        match key.code {
            KeyCode::Left => {
                if p.x > 0 {
                    p.x -= 1;
                } else if p.y > 0 {
                    p.y -= 1;
                    p.x = self.buf.line_len_chars(p.y);
                }
            }
            KeyCode::Right => {
                if p.x < self.buf.line_len_chars(p.y) {
                    p.x += 1;
                } else if p.y + 1 < self.buf.line_count() {
                    p.y += 1;
                    p.x = 0;
                }
            }
            KeyCode::Up => {
                p.y = p.y.saturating_sub(1);
                p.x = min(p.x, self.buf.line_len_chars(p.y));
            }
            KeyCode::Down => {
                if p.y + 1 < self.buf.line_count() {
                    p.y += 1;
                    p.x = min(p.x, self.buf.line_len_chars(p.y));
                }
            }
            KeyCode::Home if ctrl => p = Default::default(),
            KeyCode::Home => p.x = 0,
            KeyCode::End if ctrl => {
                p.y = self.buf.line_count().saturating_sub(1);
                p.x = self.buf.line_len_chars(p.y);
            }
            KeyCode::End => p.x = self.buf.line_len_chars(p.y),
            KeyCode::PageUp => {
                p.y = p.y.saturating_sub(page);
                p.x = min(p.x, self.buf.line_len_chars(p.y));
            }
            KeyCode::PageDown => {
                p.y = min(p.y + page, self.buf.line_count().saturating_sub(1));
                p.x = min(p.x, self.buf.line_len_chars(p.y));
            }
            _ => return,
        }

        self.cursor = self.buf.clamp_pos(p);
        self.ensure_visible();
    }
}
