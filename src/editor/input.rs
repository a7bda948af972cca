//! Key dispatch for the editing session.

use super::{Editor, SessionState};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Spaces inserted for Tab.
const TAB: &str = "    ";

/// `Ctrl+\` arrives as `Char('\\')` with the kitty protocol and as `Char('4')` from the
/// legacy 0x1C control byte.
fn is_comment_toggle(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('\\' | '4'))
}

impl Editor {
    /// Top-level key handler.
    ///
    /// Returns `true` once the session has terminated. Unknown keys are ignored; nothing here
    /// fails, in-session errors end up on the message line.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self.state {
            SessionState::Editing => self.handle_editing_key(key),
            SessionState::SortDialogOpen { selected } => self.handle_sort_dialog_key(selected, key),
            SessionState::QuitConfirmDialogOpen { selected } => self.handle_quit_dialog_key(selected, key),
            SessionState::Terminated => {}
        }
        self.state == SessionState::Terminated
    }

    fn handle_editing_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if is_comment_toggle(&key) {
            self.toggle_comment_at_cursor();
            return;
        }

        match key.code {
            KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right | KeyCode::Home | KeyCode::End
            | KeyCode::PageUp | KeyCode::PageDown => {
                self.move_cursor(key);
                return;
            }
            _ => {}
        }

        // Session commands
        match (key.code, ctrl) {
            (KeyCode::Char('s'), true) => {
                // Failures are already on the message line.
                let _ = self.save();
                return;
            }
            (KeyCode::Char('o'), true) => { self.open_sort_dialog(); return; }
            (KeyCode::Char('x'), true) => { self.request_quit(); return; }
            (KeyCode::Char('r'), true) => { self.revert_to_backup(); return; }
            _ => {}
        }

        // Text input
        match key.code {
            KeyCode::Enter => {
                self.cursor = self.buf.insert_newline(self.cursor);
                self.on_buffer_changed();
            }
            KeyCode::Backspace => {
                let before = (self.cursor, self.buf.line_count());
                self.cursor = self.buf.delete_backspace(self.cursor);
                if before != (self.cursor, self.buf.line_count()) {
                    self.on_buffer_changed();
                }
            }
            KeyCode::Delete => {
                let len = self.buf.line_len_chars(self.cursor.y);
                if self.cursor.x < len || self.cursor.y + 1 < self.buf.line_count() {
                    self.cursor = self.buf.delete_delete(self.cursor);
                    self.on_buffer_changed();
                }
            }
            KeyCode::Tab => {
                for ch in TAB.chars() {
                    self.cursor = self.buf.insert_char(self.cursor, ch);
                }
                self.on_buffer_changed();
            }
            KeyCode::Char(ch) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                self.cursor = self.buf.insert_char(self.cursor, ch);
                self.on_buffer_changed();
            }
            _ => {}
        }
    }
}
