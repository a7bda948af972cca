//! The session state machine: plain editing plus the two modal dialogs.
//!
//! ```text
//! Editing --Ctrl+O--> SortDialogOpen --{Key, Key Length, Value Length, Cancel}--> Editing
//! Editing --Ctrl+X (clean)--> Terminated
//! Editing --Ctrl+X (dirty)--> QuitConfirmDialogOpen
//!     Save      -> save, then Terminated (Editing again if the save failed)
//!     Don't Save -> Terminated
//!     Cancel    -> Editing
//! ```

use super::Editor;
use crate::envfile::SortMode;
use crate::types::MessageKind;
use crossterm::event::{KeyCode, KeyEvent};

/// Where an editing session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Editing,
    /// `selected` indexes [`SortChoice::ALL`].
    SortDialogOpen { selected: usize },
    /// `selected` indexes [`QuitChoice::ALL`].
    QuitConfirmDialogOpen { selected: usize },
    Terminated,
}

/// A button row in a modal dialog.
pub trait Choice: Copy + Sized + 'static {
    const ALL: &'static [Self];
    /// Text above the buttons.
    const PROMPT: &'static str;
    /// Choice taken on Esc.
    const CANCEL: Self;

    fn label(self) -> &'static str;
    /// Lowercase shortcut key.
    fn shortcut(self) -> char;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortChoice {
    Key,
    KeyLength,
    ValueLength,
    Cancel,
}

impl SortChoice {
    fn mode(self) -> Option<SortMode> {
        match self {
            Self::Key => Some(SortMode::Key),
            Self::KeyLength => Some(SortMode::KeyLen),
            Self::ValueLength => Some(SortMode::ValLen),
            Self::Cancel => None,
        }
    }
}

impl Choice for SortChoice {
    const ALL: &'static [Self] = &[Self::Key, Self::KeyLength, Self::ValueLength, Self::Cancel];
    const PROMPT: &'static str = "Sort by:";
    const CANCEL: Self = Self::Cancel;

    fn label(self) -> &'static str {
        match self {
            Self::Key => "Key",
            Self::KeyLength => "Key Length",
            Self::ValueLength => "Value Length",
            Self::Cancel => "Cancel",
        }
    }

    fn shortcut(self) -> char {
        match self {
            Self::Key => 'k',
            Self::KeyLength => 'l',
            Self::ValueLength => 'v',
            Self::Cancel => 'c',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitChoice {
    Save,
    DontSave,
    Cancel,
}

impl Choice for QuitChoice {
    const ALL: &'static [Self] = &[Self::Save, Self::DontSave, Self::Cancel];
    const PROMPT: &'static str = "You have unsaved changes. Save before quitting?";
    const CANCEL: Self = Self::Cancel;

    fn label(self) -> &'static str {
        match self {
            Self::Save => "Save",
            Self::DontSave => "Don't Save",
            Self::Cancel => "Cancel",
        }
    }

    fn shortcut(self) -> char {
        match self {
            Self::Save => 's',
            Self::DontSave => 'd',
            Self::Cancel => 'c',
        }
    }
}

/// Outcome of one key press inside a dialog.
#[derive(Debug, PartialEq, Eq)]
enum DialogInput<C> {
    /// Highlight moved to this index.
    Select(usize),
    Chosen(C),
    Ignored,
}

/// Interpret `key` for a dialog whose highlighted button is `selected`.
fn dialog_input<C: Choice>(selected: usize, key: KeyEvent) -> DialogInput<C> {
    let n = C::ALL.len();
    match key.code {
        KeyCode::Left | KeyCode::BackTab | KeyCode::Up => Select((selected + n - 1) % n),
        KeyCode::Right | KeyCode::Tab | KeyCode::Down => Select((selected + 1) % n),
        KeyCode::Enter => C::ALL.get(selected).map_or(Ignored, |c| Chosen(*c)),
        KeyCode::Esc => Chosen(C::CANCEL),
        KeyCode::Char(ch) => {
            let ch = ch.to_ascii_lowercase();
            C::ALL.iter().find(|c| c.shortcut() == ch).map_or(Ignored, |c| Chosen(*c))
        }
        _ => Ignored,
    }
}

use DialogInput::{Chosen, Ignored, Select};

impl Editor {
    fn enter_state(&mut self, state: SessionState) {
        tracing::debug!(from = ?self.state, to = ?state, "session transition");
        self.state = state;
        self.mark_redraw();
    }

    /// `Ctrl+O` from `Editing`.
    pub fn open_sort_dialog(&mut self) {
        self.enter_state(SessionState::SortDialogOpen { selected: 0 });
    }

    /// `Ctrl+X` from `Editing`: quit at once when clean, otherwise ask.
    pub fn request_quit(&mut self) {
        if self.dirty {
            self.enter_state(SessionState::QuitConfirmDialogOpen { selected: 0 });
        } else {
            self.enter_state(SessionState::Terminated);
        }
    }

    pub(super) fn handle_sort_dialog_key(&mut self, selected: usize, key: KeyEvent) {
        match dialog_input::<SortChoice>(selected, key) {
            Select(selected) => self.enter_state(SessionState::SortDialogOpen { selected }),
            Chosen(choice) => {
                self.enter_state(SessionState::Editing);
                if let Some(mode) = choice.mode() {
                    self.apply_sort(mode);
                    self.set_status(format!("Sorted by {}.", choice.label().to_lowercase()), MessageKind::Info, Some(super::SAVED_MSG_TTL));
                }
            }
            Ignored => {}
        }
    }

    pub(super) fn handle_quit_dialog_key(&mut self, selected: usize, key: KeyEvent) {
        match dialog_input::<QuitChoice>(selected, key) {
            Select(selected) => self.enter_state(SessionState::QuitConfirmDialogOpen { selected }),
            Chosen(QuitChoice::Save) => {
                if self.save().is_ok() {
                    self.enter_state(SessionState::Terminated);
                } else {
                    self.enter_state(SessionState::Editing);
                }
            }
            Chosen(QuitChoice::DontSave) => {
                tracing::info!(profile = %self.profile_name, "discarding unsaved changes");
                self.enter_state(SessionState::Terminated);
            }
            Chosen(QuitChoice::Cancel) => self.enter_state(SessionState::Editing),
            Ignored => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::tests::editor;
    use crossterm::event::KeyModifiers;
    use std::fs;
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    #[test]
    fn dialog_navigation_wraps() {
        assert_eq!(dialog_input::<QuitChoice>(0, key(KeyCode::Left)), Select(2));
        assert_eq!(dialog_input::<QuitChoice>(2, key(KeyCode::Right)), Select(0));
        assert_eq!(dialog_input::<SortChoice>(3, key(KeyCode::Tab)), Select(0));
    }

    #[test]
    fn dialog_enter_esc_and_shortcuts() {
        assert_eq!(dialog_input::<SortChoice>(2, key(KeyCode::Enter)), Chosen(SortChoice::ValueLength));
        assert_eq!(dialog_input::<SortChoice>(0, key(KeyCode::Esc)), Chosen(SortChoice::Cancel));
        assert_eq!(dialog_input::<QuitChoice>(0, key(KeyCode::Char('D'))), Chosen(QuitChoice::DontSave));
        assert_eq!(dialog_input::<QuitChoice>(0, key(KeyCode::Char('z'))), Ignored);
        assert_eq!(dialog_input::<QuitChoice>(0, key(KeyCode::F(1))), Ignored);
    }

    #[test]
    fn quit_when_clean_terminates_without_dialog() {
        let mut ed = editor("A=1\nA=2");
        assert!(ed.handle_key(ctrl('x')));
        assert_eq!(ed.state, SessionState::Terminated);
    }

    #[test]
    fn quit_when_dirty_asks_then_cancel_returns() {
        let mut ed = editor("A=1");
        ed.handle_key(key(KeyCode::Char('B')));
        assert!(!ed.handle_key(ctrl('x')));
        assert_eq!(ed.state, SessionState::QuitConfirmDialogOpen { selected: 0 });
        ed.handle_key(key(KeyCode::Esc));
        assert_eq!(ed.state, SessionState::Editing);
        assert!(ed.dirty);
    }

    #[test]
    fn quit_dont_save_discards() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dev.env");
        fs::write(&path, "A=1").unwrap();
        let mut ed = editor("A=1");
        ed.file_path = path.clone();
        ed.handle_key(key(KeyCode::Char('X')));
        ed.handle_key(ctrl('x'));
        ed.handle_key(key(KeyCode::Right));
        assert_eq!(ed.state, SessionState::QuitConfirmDialogOpen { selected: 1 });
        assert!(ed.handle_key(key(KeyCode::Enter)));
        assert_eq!(fs::read_to_string(&path).unwrap(), "A=1");
    }

    #[test]
    fn quit_save_writes_then_terminates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dev.env");
        let mut ed = editor("");
        ed.file_path = path.clone();
        ed.handle_key(key(KeyCode::Char('Z')));
        ed.handle_key(ctrl('x'));
        assert!(ed.handle_key(key(KeyCode::Char('s'))));
        assert_eq!(fs::read_to_string(&path).unwrap(), "Z");
        assert!(!ed.dirty);
    }

    #[test]
    fn quit_save_failure_stays_editing() {
        let dir = TempDir::new().unwrap();
        let mut ed = editor("");
        ed.file_path = dir.path().join("missing").join("dev.env");
        ed.handle_key(key(KeyCode::Char('Z')));
        ed.handle_key(ctrl('x'));
        assert!(!ed.handle_key(key(KeyCode::Enter)));
        assert_eq!(ed.state, SessionState::Editing);
        assert!(ed.dirty);
        assert_eq!(ed.status.as_ref().map(|s| s.kind), Some(MessageKind::Error));
    }

    #[test]
    fn sort_dialog_applies_choice() {
        let mut ed = editor("BBB=1\nA=22\nCC=333");
        ed.handle_key(ctrl('o'));
        assert_eq!(ed.state, SessionState::SortDialogOpen { selected: 0 });
        ed.handle_key(key(KeyCode::Right));
        ed.handle_key(key(KeyCode::Enter));
        assert_eq!(ed.state, SessionState::Editing);
        assert_eq!(ed.sort_mode, SortMode::KeyLen);
        assert_eq!(ed.buf.lines, vec!["A=22", "CC=333", "BBB=1"]);
        assert!(ed.dirty);
    }

    #[test]
    fn sort_dialog_cancel_changes_nothing() {
        let mut ed = editor("B=1\nA=2");
        ed.handle_key(ctrl('o'));
        ed.handle_key(key(KeyCode::Char('c')));
        assert_eq!(ed.state, SessionState::Editing);
        assert_eq!(ed.buf.lines, vec!["B=1", "A=2"]);
        assert!(!ed.dirty);
        assert_eq!(ed.sort_mode, SortMode::None);
    }

    #[test]
    fn dialog_swallows_editing_keys() {
        let mut ed = editor("A=1");
        ed.handle_key(ctrl('o'));
        ed.handle_key(key(KeyCode::Char('q')));
        ed.handle_key(key(KeyCode::Backspace));
        assert_eq!(ed.buf.text(), "A=1");
        assert_eq!(ed.state, SessionState::SortDialogOpen { selected: 0 });
    }
}
