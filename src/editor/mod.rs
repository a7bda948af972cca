//! Editor: the profile editing session and all of its state.
//!
//! The `Editor` type is split across submodules, each adding an `impl Editor` block:
//! - `dialog`: the session state machine (sort / quit-confirm modals)
//! - `input`: key dispatch
//! - `movement`: cursor movement
//! - `comment`: comment toggling
//! - `file_ops`: the backup-then-save protocol
//! - `render`: drawing the UI

mod comment;
mod dialog;
mod file_ops;
mod input;
mod movement;
mod render;

use crate::buffer::{Buffer, SEPARATOR};
use crate::config::Config;
use crate::envfile::{sort_lines, SortMode, Summary};
use crate::terminal::TerminalGuard;
use crate::types::{MessageKind, Pos, StatusMsg};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal;
use std::fs;
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime};

pub use dialog::SessionState;
pub use file_ops::backup_path;
pub(crate) use render::{line_spans, queue_spans};

/// How long the "saved" confirmation stays on screen.
const SAVED_MSG_TTL: Duration = Duration::from_secs(2);

/// One editing session over a single profile file.
pub struct Editor {
    /// The editable document (lines of text).
    pub buf: Buffer,
    /// Cursor position in the buffer.
    pub cursor: Pos,
    /// Viewport scroll position.
    pub scroll_y: usize,
    pub scroll_x: usize,
    /// Profile name shown in the header.
    pub profile_name: String,
    /// Path we'll save to.
    pub file_path: PathBuf,
    /// Modification time of `file_path`, if it exists.
    pub last_modified: Option<SystemTime>,
    /// Comparator last applied to the buffer.
    pub sort_mode: SortMode,
    /// "Dirty" means there are unsaved changes.
    pub dirty: bool,
    /// Text of the most recent backup (the loaded text until the first save).
    pub last_backup: Option<String>,
    /// Entry count and duplicates, recomputed after every mutation.
    pub summary: Summary,
    /// Where the session is in its state machine.
    pub state: SessionState,
    /// Message line content.
    pub(crate) status: Option<StatusMsg>,
    /// Whether the screen needs to be redrawn.
    pub(crate) needs_redraw: bool,
    /// Last known terminal size (columns, rows).
    pub(crate) viewport: (usize, usize),
}

impl Editor {
    /// Create a session over `buf`, applying `sort` to the loaded text.
    ///
    /// The session starts clean unless the initial sort actually reordered lines.
    pub fn new(profile_name: impl Into<String>, file_path: PathBuf, buf: Buffer, sort: SortMode) -> Self {
        let loaded = buf.text();
        let mut ed = Self {
            buf,
            cursor: Pos::default(),
            scroll_y: 0,
            scroll_x: 0,
            profile_name: profile_name.into(),
            file_path,
            last_modified: None,
            sort_mode: SortMode::None,
            dirty: false,
            last_backup: Some(loaded.clone()),
            summary: Summary::default(),
            state: SessionState::Editing,
            status: None,
            needs_redraw: true,
            viewport: (80, 24),
        };
        if sort != SortMode::None {
            ed.apply_sort(sort);
            ed.dirty = ed.buf.text() != loaded;
        }
        ed.refresh_status();
        ed
    }

    /// Load profile `name` from the configured directory.
    pub fn open(config: &Config, name: &str, sort: SortMode) -> Result<Self> {
        let path = config.profile_path(name)?;
        let buf = Buffer::load(&path)?;
        let mut ed = Self::new(name.trim(), path, buf, sort);
        ed.last_modified = fs::metadata(&ed.file_path).and_then(|m| m.modified()).ok();
        tracing::info!(
            profile = %ed.profile_name,
            path = %ed.file_path.display(),
            lines = ed.buf.line_count(),
            "opened profile"
        );
        Ok(ed)
    }

    /// Mark that the screen needs to be redrawn.
    pub fn mark_redraw(&mut self) {
        self.needs_redraw = true;
    }

    /// Recompute the status projection (entry count, duplicates).
    pub fn refresh_status(&mut self) {
        self.summary = Summary::of(&self.buf.lines);
        self.mark_redraw();
    }

    /// Every buffer mutation ends here: dirty flag, status projection, redraw.
    pub fn on_buffer_changed(&mut self) {
        self.dirty = true;
        self.cursor = self.buf.clamp_pos(self.cursor);
        self.refresh_status();
        self.ensure_visible();
    }

    /// Reorder the whole buffer with `mode`.
    pub fn apply_sort(&mut self, mode: SortMode) {
        self.sort_mode = mode;
        if mode == SortMode::None {
            return;
        }
        let mut lines = self.buf.lines.clone();
        sort_lines(&mut lines, mode);
        self.buf.replace_all(&lines.join(SEPARATOR));
        tracing::debug!(mode = %mode, "sorted buffer");
        self.on_buffer_changed();
    }

    /// Replace the buffer with the most recent backup snapshot.
    pub fn revert_to_backup(&mut self) {
        let Some(snapshot) = self.last_backup.clone() else {
            self.set_status("No backup to revert to.", MessageKind::Info, Some(SAVED_MSG_TTL));
            return;
        };
        self.buf.replace_all(&snapshot);
        self.on_buffer_changed();
        self.set_status("Reverted to last backup.", MessageKind::Info, Some(SAVED_MSG_TTL));
    }

    /// Show a message. With a `ttl` it is cleared by [`Editor::tick`] once the deadline passes;
    /// a later message replaces it (and its deadline) outright.
    pub fn set_status(&mut self, msg: impl Into<String>, kind: MessageKind, ttl: Option<Duration>) {
        self.status = Some(StatusMsg {
            text: msg.into(),
            kind,
            until: ttl.map(|t| Instant::now() + t),
        });
        self.mark_redraw();
    }

    /// Periodic updates (expire status messages).
    pub fn tick(&mut self) {
        self.expire_status(Instant::now());
    }

    fn expire_status(&mut self, now: Instant) {
        if let Some(StatusMsg { until: Some(until), .. }) = &self.status {
            if now >= *until {
                self.status = None;
                self.mark_redraw();
            }
        }
    }

    /// Called when the terminal is resized.
    pub fn on_resize(&mut self, width: u16, height: u16) {
        self.viewport = (width as usize, height as usize);
        self.ensure_visible();
        self.mark_redraw();
    }

    /// Rows available for buffer lines (header, message and hint lines excluded).
    pub(crate) fn body_height(&self) -> usize {
        self.viewport.1.saturating_sub(3).max(1)
    }

    /// Update scroll so the cursor is visible.
    pub fn ensure_visible(&mut self) {
        let h = self.body_height();
        if self.cursor.y < self.scroll_y {
            self.scroll_y = self.cursor.y;
        } else if self.cursor.y >= self.scroll_y + h {
            self.scroll_y = self.cursor.y + 1 - h;
        }

        let avail = self.viewport.0.saturating_sub(self.gutter_width() + 1).max(1);
        if self.cursor.x < self.scroll_x {
            self.scroll_x = self.cursor.x;
        } else if self.cursor.x >= self.scroll_x + avail {
            self.scroll_x = self.cursor.x + 1 - avail;
        }
        self.mark_redraw();
    }

    /// Run the input/render loop until the session terminates.
    pub fn run(&mut self, stdout: &mut Stdout) -> Result<()> {
        let (w, h) = terminal::size()?;
        self.on_resize(w, h);

        while self.state != SessionState::Terminated {
            self.render(stdout)?;

            // Poll so we can also expire transient status messages.
            if event::poll(Duration::from_millis(50))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key);
                    }
                    Event::Resize(w, h) => self.on_resize(w, h),
                    _ => {}
                }
            } else {
                self.tick();
            }
        }
        Ok(())
    }
}

/// Open profile `name` in the editor and run the session to completion.
///
/// Only startup failures (bad name, unreadable file, terminal setup) are returned; everything
/// that goes wrong inside the session is reported on screen.
pub fn edit_profile(config: &Config, name: &str, sort: Option<SortMode>) -> Result<()> {
    let mut editor = Editor::open(config, name, sort.unwrap_or(config.default_sort))?;

    let mut stdout = io::stdout();
    let _term = TerminalGuard::new(&mut stdout, &format!("envman: {}", editor.profile_name))?;
    editor.run(&mut stdout)?;

    tracing::info!(profile = %editor.profile_name, unsaved = editor.dirty, "editor closed");
    Ok(())
}
