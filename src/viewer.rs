//! Read-only profile viewer.

use crate::buffer::SEPARATOR;
use crate::config::Config;
use crate::editor::{line_spans, queue_spans};
use crate::envfile::count_entries;
use crate::terminal::TerminalGuard;
use crate::utils::{digits, fit_width, format_mtime};
use anyhow::{Context, Result};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    style::{self, Attribute, Color},
    terminal::{self, ClearType},
    QueueableCommand,
};
use std::fs;
use std::io::{self, Stdout, Write};
use std::time::{Duration, SystemTime};

const HINTS: &str = "↑↓: Scroll  PgUp/PgDn: Page Scroll  q: Quit";

struct Viewer {
    name: String,
    lines: Vec<String>,
    entries: usize,
    last_modified: Option<SystemTime>,
    scroll_y: usize,
    viewport: (usize, usize),
}

impl Viewer {
    fn new(name: &str, text: &str, last_modified: Option<SystemTime>) -> Self {
        let lines: Vec<String> = text.split(SEPARATOR).map(str::to_string).collect();
        Self {
            name: name.to_string(),
            entries: count_entries(&lines),
            lines,
            last_modified,
            scroll_y: 0,
            viewport: (80, 24),
        }
    }

    /// Header and hint rows excluded.
    fn page(&self) -> usize {
        self.viewport.1.saturating_sub(2).max(1)
    }

    fn max_scroll(&self) -> usize {
        self.lines.len().saturating_sub(self.page())
    }

    fn header(&self) -> String {
        format!(
            "Profile: {}  Entries: {}  Last Modified: {}",
            self.name,
            self.entries,
            format_mtime(self.last_modified)
        )
    }

    /// Returns `true` when the viewer should close.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let page = self.page();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Up => self.scroll_y = self.scroll_y.saturating_sub(1),
            KeyCode::Down => self.scroll_y += 1,
            KeyCode::PageUp => self.scroll_y = self.scroll_y.saturating_sub(page),
            KeyCode::PageDown => self.scroll_y += page,
            KeyCode::Home => self.scroll_y = 0,
            KeyCode::End => self.scroll_y = self.max_scroll(),
            _ => {}
        }
        self.scroll_y = self.scroll_y.min(self.max_scroll());
        false
    }

    fn render(&self, stdout: &mut Stdout) -> Result<()> {
        let (width, height) = self.viewport;
        stdout.queue(cursor::MoveTo(0, 0))?;
        stdout.queue(terminal::Clear(ClearType::CurrentLine))?;
        stdout.queue(style::SetForegroundColor(Color::Yellow))?;
        stdout.queue(style::SetAttribute(Attribute::Bold))?;
        stdout.queue(style::Print(fit_width(&self.header(), width)))?;
        stdout.queue(style::SetAttribute(Attribute::Reset))?;
        stdout.queue(style::ResetColor)?;

        let lnw = digits(self.lines.len()).max(2);
        let avail = width.saturating_sub(lnw + 2);
        for row in 0..self.page() {
            let y = self.scroll_y + row;
            stdout.queue(cursor::MoveTo(0, (row + 1) as u16))?;
            stdout.queue(terminal::Clear(ClearType::CurrentLine))?;
            let Some(line) = self.lines.get(y) else { continue };
            stdout.queue(style::SetForegroundColor(Color::DarkGrey))?;
            stdout.queue(style::Print(format!("{:>lnw$}│ ", y + 1)))?;
            queue_spans(stdout, &line_spans(line), 0, avail, None)?;
        }

        stdout.queue(cursor::MoveTo(0, height.saturating_sub(1) as u16))?;
        stdout.queue(terminal::Clear(ClearType::CurrentLine))?;
        stdout.queue(style::SetForegroundColor(Color::DarkGrey))?;
        stdout.queue(style::Print(fit_width(HINTS, width)))?;
        stdout.queue(style::ResetColor)?;
        stdout.flush()?;
        Ok(())
    }

    fn run(&mut self, stdout: &mut Stdout) -> Result<()> {
        let (w, h) = terminal::size()?;
        self.viewport = (w as usize, h as usize);
        let mut redraw = true;
        loop {
            if redraw {
                self.render(stdout)?;
                redraw = false;
            }
            if !event::poll(Duration::from_millis(250))? {
                continue;
            }
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if self.handle_key(key) {
                        return Ok(());
                    }
                    redraw = true;
                }
                Event::Resize(w, h) => {
                    self.viewport = (w as usize, h as usize);
                    self.scroll_y = self.scroll_y.min(self.max_scroll());
                    redraw = true;
                }
                _ => {}
            }
        }
    }
}

/// Show profile `name` read-only until the user quits.
pub fn view_profile(config: &Config, name: &str) -> Result<()> {
    let path = config.profile_path(name)?;
    let text = fs::read_to_string(&path)
        .with_context(|| format!("failed to read profile {}", path.display()))?;
    let last_modified = fs::metadata(&path).and_then(|m| m.modified()).ok();
    let mut viewer = Viewer::new(name.trim(), &text, last_modified);
    tracing::info!(profile = %viewer.name, lines = viewer.lines.len(), "viewing profile");

    let mut stdout = io::stdout();
    let _term = TerminalGuard::new(&mut stdout, &format!("envman: {}", viewer.name))?;
    viewer.run(&mut stdout)
}
