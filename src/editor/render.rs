//! Rendering: drawing the editor UI to the terminal.
//!
//! Row 0 is the header, then the body, then the message line and the key hints.

use super::dialog::{Choice, QuitChoice, SortChoice};
use super::{Editor, SessionState};
use crate::envfile::{classify, LineKind};
use crate::types::MessageKind;
use crate::utils::{digits, display_width, fit_width, format_mtime};
use anyhow::Result;
use crossterm::{
    cursor,
    style::{self, Attribute, Color},
    terminal::{self, ClearType},
    QueueableCommand,
};
use std::cmp::max;
use std::collections::HashSet;
use std::io::{Stdout, Write};
use unicode_width::UnicodeWidthChar;

const HINTS: &str = "Ctrl+S: Save | Ctrl+X: Quit | Ctrl+O: Sort | Ctrl+\\ : Comment/Uncomment | Ctrl+R: Revert";

/// Split a profile line into colored runs: comments green, keys yellow, the rest plain.
pub(crate) fn line_spans(line: &str) -> Vec<(&str, Color)> {
    match classify(line) {
        LineKind::Blank => vec![(line, Color::Reset)],
        LineKind::Comment => vec![(line, Color::Green)],
        LineKind::Entry { .. } => match line.find('=') {
            Some(eq) => vec![(&line[..eq], Color::Yellow), (&line[eq..], Color::Reset)],
            None => vec![(line, Color::Yellow)],
        },
    }
}

/// Print `spans` starting at char `skip`, within `avail` columns. Returns the columns used.
pub(crate) fn queue_spans(
    stdout: &mut Stdout,
    spans: &[(&str, Color)],
    skip: usize,
    avail: usize,
    bg: Option<Color>,
) -> Result<usize> {
    let mut used = 0;
    let mut seen = 0;
    for (text, color) in spans {
        stdout.queue(style::SetForegroundColor(*color))?;
        if let Some(bg) = bg {
            stdout.queue(style::SetBackgroundColor(bg))?;
        }
        for ch in text.chars() {
            seen += 1;
            if seen <= skip {
                continue;
            }
            let w = UnicodeWidthChar::width(ch).unwrap_or(1);
            if used + w > avail {
                stdout.queue(style::ResetColor)?;
                return Ok(used);
            }
            stdout.queue(style::Print(ch))?;
            used += w;
        }
    }
    stdout.queue(style::ResetColor)?;
    Ok(used)
}

/// Button row for a dialog of type `C`: (label, highlighted).
fn buttons<C: Choice>(selected: usize) -> Vec<(String, bool)> {
    C::ALL
        .iter()
        .enumerate()
        .map(|(i, c)| (format!(" {} ", c.label()), i == selected))
        .collect()
}

impl Editor {
    /// Columns taken by the line-number gutter, separator included.
    pub(crate) fn gutter_width(&self) -> usize {
        max(2, digits(self.buf.line_count())) + 2
    }

    /// Header runs: labels green, values plain, warnings red.
    pub(crate) fn header_segments(&self) -> Vec<(String, Color)> {
        let mut segs = vec![
            ("Profile: ".to_string(), Color::Green),
            (self.profile_name.clone(), Color::White),
            (" | Entries: ".to_string(), Color::Green),
            (self.summary.entries.to_string(), Color::White),
            (" | Last Modified: ".to_string(), Color::Green),
            (format_mtime(self.last_modified), Color::White),
            (" | Path: ".to_string(), Color::Green),
            (self.file_path.display().to_string(), Color::White),
            (" | Sort: ".to_string(), Color::Green),
            (self.sort_mode.to_string(), Color::White),
        ];
        if self.dirty {
            segs.push((" Unsaved".to_string(), Color::Red));
        }
        if !self.summary.duplicates.is_empty() {
            segs.push((format!(" Duplicates: {}", self.summary.duplicates), Color::Red));
        }
        segs
    }

    /// Render the entire UI.
    pub fn render(&mut self, stdout: &mut Stdout) -> Result<()> {
        if !self.needs_redraw {
            return Ok(());
        }
        self.needs_redraw = false;

        let (width, height) = self.viewport;
        stdout.queue(cursor::Hide)?;
        stdout.queue(style::ResetColor)?;

        self.render_header(stdout, width)?;
        self.render_body(stdout, width)?;
        self.render_message(stdout, height.saturating_sub(2), width)?;

        stdout.queue(cursor::MoveTo(0, height.saturating_sub(1) as u16))?;
        stdout.queue(terminal::Clear(ClearType::CurrentLine))?;
        stdout.queue(style::SetForegroundColor(Color::DarkGrey))?;
        stdout.queue(style::Print(fit_width(HINTS, width)))?;
        stdout.queue(style::ResetColor)?;

        match self.state {
            SessionState::SortDialogOpen { selected } => {
                self.render_dialog(stdout, SortChoice::PROMPT, &buttons::<SortChoice>(selected))?;
            }
            SessionState::QuitConfirmDialogOpen { selected } => {
                self.render_dialog(stdout, QuitChoice::PROMPT, &buttons::<QuitChoice>(selected))?;
            }
            SessionState::Editing => {
                let gutter = self.gutter_width();
                let line = &self.buf.lines[self.cursor.y];
                let col = display_width(line, self.cursor.x).saturating_sub(display_width(line, self.scroll_x));
                let x = (gutter + col).min(width.saturating_sub(1));
                let y = 1 + self.cursor.y.saturating_sub(self.scroll_y);
                stdout.queue(cursor::MoveTo(x as u16, y as u16))?;
                stdout.queue(cursor::Show)?;
            }
            SessionState::Terminated => {}
        }

        stdout.flush()?;
        Ok(())
    }

    fn render_header(&self, stdout: &mut Stdout, width: usize) -> Result<()> {
        stdout.queue(cursor::MoveTo(0, 0))?;
        stdout.queue(terminal::Clear(ClearType::CurrentLine))?;
        stdout.queue(style::SetAttribute(Attribute::Bold))?;
        let mut left = width;
        for (text, color) in self.header_segments() {
            let part = fit_width(&text, left);
            left -= display_width(&part, usize::MAX);
            stdout.queue(style::SetForegroundColor(color))?;
            stdout.queue(style::Print(part))?;
            if left == 0 {
                break;
            }
        }
        stdout.queue(style::SetAttribute(Attribute::Reset))?;
        stdout.queue(style::ResetColor)?;
        Ok(())
    }

    fn render_body(&self, stdout: &mut Stdout, width: usize) -> Result<()> {
        let gutter = self.gutter_width();
        let lnw = gutter - 2;
        let avail = width.saturating_sub(gutter);
        let dup_lines: HashSet<usize> = self
            .summary
            .duplicates
            .iter()
            .flat_map(|d| d.lines.iter().copied())
            .collect();

        for row in 0..self.body_height() {
            let y = self.scroll_y + row;
            stdout.queue(cursor::MoveTo(0, (row + 1) as u16))?;
            stdout.queue(terminal::Clear(ClearType::CurrentLine))?;

            if y >= self.buf.line_count() {
                stdout.queue(style::SetForegroundColor(Color::DarkGrey))?;
                stdout.queue(style::Print("~"))?;
                stdout.queue(style::ResetColor)?;
                continue;
            }

            let bg = (y == self.cursor.y).then_some(Color::DarkBlue);
            if let Some(bg) = bg {
                stdout.queue(style::SetBackgroundColor(bg))?;
            }
            let num_color = if dup_lines.contains(&(y + 1)) { Color::Red } else { Color::DarkGrey };
            stdout.queue(style::SetForegroundColor(num_color))?;
            stdout.queue(style::Print(format!("{:>width$}", y + 1, width = lnw)))?;
            stdout.queue(style::SetForegroundColor(Color::DarkGrey))?;
            stdout.queue(style::Print("│ "))?;
            stdout.queue(style::ResetColor)?;

            let line = &self.buf.lines[y];
            let used = queue_spans(stdout, &line_spans(line), self.scroll_x, avail, bg)?;
            if let Some(bg) = bg {
                if used < avail {
                    stdout.queue(style::SetBackgroundColor(bg))?;
                    stdout.queue(style::Print(" ".repeat(avail - used)))?;
                    stdout.queue(style::ResetColor)?;
                }
            }
        }
        Ok(())
    }

    fn render_message(&self, stdout: &mut Stdout, row: usize, width: usize) -> Result<()> {
        stdout.queue(cursor::MoveTo(0, row as u16))?;
        stdout.queue(terminal::Clear(ClearType::CurrentLine))?;
        if let Some(msg) = &self.status {
            let color = match msg.kind {
                MessageKind::Info => Color::Yellow,
                MessageKind::Success => Color::Green,
                MessageKind::Error => Color::Red,
            };
            stdout.queue(style::SetForegroundColor(color))?;
            stdout.queue(style::Print(fit_width(&msg.text, width)))?;
            stdout.queue(style::ResetColor)?;
        }
        Ok(())
    }

    /// Centered box with `prompt` above a row of buttons; the highlighted one is reversed.
    fn render_dialog(&self, stdout: &mut Stdout, prompt: &str, buttons: &[(String, bool)]) -> Result<()> {
        let (width, height) = self.viewport;
        let row_w: usize = buttons.iter().map(|(l, _)| display_width(l, usize::MAX) + 1).sum();
        let inner = max(display_width(prompt, usize::MAX), row_w).min(width.saturating_sub(4));
        let box_w = inner + 4;
        let x0 = (width.saturating_sub(box_w) / 2) as u16;
        let y0 = (height.saturating_sub(5) / 2) as u16;

        let border = "─".repeat(box_w.saturating_sub(2));
        let blank = " ".repeat(inner);
        let lines = [
            format!("┌{border}┐"),
            format!("│ {:<inner$} │", fit_width(prompt, inner)),
            format!("│ {blank} │"),
            format!("│ {blank} │"),
            format!("└{border}┘"),
        ];
        stdout.queue(style::SetForegroundColor(Color::White))?;
        stdout.queue(style::SetBackgroundColor(Color::DarkGrey))?;
        for (i, l) in lines.iter().enumerate() {
            stdout.queue(cursor::MoveTo(x0, y0 + i as u16))?;
            stdout.queue(style::Print(l))?;
        }

        let mut x = x0 + 2 + (inner.saturating_sub(row_w) / 2) as u16;
        for (label, highlighted) in buttons {
            stdout.queue(cursor::MoveTo(x, y0 + 3))?;
            if *highlighted {
                stdout.queue(style::SetAttribute(Attribute::Reverse))?;
            }
            stdout.queue(style::Print(label))?;
            stdout.queue(style::SetAttribute(Attribute::NoReverse))?;
            x += (display_width(label, usize::MAX) + 1) as u16;
        }
        stdout.queue(style::SetAttribute(Attribute::Reset))?;
        stdout.queue(style::ResetColor)?;
        Ok(())
    }
}
