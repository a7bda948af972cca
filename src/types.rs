//! Common types used throughout the editor.

use std::time::Instant;

/// A position in the document.
///
/// - `y`: line index (0-based)
/// - `x`: **char index** within that line (0-based). This is *not* a byte index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub y: usize,
    pub x: usize, // char index within line
}

/// How a message-line entry is styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Error,
}

/// Short-lived message shown above the key hints.
///
/// `until` is the deadline for clearing it; `None` keeps it until it is replaced.
#[derive(Debug, Clone)]
pub struct StatusMsg {
    pub text: String,
    pub kind: MessageKind,
    pub until: Option<Instant>,
}
