//! The backup-then-save protocol.

use super::{Editor, SAVED_MSG_TTL}; // editor state
use crate::types::MessageKind; // message styling
use std::ffi::OsString; // path suffixing
use std::fs; // file system access
use std::io; // io errors
use std::path::{Path, PathBuf}; // file path handling

/// Why a save did not complete. The session keeps running either way.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("failed to write backup {}: {source}", .path.display())]
    Backup { path: PathBuf, source: io::Error },
    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// `<path>.bak`, next to the profile.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut s = OsString::from(path.as_os_str());
    s.push(".bak");
    PathBuf::from(s)
}

/// Write `content` to the backup file, then to `path`.
///
/// The backup holds exactly what is about to be written, so a torn write of `path` can be
/// recovered from it. There is no temp-file rename: a failure after the backup leaves `path`
/// in whatever state the failed write left it.
pub fn write_with_backup(path: &Path, content: &str) -> Result<(), SaveError> {
    let bak = backup_path(path);
    fs::write(&bak, content).map_err(|source| SaveError::Backup { path: bak, source })?;
    fs::write(path, content).map_err(|source| SaveError::Write { path: path.to_path_buf(), source })
}

impl Editor {
    /// Save the buffer (backup first), reporting the outcome on the message line.
    pub fn save(&mut self) -> Result<(), SaveError> {
        let content = self.buf.text();
        match write_with_backup(&self.file_path, &content) {
            Ok(()) => {
                self.dirty = false;
                self.last_backup = Some(content);
                self.last_modified = fs::metadata(&self.file_path).and_then(|m| m.modified()).ok();
                tracing::info!(path = %self.file_path.display(), "saved profile");
                self.set_status("File saved successfully!", MessageKind::Success, Some(SAVED_MSG_TTL));
                self.refresh_status();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "save failed");
                self.set_status(format!("Error saving: {e}"), MessageKind::Error, None);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::tests::editor;
    use tempfile::TempDir;

    #[test]
    fn backup_path_appends_suffix() {
        assert_eq!(backup_path(Path::new("/p/dev.env")), PathBuf::from("/p/dev.env.bak"));
    }

    #[test]
    fn save_writes_backup_and_target() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dev.env");
        fs::write(&path, "OLD=1").unwrap();

        let mut ed = editor("X=1\nY=2\nX=3");
        ed.file_path = path.clone();
        ed.buf.replace_all("X=1\nY=2\nX=4");
        ed.on_buffer_changed();
        assert!(ed.dirty);

        ed.save().unwrap();
        assert!(!ed.dirty);
        assert_eq!(fs::read_to_string(&path).unwrap(), "X=1\nY=2\nX=4");
        assert_eq!(fs::read_to_string(backup_path(&path)).unwrap(), "X=1\nY=2\nX=4");
        assert_eq!(ed.last_backup.as_deref(), Some("X=1\nY=2\nX=4"));
        assert!(ed.last_modified.is_some());
        assert_eq!(ed.summary.entries, 3);
        let msg = ed.status.as_ref().unwrap();
        assert_eq!(msg.kind, MessageKind::Success);
        assert!(msg.until.is_some());
    }

    #[test]
    fn save_overwrites_previous_backup() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dev.env");
        write_with_backup(&path, "A=1").unwrap();
        write_with_backup(&path, "A=2").unwrap();
        assert_eq!(fs::read_to_string(backup_path(&path)).unwrap(), "A=2");
    }

    #[test]
    fn backup_failure_keeps_session_dirty() {
        let dir = TempDir::new().unwrap();
        let mut ed = editor("A=1");
        ed.file_path = dir.path().join("no-such-dir").join("dev.env");
        ed.on_buffer_changed();

        let err = ed.save().unwrap_err();
        assert!(matches!(err, SaveError::Backup { .. }));
        assert!(ed.dirty);
        let msg = ed.status.as_ref().unwrap();
        assert_eq!(msg.kind, MessageKind::Error);
        assert!(msg.until.is_none());
        assert!(msg.text.starts_with("Error saving:"));
    }

    #[test]
    fn target_failure_is_reported_after_backup() {
        let dir = TempDir::new().unwrap();
        // A directory where the profile should be: the backup succeeds, the write does not.
        let path = dir.path().join("dev.env");
        fs::create_dir(&path).unwrap();
        let err = write_with_backup(&path, "A=1").unwrap_err();
        assert!(matches!(err, SaveError::Write { .. }));
        assert_eq!(fs::read_to_string(backup_path(&path)).unwrap(), "A=1");
    }
}
