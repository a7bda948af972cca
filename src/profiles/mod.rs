//! Profile file management: create, delete, list.
//!
//! Editing and viewing live in `editor` and `viewer`; shell integration in `shell`.

pub mod shell;

use crate::config::{Config, PROFILE_EXT};
use crate::editor::{backup_path, edit_profile};
use crate::envfile::count_entries;
use crate::utils::format_mtime;
use anyhow::{bail, Context, Result};
use crossterm::style::Stylize;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// One row of `profile list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileInfo {
    pub name: String,
    pub entries: usize,
    pub last_modified: Option<SystemTime>,
}

/// Read one trimmed, lowercased answer line.
fn read_answer(input: &mut impl BufRead) -> Result<String> {
    let mut line = String::new();
    input.read_line(&mut line).context("failed to read answer")?;
    Ok(line.trim().to_lowercase())
}

/// Create an empty profile file, refusing to overwrite an existing one.
pub fn create_file(config: &Config, name: &str) -> Result<PathBuf> {
    let dir = config.profile_dir()?;
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create profiles directory {}", dir.display()))?;

    let path = config.profile_path(name)?;
    if path.exists() {
        bail!("profile '{}' already exists at {}", name.trim(), path.display());
    }
    fs::write(&path, "").with_context(|| format!("failed to create profile file {}", path.display()))?;
    tracing::info!(path = %path.display(), "created profile");
    Ok(path)
}

/// Create the profile and ask whether to open it. Returns `true` when the user chose to edit.
fn create_with(config: &Config, name: &str, input: &mut impl BufRead, out: &mut impl Write) -> Result<bool> {
    create_file(config, name)?;
    let name = name.trim();
    writeln!(out, "\n{} {} {name}", "✓".green(), "Profile created:".green().bold())?;
    writeln!(out, "{} {} envman profile edit {name} to edit the profile", "ℹ".yellow(), "Use:".yellow().bold())?;
    write!(out, "\nPress 'e' + Enter to edit now, or just Enter to exit: ")?;
    out.flush()?;
    Ok(read_answer(input)? == "e")
}

/// `profile create <name>`.
pub fn create(config: &Config, name: &str) -> Result<()> {
    let edit = create_with(config, name, &mut io::stdin().lock(), &mut io::stdout())?;
    if edit {
        edit_profile(config, name, None)?;
    }
    Ok(())
}

fn delete_with(config: &Config, name: &str, input: &mut impl BufRead, out: &mut impl Write) -> Result<()> {
    let path = config.profile_path(name)?;
    let name = name.trim();
    if !path.exists() {
        bail!("profile '{name}' does not exist");
    }

    writeln!(out, "\n{} {} {name}", "ℹ".yellow(), "Delete profile:".yellow().bold())?;
    write!(out, "{} {} [y/N]: ", "ℹ".yellow(), "Are you sure?".red().bold())?;
    out.flush()?;
    if read_answer(input)? != "y" {
        bail!("operation cancelled by user");
    }

    fs::remove_file(&path).with_context(|| format!("failed to delete profile {}", path.display()))?;
    let bak = backup_path(&path);
    if bak.exists() {
        fs::remove_file(&bak).with_context(|| format!("failed to delete backup {}", bak.display()))?;
    }
    tracing::info!(path = %path.display(), "deleted profile");
    writeln!(out, "\n{} {} {name}\n", "✓".green(), "Profile deleted:".green().bold())?;
    Ok(())
}

/// `profile delete <name>`: asks for confirmation on stdin.
pub fn delete(config: &Config, name: &str) -> Result<()> {
    delete_with(config, name, &mut io::stdin().lock(), &mut io::stdout())
}

/// Every `*.env` file in `dir`, sorted by name. `None` when the directory does not exist.
pub fn scan(dir: &Path) -> Result<Option<Vec<ProfileInfo>>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("failed to read profiles directory {}", dir.display())),
    };

    let mut profiles = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(PROFILE_EXT) {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else { continue };
        // Unreadable files still show up, with zero entries.
        let text = fs::read_to_string(&path).unwrap_or_default();
        let lines: Vec<&str> = text.split('\n').collect();
        profiles.push(ProfileInfo {
            name: name.to_string(),
            entries: count_entries(&lines),
            last_modified: fs::metadata(&path).and_then(|m| m.modified()).ok(),
        });
    }
    profiles.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Some(profiles))
}

fn write_list(out: &mut impl Write, profiles: &[ProfileInfo]) -> io::Result<()> {
    if profiles.is_empty() {
        writeln!(out, "\n{} {}", "ℹ".yellow(), "No profiles found".yellow().bold())?;
        writeln!(out, "{} {} envman profile create <name>\n", "ℹ".yellow(), "Create one with:".green().bold())?;
        return Ok(());
    }

    writeln!(out, "\n{} {} ({} total)\n", "ℹ".green(), "Available Profiles:".green().bold(), profiles.len())?;
    let heading = format!("{:<20} {:<8} {:<19}", "Profile Name", "Entries", "Last Modified");
    writeln!(out, "{}", heading.yellow().bold())?;
    writeln!(out, "{}", "-".repeat(50).yellow())?;
    for p in profiles {
        writeln!(out, "{:<20} {:<8} {}", p.name, p.entries, format_mtime(p.last_modified))?;
    }
    writeln!(out, "\n{} {}", "ℹ".yellow(), "Commands:".yellow().bold())?;
    writeln!(out, "  • Use 'envman profile edit <name>' to edit a profile")?;
    writeln!(out, "  • Use 'envman profile delete <name>' to delete a profile")?;
    Ok(())
}

/// `profile list`.
pub fn list(config: &Config) -> Result<()> {
    let dir = config.profile_dir()?;
    let profiles = scan(&dir)?.unwrap_or_default();
    write_list(&mut io::stdout().lock(), &profiles)?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    /// A config whose profile dir is `<tmp>/profiles` (not created).
    pub(crate) fn config_in(dir: &TempDir) -> Config {
        let cfg = dir.path().join("config.toml");
        let profiles = dir.path().join("profiles").display().to_string();
        fs::write(&cfg, format!("profile_dir = {}", toml::Value::String(profiles))).unwrap();
        Config::load(&cfg).unwrap()
    }

    #[test]
    fn create_makes_dir_and_empty_file() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let path = create_file(&config, " dev ").unwrap();
        assert_eq!(path, dir.path().join("profiles").join("dev.env"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn create_refuses_existing() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let path = create_file(&config, "dev").unwrap();
        fs::write(&path, "A=1").unwrap();
        let err = create_file(&config, "dev").unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "A=1");
    }

    #[test]
    fn create_rejects_bad_names() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        assert!(create_file(&config, "  ").is_err());
        assert!(create_file(&config, "../x").is_err());
    }

    #[test]
    fn create_prompt_answers() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let mut out = Vec::new();
        assert!(create_with(&config, "a", &mut "E\n".as_bytes(), &mut out).unwrap());
        assert!(!create_with(&config, "b", &mut "\n".as_bytes(), &mut out).unwrap());
        assert!(String::from_utf8(out).unwrap().contains("envman profile edit b"));
    }

    #[test]
    fn delete_confirmed_removes_file_and_backup() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let path = create_file(&config, "dev").unwrap();
        fs::write(backup_path(&path), "A=1").unwrap();
        delete_with(&config, "dev", &mut "y\n".as_bytes(), &mut Vec::new()).unwrap();
        assert!(!path.exists());
        assert!(!backup_path(&path).exists());
    }

    #[test]
    fn delete_declined_keeps_file() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let path = create_file(&config, "dev").unwrap();
        let err = delete_with(&config, "dev", &mut "n\n".as_bytes(), &mut Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "operation cancelled by user");
        let err = delete_with(&config, "dev", &mut "".as_bytes(), &mut Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "operation cancelled by user");
        assert!(path.exists());
    }

    #[test]
    fn delete_missing_profile() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let err = delete_with(&config, "ghost", &mut "y\n".as_bytes(), &mut Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "profile 'ghost' does not exist");
    }

    #[test]
    fn scan_lists_env_files_sorted() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let profiles = config.profile_dir().unwrap();
        assert_eq!(scan(&profiles).unwrap(), None);

        fs::create_dir_all(&profiles).unwrap();
        fs::write(profiles.join("prod.env"), "# c\nA=1\n\nB=2\n").unwrap();
        fs::write(profiles.join("dev.env"), "X=1").unwrap();
        fs::write(profiles.join("dev.env.bak"), "X=1").unwrap();
        fs::write(profiles.join("notes.txt"), "X=1").unwrap();

        let found = scan(&profiles).unwrap().unwrap();
        let names: Vec<(&str, usize)> = found.iter().map(|p| (p.name.as_str(), p.entries)).collect();
        assert_eq!(names, vec![("dev", 1), ("prod", 2)]);
        assert!(found.iter().all(|p| p.last_modified.is_some()));
    }

    #[test]
    fn empty_list_shows_hint() {
        let mut out = Vec::new();
        write_list(&mut out, &[]).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("envman profile create <name>"));
    }
}
