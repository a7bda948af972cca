//! `envman init`: the shell function that makes `envman load <profile>` source a profile.

use crate::config::{Config, PROFILE_EXT};
use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use crossterm::style::Stylize;
use regex::Regex;
use std::env;
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

const END_MARKER: &str = "# END >>>>>>>>>>>> envman Managed <<<<<<<<<<<<<<<";

/// Script syntax family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    Posix,
    Fish,
}

fn flavor(shell: &str) -> Option<Flavor> {
    match shell {
        "bash" | "zsh" => Some(Flavor::Posix),
        "fish" => Some(Flavor::Fish),
        _ => None,
    }
}

/// Basename of `$SHELL`, `bash` when unset.
pub fn detect_shell() -> String {
    env::var("SHELL")
        .ok()
        .and_then(|s| Path::new(&s).file_name().map(|n| n.to_string_lossy().into_owned()))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "bash".to_string())
}

/// The rc file `shell` reads on startup.
pub fn rc_file(shell: &str, home: &Path) -> PathBuf {
    match shell {
        "bash" => {
            let profile = home.join(".bash_profile");
            if profile.exists() { profile } else { home.join(".bashrc") }
        }
        "zsh" => home.join(".zshrc"),
        "fish" => home.join(".config").join("fish").join("config.fish"),
        _ => home.join(".profile"),
    }
}

fn shell_function(flavor: Flavor, profile_dir: &Path) -> String {
    let dir = profile_dir.display();
    match flavor {
        Flavor::Posix => format!(
            r#"envman() {{
    if [ "$1" = "load" ]; then
        if [ -z "$2" ]; then
            echo "Usage: envman load <profile>" >&2
            return 1
        fi
        if [ ! -f "{dir}/$2.{PROFILE_EXT}" ]; then
            echo "Profile not found: $2" >&2
            return 1
        fi
        source "{dir}/$2.{PROFILE_EXT}"
    else
        command envman "$@"
    fi
}}
"#
        ),
        Flavor::Fish => format!(
            r#"function envman
    if [ "$argv[1]" = "load" ]
        if [ -z "$argv[2]" ]
            echo "Usage: envman load <profile>" >&2
            return 1
        end
        if not test -f "{dir}/$argv[2].{PROFILE_EXT}"
            echo "Profile not found: $argv[2]" >&2
            return 1
        end
        source "{dir}/$argv[2].{PROFILE_EXT}"
    else
        command envman $argv
    end
end
"#
        ),
    }
}

/// The shell function for `shell`, as printed by `envman init - <shell>`.
pub fn init_script(shell: &str, profile_dir: &Path) -> Result<String> {
    let flavor = flavor(shell).ok_or_else(|| anyhow!("unsupported shell: {shell}"))?;
    Ok(shell_function(flavor, profile_dir))
}

/// The shell function between START/END markers, stamped with `now`.
fn managed_block(flavor: Flavor, profile_dir: &Path, now: DateTime<Utc>) -> String {
    format!(
        "# START >>>>>>>>>>>> envman Managed [{}] <<<<<<<<<<<<<<<\n{}{END_MARKER}",
        now.format("%Y-%m-%d %H:%M:%S"),
        shell_function(flavor, profile_dir)
    )
}

fn has_managed_block(text: &str) -> bool {
    Regex::new(r"(?m)^# START >+ envman Managed \[")
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}

/// Append `block` to `rc`, unless a managed block is already there.
fn append_block(rc: &Path, block: &str) -> Result<()> {
    match fs::read_to_string(rc) {
        Ok(existing) if has_managed_block(&existing) => {
            bail!("envman configuration already exists in {}", rc.display())
        }
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e).with_context(|| format!("failed to read {}", rc.display())),
    }

    if let Some(parent) = rc.parent() {
        fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut f = OpenOptions::new()
        .create(true)
        .append(true)
        .open(rc)
        .with_context(|| format!("failed to open {}", rc.display()))?;
    write!(f, "\n{block}\n").with_context(|| format!("failed to write to {}", rc.display()))?;
    tracing::info!(rc = %rc.display(), "appended managed block");
    Ok(())
}

/// Feed `text` to an external clipboard command on stdin.
fn pipe_to(program: &str, args: &[&str], text: &str) -> io::Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes())?;
    }
    let status = child.wait()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("{program} exited with {status}")))
    }
}

/// Clipboard commands tried in order after `arboard`.
#[cfg(target_os = "macos")]
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[("pbcopy", &[])];
#[cfg(windows)]
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[("clip", &[])];
#[cfg(not(any(target_os = "macos", windows)))]
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] =
    &[("xclip", &["-selection", "clipboard"]), ("xsel", &["--clipboard", "--input"])];

fn copy_to_clipboard(text: &str) -> Result<()> {
    let primary = arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text.to_string()));
    let Err(primary) = primary else {
        return Ok(());
    };
    tracing::debug!(error = %primary, "arboard clipboard failed, trying external commands");
    for (program, args) in CLIPBOARD_COMMANDS {
        match pipe_to(program, args, text) {
            Ok(()) => return Ok(()),
            Err(e) => tracing::debug!(program, error = %e, "clipboard command failed"),
        }
    }
    Err(anyhow!("failed to copy to clipboard: {primary}"))
}

fn ensure_dirs(profile_dir: &Path) -> Result<()> {
    for dir in [profile_dir.to_path_buf(), profile_dir.join("completions")] {
        fs::create_dir_all(&dir).with_context(|| format!("failed to create directory {}", dir.display()))?;
    }
    Ok(())
}

/// Show the block and act on `[a]`, `[c]` or `[q]`.
fn interactive(shell: &str, rc: &Path, block: &str, input: &mut impl BufRead, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{}\n", "envman Initialization".green().bold())?;
    writeln!(out, "Shell: {shell}")?;
    writeln!(out, "RC File: {}", rc.display())?;
    writeln!(out, "Current Time (UTC): {}\n", Utc::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out, "The following will be added to your shell configuration:\n")?;
    writeln!(out, "{}\n", block.yellow())?;
    writeln!(out, "Options:")?;
    writeln!(out, "{} Append automatically to {}", "[a]".bold(), rc.display())?;
    writeln!(out, "{} Copy to clipboard", "[c]".bold())?;
    writeln!(out, "{} Quit", "[q]".bold())?;
    write!(out, "> ")?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer).context("failed to read answer")?;
    match answer.trim().to_lowercase().as_str() {
        "a" => {
            append_block(rc, block)?;
            writeln!(out, "{} Configuration appended to {}", "✓ Success:".green().bold(), rc.display())?;
        }
        "c" => {
            if let Err(e) = copy_to_clipboard(block) {
                writeln!(out, "\n{}", "⚠ Clipboard access failed!".yellow().bold())?;
                writeln!(out, "\nPlease copy this manually:\n{}", block.yellow())?;
                return Err(e);
            }
            writeln!(out, "{} Configuration copied to clipboard", "✓ Success:".green().bold())?;
        }
        _ => {}
    }
    Ok(())
}

/// `envman init [- [shell]]`.
///
/// With `print_only`, write the shell function to stdout (for `eval "$(envman init - bash)"`).
/// Otherwise walk the user through installing the managed block into their rc file.
pub fn init(config: &Config, print_only: bool, shell: Option<String>) -> Result<()> {
    let shell = shell.unwrap_or_else(detect_shell);
    let profile_dir = config.profile_dir()?;
    ensure_dirs(&profile_dir)?;

    if print_only {
        print!("{}", init_script(&shell, &profile_dir)?);
        return Ok(());
    }

    let home = dirs::home_dir().context("Could not determine the home directory")?;
    let rc = rc_file(&shell, &home);
    // Shells without a dedicated script get the POSIX one in ~/.profile.
    let block = managed_block(flavor(&shell).unwrap_or(Flavor::Posix), &profile_dir, Utc::now());
    interactive(&shell, &rc, &block, &mut io::stdin().lock(), &mut io::stdout())
}
