//! User configuration: where profiles live and how the editor sorts them on open.
//!
//! The config is loaded once in `main` and handed to every command explicitly.

use crate::envfile::SortMode; // default sort on open
use anyhow::{bail, Context, Result}; // anyhow error handling
use serde::Deserialize; // trait for deserializing toml
use std::fs; // file system access
use std::path::{Path, PathBuf}; // file path handling

/// Extension every profile file carries.
pub const PROFILE_EXT: &str = "env";

/// Parsed `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory holding `<name>.env` files. `~/` is expanded.
    #[serde(default)]
    profile_dir: String,
    /// Sort applied when a profile is opened in the editor.
    #[serde(default)]
    pub default_sort: SortMode,
}

/// `<config_dir>/envman/config.toml`.
pub fn default_config_path() -> Result<PathBuf> {
    let dir = dirs::config_dir().context("Could not determine the user config directory")?;
    Ok(dir.join("envman").join("config.toml"))
}

fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().context("Could not determine the home directory")
}

/// Expand a leading `~/` against the home directory.
fn expand_home(raw: &str) -> Result<PathBuf> {
    match raw.strip_prefix("~/") {
        Some(rest) => Ok(home_dir()?.join(rest)),
        None => Ok(PathBuf::from(raw)),
    }
}

/// Reject names that are empty or would escape the profile directory.
pub fn validate_profile_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        bail!("profile name cannot be empty");
    }
    if name.contains('/') || name.contains('\\') {
        bail!("profile name cannot contain '/' or '\\'");
    }
    Ok(name)
}

impl Config {
    /// Write a default config at `path` unless one already exists.
    pub fn ensure(path: &Path) -> Result<()> {
        if path.exists() {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
        }
        let profile_dir = home_dir()?.join(".envman");
        let content = format!(
            "# envman configuration\nprofile_dir = {}\ndefault_sort = \"none\"\n",
            toml::Value::String(profile_dir.display().to_string())
        );
        fs::write(path, content)
            .with_context(|| format!("Failed to create config file {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote default config");
        Ok(())
    }

    /// Read and validate the config at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&s).with_context(|| format!("Invalid config file {}", path.display()))
    }

    fn parse(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        if config.profile_dir.trim().is_empty() {
            bail!("profile dir not configured (set `profile_dir`)");
        }
        Ok(config)
    }

    /// The directory profiles are stored in.
    pub fn profile_dir(&self) -> Result<PathBuf> {
        expand_home(self.profile_dir.trim())
    }

    /// Absolute path of profile `name`: `<profile_dir>/<name>.env`.
    pub fn profile_path(&self, name: &str) -> Result<PathBuf> {
        let name = validate_profile_name(name)?;
        Ok(self.profile_dir()?.join(format!("{name}.{PROFILE_EXT}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parse_minimal() {
        let c = Config::parse("profile_dir = \"/tmp/profiles\"").unwrap();
        assert_eq!(c.profile_dir().unwrap(), PathBuf::from("/tmp/profiles"));
        assert_eq!(c.default_sort, SortMode::None);
    }

    #[test]
    fn parse_default_sort() {
        let c = Config::parse("profile_dir = \"/p\"\ndefault_sort = \"keylen\"").unwrap();
        assert_eq!(c.default_sort, SortMode::KeyLen);
    }

    #[test]
    fn missing_profile_dir_is_an_error() {
        let err = Config::parse("default_sort = \"key\"").unwrap_err();
        assert!(err.to_string().contains("profile dir not configured"));
        assert!(Config::parse("profile_dir = \"  \"").is_err());
    }

    #[test]
    fn unknown_sort_is_an_error() {
        assert!(Config::parse("profile_dir = \"/p\"\ndefault_sort = \"size\"").is_err());
    }

    #[test]
    fn profile_path_joins_name() {
        let c = Config::parse("profile_dir = \"/p\"").unwrap();
        assert_eq!(c.profile_path(" dev ").unwrap(), PathBuf::from("/p/dev.env"));
    }

    #[test]
    fn profile_names_are_validated() {
        assert!(validate_profile_name("").is_err());
        assert!(validate_profile_name("   ").is_err());
        assert!(validate_profile_name("a/b").is_err());
        assert!(validate_profile_name("a\\b").is_err());
        assert_eq!(validate_profile_name(" prod ").unwrap(), "prod");
    }

    #[test]
    fn ensure_writes_loadable_default_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("envman").join("config.toml");
        Config::ensure(&path).unwrap();
        let c = Config::load(&path).unwrap();
        assert!(c.profile_dir().unwrap().ends_with(".envman"));

        fs::write(&path, "profile_dir = \"/custom\"").unwrap();
        Config::ensure(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap().profile_dir().unwrap(), PathBuf::from("/custom"));
    }
}
