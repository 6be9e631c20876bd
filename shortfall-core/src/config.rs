use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

const CONFIG_FILE: &str = "config.toml";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// model_path = "/srv/models/shortfall.json"
/// log_level = "info"
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Model used when a command is not given `--model`.
    pub model_path: Option<PathBuf>,

    /// Default log filter, e.g. "info" or "shortfall_core=debug".
    pub log_level: Option<String>,
}

impl Config {
    /// Model path to use: an explicit override wins over the configured one.
    pub fn resolve_model_path(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }

        self.model_path.clone().ok_or_else(|| {
            anyhow!(
                "No model configured.\n\
                 Hint: pass `--model <path>` or run `shortfall configure` first."
            )
        })
    }

    pub fn set_model_path(&mut self, path: impl Into<PathBuf>) {
        self.model_path = Some(path.into());
    }

    /// Read the config at `path`. A file that does not exist yet is an empty config.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e).with_context(|| format!("Cannot read {}", path.display())),
        };

        toml::from_str(&contents).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Write the config to `path`, creating its directory on first use.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).with_context(|| format!("Cannot create {}", dir.display()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).with_context(|| format!("Cannot write {}", path.display()))
    }

    /// Per-user location used when `--config` is not given
    /// (`~/.config/shortfall-cli/config.toml` on Linux).
    pub fn default_path() -> Result<PathBuf> {
        ProjectDirs::from("dev", "shortfall", "shortfall-cli")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
            .context("No home directory to keep the config file in")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_errors_when_nothing_configured() {
        let cfg = Config::default();
        let err = cfg.resolve_model_path(None).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No model configured"));
        assert!(msg.contains("Hint: pass `--model <path>`"));
    }

    #[test]
    fn explicit_path_overrides_configured() {
        let mut cfg = Config::default();
        cfg.set_model_path("/models/configured.json");

        let resolved = cfg.resolve_model_path(Some(Path::new("/tmp/other.json"))).unwrap();
        assert_eq!(resolved, PathBuf::from("/tmp/other.json"));

        let resolved = cfg.resolve_model_path(None).unwrap();
        assert_eq!(resolved, PathBuf::from("/models/configured.json"));
    }

    #[test]
    fn missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_model_path("/models/shortfall.json");
        cfg.log_level = Some("debug".into());
        cfg.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "model_path = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
        assert!(err.to_string().contains(&path.display().to_string()));
    }

    #[test]
    fn save_creates_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        Config::default().save_to(&path).unwrap();
        assert!(path.is_file());
        assert_eq!(fs::read_to_string(&path).unwrap().trim(), "");
    }
}
