//! Stored settings: `config.json` under the platform config dir.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_ENDPOINT;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// `~/.config/linctl/config.json` (or the platform equivalent).
pub fn default_path() -> Result<PathBuf> {
    let dir = dirs::config_dir().context("Could not determine the user config directory")?;
    Ok(dir.join("linctl").join("config.json"))
}

impl Config {
    /// Missing file is an empty config.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file");
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options
            .open(path)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        writeln!(file, "{}", content)?;

        // `mode` only applies on creation.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    /// Flag/env override, then the file, then Linear's public endpoint.
    pub fn endpoint<'a>(&'a self, flag: Option<&'a str>) -> &'a str {
        non_blank(flag)
            .or_else(|| non_blank(self.api_url.as_deref()))
            .unwrap_or(DEFAULT_ENDPOINT)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// `--api-key`/`LINEAR_API_KEY` beats the stored key.
    pub fn auth_header<'a>(&'a self, flag: Option<&'a str>) -> Result<&'a str> {
        match non_blank(flag).or_else(|| non_blank(self.api_key.as_deref())) {
            Some(key) => Ok(key),
            None => bail!("Not authenticated. Run 'linctl auth login' first."),
        }
    }
}

/// Trimmed value, or `None` when unset or blank.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_is_default() {
        let dir = tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.endpoint(None), DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            api_key: Some("lin_api_123".into()),
            api_url: None,
            timeout_secs: Some(5),
        };
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.timeout(), Duration::from_secs(5));

        let raw = fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("api_url"));
    }

    #[cfg(unix)]
    #[test]
    fn test_save_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        Config::default().save(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse config"));
    }

    #[test]
    fn test_auth_header_precedence() {
        let stored = Config {
            api_key: Some("stored".into()),
            ..Default::default()
        };
        assert_eq!(stored.auth_header(Some("flag")).unwrap(), "flag");
        assert_eq!(stored.auth_header(None).unwrap(), "stored");

        let err = Config::default().auth_header(None).unwrap_err();
        assert_eq!(err.to_string(), "Not authenticated. Run 'linctl auth login' first.");
        assert!(Config::default().auth_header(Some("  ")).is_err());
    }

    #[test]
    fn test_endpoint_override() {
        let config = Config {
            api_url: Some("http://file".into()),
            ..Default::default()
        };
        assert_eq!(config.endpoint(None), "http://file");
        assert_eq!(config.endpoint(Some("http://flag")), "http://flag");
    }

    #[test]
    fn test_blank_flags_fall_back_to_stored_values() {
        let config = Config {
            api_key: Some("stored".into()),
            api_url: Some("http://file".into()),
            ..Default::default()
        };
        assert_eq!(config.auth_header(Some("  ")).unwrap(), "stored");
        assert_eq!(config.endpoint(Some("")), "http://file");
        assert_eq!(Config::default().endpoint(Some(" ")), DEFAULT_ENDPOINT);
    }
}
