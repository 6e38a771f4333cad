// ⚙️ Configuration - where the database, exports and logs live
// Loaded from an optional JSON file; every key has a default.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite file holding the record collection
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Directory exported workbooks are written under
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,

    /// Directory for the interactive-mode log file
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("meter.db")
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            export_dir: default_export_dir(),
            log_dir: default_log_dir(),
        }
    }
}

impl AppConfig {
    /// Read `path` if given. A missing file means defaults; a malformed one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::load(Some(Path::new("/nonexistent/meter.json"))).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(AppConfig::load(None).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meter.json");
        fs::write(&path, r#"{"database_path": "/var/lib/meter/records.db"}"#).unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/var/lib/meter/records.db"));
        assert_eq!(config.export_dir, PathBuf::from("."));
        assert_eq!(config.log_dir, PathBuf::from("logs"));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meter.json");
        fs::write(&path, "database_path = 3").unwrap();

        assert!(AppConfig::load(Some(&path)).is_err());
    }
}
