use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{FileCryptError, Result};

/// User preferences for the command-line tool. Nothing here affects the
/// container format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Extension appended to encrypted files when no output path is given.
    pub encrypted_extension: String,
    pub confirm_password: bool,
    pub overwrite: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_filter: "warn".to_string(),
            encrypted_extension: "enc".to_string(),
            confirm_password: true,
            overwrite: false,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let path = config_file_path();
        if !path.exists() {
            AppConfig::default().save_to(&path)?;
        }
        Self::load_from(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            Err(FileCryptError::Config(format!(
                "Config file not found: {}",
                path.display()
            )))
        }
    }
}

fn config_file_path() -> PathBuf {
    if let Some(dirs) = ProjectDirs::from("", "", "file-encryptor") {
        dirs.config_dir().join("config.toml")
    } else {
        PathBuf::from("file-encryptor.toml")
    }
}
