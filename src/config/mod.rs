//! Configuration for modassist
//!
//! XDG-compliant: ~/.config/modassist/config.toml. A missing file means
//! defaults; the host process keeps everything else.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Display language requested from the host's translation store
    pub language: String,

    /// Badge filters checked when a savegame window opens
    pub default_filters: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            default_filters: Vec::new(),
        }
    }
}

/// Main config file: ~/.config/modassist/config.toml
pub fn config_file() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "modassist")
        .context("Failed to determine project directories")?;
    Ok(dirs.config_dir().join("config.toml"))
}

impl Config {
    pub async fn load() -> Result<Self> {
        Self::load_from(&config_file()?).await
    }

    pub async fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        toml::from_str(&content).context("Failed to parse config")
    }

    pub async fn save(&self) -> Result<()> {
        self.save_to(&config_file()?).await
    }

    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config {
            language: "de".to_string(),
            default_filters: vec!["missing".to_string(), "unused".to_string()],
        };
        config.save_to(&path).await.unwrap();

        let loaded = Config::load_from(&path).await.unwrap();
        assert_eq!(loaded.language, "de");
        assert_eq!(loaded.default_filters, ["missing", "unused"]);
    }

    #[tokio::test]
    async fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("config.toml"))
            .await
            .unwrap();
        assert_eq!(loaded.language, "en");
        assert!(loaded.default_filters.is_empty());
    }
}
