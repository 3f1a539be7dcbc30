use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::error::ExportError;

/// Overrides the storage directory for saved transcripts
pub const STORAGE_DIR_ENV: &str = "CLAUDE_TOOLKIT_TRANSCRIPTS_DIR";

const TOOLKIT_DIR: &str = ".claude-toolkit";

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Where saved transcripts go (default: ~/.claude-toolkit/transcripts/saved)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
}

pub fn toolkit_dir() -> std::result::Result<PathBuf, ExportError> {
    home_dir()
        .map(|home| home.join(TOOLKIT_DIR))
        .ok_or(ExportError::HomeNotSet)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(toolkit_dir()?.join("config.toml"))
}

/// Default location for saved transcripts
pub fn default_storage_dir() -> std::result::Result<PathBuf, ExportError> {
    Ok(toolkit_dir()?.join("transcripts").join("saved"))
}

impl Config {
    /// Load config from ~/.claude-toolkit/config.toml, returning defaults if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Load config, falling back to defaults on any error
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|err| {
            tracing::warn!("using default config: {err:#}");
            Self::default()
        })
    }

    /// Save config to ~/.claude-toolkit/config.toml
    pub fn save(&self) -> Result<PathBuf> {
        let path = config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("failed to serialize config")?;
        fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "storage_dir" | "storage" | "dir" => {
                let value = value.trim();
                self.storage_dir = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            _ => bail!("unknown config key: {key}"),
        }
        Ok(())
    }

    /// Resolve the storage directory: env override, then config, then home default
    pub fn storage_dir(&self) -> std::result::Result<PathBuf, ExportError> {
        if let Ok(dir) = std::env::var(STORAGE_DIR_ENV) {
            if !dir.trim().is_empty() {
                return Ok(PathBuf::from(dir));
            }
        }
        if let Some(dir) = &self.storage_dir {
            return Ok(dir.clone());
        }
        default_storage_dir()
    }
}
