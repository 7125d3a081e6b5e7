//! Editor configuration persistence
//!
//! Stores user preferences in `~/.config/compose-editor/config.yaml`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::export::DEFAULT_FILENAME;
use crate::history::DEFAULT_MAX_SIZE;
use crate::table::TableSpec;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No config directory available")]
    NoConfigDir,
    #[error("Failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write config to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

/// A toolbar font choice: what the menu shows and the CSS family applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontPreset {
    pub label: String,
    pub value: String,
}

impl FontPreset {
    fn new(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

/// Editor configuration that persists across sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Undo snapshots kept before the oldest is evicted
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Shown while the document is empty
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
    /// Initial values of the insert-table dialog
    #[serde(default)]
    pub table: TableSpec,
    #[serde(default = "default_fonts")]
    pub fonts: Vec<FontPreset>,
    #[serde(default = "default_export_filename")]
    pub export_filename: String,
}

fn default_history_limit() -> usize {
    DEFAULT_MAX_SIZE
}

fn default_placeholder() -> String {
    "Write something...".to_string()
}

fn default_export_filename() -> String {
    DEFAULT_FILENAME.to_string()
}

fn default_fonts() -> Vec<FontPreset> {
    vec![
        FontPreset::new("Arial", "Arial, sans-serif"),
        FontPreset::new("Times New Roman", "Times New Roman, Times, serif"),
        FontPreset::new("Courier New", "Courier New, Courier, monospace"),
        FontPreset::new("Georgia", "Georgia, serif"),
        FontPreset::new("Verdana", "Verdana, Geneva, sans-serif"),
        FontPreset::new("Trebuchet MS", "Trebuchet MS, sans-serif"),
        FontPreset::new("Comic Sans MS", "Comic Sans MS, cursive"),
    ]
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            placeholder: default_placeholder(),
            table: TableSpec::default(),
            fonts: default_fonts(),
            export_filename: default_export_filename(),
        }
    }
}

impl EditorConfig {
    /// Load config from disk, or return defaults if missing or malformed
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Read and parse a config file. Missing fields take their defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save config to the default location, creating the directory
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = crate::config_paths::config_file().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// CSS family for a toolbar font label, if it is one of the presets
    pub fn font_value(&self, label: &str) -> Option<&str> {
        self.fonts
            .iter()
            .find(|f| f.label.eq_ignore_ascii_case(label))
            .map(|f| f.value.as_str())
    }
}
