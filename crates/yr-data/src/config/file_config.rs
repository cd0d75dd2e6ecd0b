//! Slideshow configuration file

use std::path::{Path, PathBuf};
use serde::{Serialize, Deserialize};
use tracing::info;
use yr_core::AppSettings;

use crate::{ReportError, Result};

/// File name looked up inside the media directory when no manifest is given
pub const DEFAULT_MANIFEST_NAME: &str = "manifest.json";

/// Everything the slideshow reads from disk at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Navigation, intro and counter settings
    pub settings: AppSettings,

    /// Directory slide images are resolved against
    pub media_dir: PathBuf,

    /// Explicit media manifest; defaults to `<media_dir>/manifest.json`
    pub manifest: Option<PathBuf>,

    /// JSON file backing the wish wall
    pub wish_file: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            settings: AppSettings::default(),
            media_dir: PathBuf::from("image"),
            manifest: None,
            wish_file: PathBuf::from("wishes.json"),
        }
    }
}

impl ReportConfig {
    /// Parse and validate a configuration document
    pub fn from_json(text: &str) -> Result<Self> {
        let config: ReportConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Write the configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.settings.validate().map_err(ReportError::InvalidConfig)
    }

    /// Manifest location after applying the default
    pub fn manifest_path(&self) -> PathBuf {
        self.manifest
            .clone()
            .unwrap_or_else(|| self.media_dir.join(DEFAULT_MANIFEST_NAME))
    }
}
