//! Application configuration.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use versedeck_core::ComposerConfig;

/// Everything the shell reads from its JSON config file.
///
/// ```json
/// {
///   "composer": { "fontFamily": "Anek Telugu", "paddingFactor": 0.9 },
///   "apiBase": "https://slides.example.org/api",
///   "fonts": ["fonts/AnekTelugu-Regular.ttf"],
///   "storageDir": "/var/lib/versedeck"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub composer: ComposerConfig,
    /// Backend base URL; `--api` and `VERSEDECK_API` take precedence.
    pub api_base: Option<String>,
    /// Extra font files registered for measurement.
    pub fonts: Vec<PathBuf>,
    /// Where the draft session is kept. Defaults to the platform data dir.
    pub storage_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        serde_json::from_str(json).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Read a config file. Relative font paths resolve against the file's
    /// directory.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        let mut config = Self::from_json(&json)?;
        if let Some(dir) = path.parent() {
            for font in &mut config.fonts {
                if font.is_relative() {
                    *font = dir.join(&*font);
                }
            }
        }
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `path` if given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, AppError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Backend URL from the command line, falling back to the config file.
    pub fn api_base(&self, cli_api: Option<&str>) -> Result<String, AppError> {
        cli_api
            .map(str::to_string)
            .or_else(|| self.api_base.clone())
            .filter(|url| !url.trim().is_empty())
            .ok_or(AppError::MissingApi)
    }
}
