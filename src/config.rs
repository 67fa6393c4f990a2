use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{
    ExportError, TeamColorResolver, export::DEFAULT_SAMPLE_RATE, session::SessionCache,
};

const CONFIG_FILE_NAME: &str = "config.json";
const APP_DIR_NAME: &str = "f1replay";

/// Persistent export settings. Command line arguments take precedence.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    pub sample_rate: NonZeroUsize,
    pub output: PathBuf,
    /// Root of the recorded session files
    pub session_dir: PathBuf,
    pub cache_enabled: bool,
    /// Session cache location, the user cache directory when unset
    pub cache_dir: Option<PathBuf>,
    /// Display colors forced per driver code, as `#RRGGBB`
    pub color_overrides: BTreeMap<String, String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            output: PathBuf::from("docs/data/race_data.json"),
            session_dir: PathBuf::from("data/sessions"),
            cache_enabled: true,
            cache_dir: None,
            color_overrides: BTreeMap::new(),
        }
    }
}

impl ExportConfig {
    pub fn config_path() -> Option<PathBuf> {
        Some(
            dirs::config_dir()?
                .join(APP_DIR_NAME)
                .join(CONFIG_FILE_NAME),
        )
    }

    /// Load the config from the user config directory. `Ok(None)` when there is none.
    pub fn from_local_file() -> Result<Option<Self>, ExportError> {
        match Self::config_path() {
            Some(path) => Self::from_file(&path),
            None => Ok(None),
        }
    }

    pub fn from_file(path: &std::path::Path) -> Result<Option<Self>, ExportError> {
        if !path.exists() {
            return Ok(None);
        }
        let file =
            std::fs::File::open(path).map_err(|e| ExportError::ConfigIOError { source: e })?;
        serde_json::from_reader(file)
            .map(Some)
            .map_err(|e| ExportError::ConfigSerializeError { source: e })
    }

    pub fn save(&self) -> Result<PathBuf, ExportError> {
        let config_path = Self::config_path().ok_or(ExportError::NoConfigDir)?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, config_path: &std::path::Path) -> Result<(), ExportError> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ExportError::ConfigIOError { source: e })?;
        }
        let file = std::fs::File::create(config_path)
            .map_err(|e| ExportError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| ExportError::ConfigSerializeError { source: e })
    }

    /// Cache directory to use, falling back to the user cache directory
    pub fn resolved_cache_dir(&self) -> Option<PathBuf> {
        self.cache_dir
            .clone()
            .or_else(SessionCache::default_cache_dir)
    }

    /// Color resolver with this config's per-driver overrides applied
    pub fn color_resolver(&self) -> TeamColorResolver {
        self.color_overrides
            .iter()
            .fold(TeamColorResolver::new(), |resolver, (code, color)| {
                resolver.with_override(code, color)
            })
    }
}
