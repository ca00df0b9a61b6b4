//! Configuration file discovery and loading

use std::path::{Path, PathBuf};

use super::RecastConfig;
use crate::error::RecastError;
use crate::result::Result;

/// File names searched in each directory, in priority order
const CONFIG_FILE_NAMES: &[&str] = &[".recastrc.toml", "recast.yaml", "recast.yml", "recast.json"];

/// Configuration loader for discovering and loading config files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Auto-discover a config file by traversing upward from `start_path`
    pub fn auto_discover(start_path: &Path) -> Result<Option<PathBuf>> {
        let mut current = start_path
            .canonicalize()
            .map_err(|e| RecastError::config_error(format!("Invalid path: {e}")))?;

        loop {
            for filename in CONFIG_FILE_NAMES {
                let config_path = current.join(filename);
                if config_path.is_file() {
                    tracing::debug!("Found config: {}", config_path.display());
                    return Ok(Some(config_path));
                }
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<RecastConfig> {
        RecastConfig::load(path).map_err(|e| {
            RecastError::config_error(format!("Failed to load config from '{}': {}", path.display(), e))
        })
    }

    /// Load config from an explicit path, or discover one starting at `start_dir`.
    ///
    /// Without an explicit path and without a discovered file the defaults apply.
    pub fn load(custom_path: Option<&Path>, start_dir: Option<&Path>) -> Result<RecastConfig> {
        if let Some(path) = custom_path {
            if !path.exists() {
                return Err(RecastError::config_error(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Self::load_from_file(path);
        }

        let search_dir = start_dir.unwrap_or_else(|| Path::new("."));
        match Self::auto_discover(search_dir)? {
            Some(path) => Self::load_from_file(&path),
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(RecastConfig::default())
            }
        }
    }
}
