use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants;
use crate::error::{CleanError, Result};

/// Resolved file locations for a single cleaning run. Passed into the
/// pipeline entry point so tests can target arbitrary paths.
#[derive(Debug, Clone)]
pub struct CleanConfig {
    pub input_csv: PathBuf,
    pub output_csv: PathBuf,
    pub output_geojson: PathBuf,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            input_csv: PathBuf::from(constants::DEFAULT_INPUT_CSV),
            output_csv: PathBuf::from(constants::DEFAULT_OUTPUT_CSV),
            output_geojson: PathBuf::from(constants::DEFAULT_OUTPUT_GEOJSON),
        }
    }
}

/// On-disk shape of `config.toml`.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    paths: PathsSection,
}

#[derive(Debug, Default, Deserialize)]
struct PathsSection {
    input_csv: Option<PathBuf>,
    output_csv: Option<PathBuf>,
    output_geojson: Option<PathBuf>,
}

impl CleanConfig {
    /// Loads `config.toml` from `path` and applies its values on top of the
    /// built-in defaults. A missing file yields the defaults; a malformed
    /// one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::default();
        if !path.exists() {
            return Ok(config);
        }

        let content = fs::read_to_string(path).map_err(|e| {
            CleanError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let file: ConfigFile = toml::from_str(&content)?;

        if let Some(p) = file.paths.input_csv {
            config.input_csv = p;
        }
        if let Some(p) = file.paths.output_csv {
            config.output_csv = p;
        }
        if let Some(p) = file.paths.output_geojson {
            config.output_geojson = p;
        }
        Ok(config)
    }
}
