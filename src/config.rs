use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::model::City;

/// Optional configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "bikeshare.json";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Where each city's trip export lives.
///
/// ```json
/// { "data_dir": "data", "files": { "washington": "washington.parquet" } }
/// ```
///
/// Missing keys keep their defaults; cities absent from `files` use
/// [`City::default_file`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory the data files are resolved against.
    pub data_dir: PathBuf,
    /// Per-city file name overrides.
    pub files: BTreeMap<City, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            files: City::ALL
                .into_iter()
                .map(|c| (c, c.default_file().to_string()))
                .collect(),
        }
    }
}

impl Config {
    /// Read [`CONFIG_FILE`] from the working directory, or fall back to defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Read configuration from `path`. A missing file yields the defaults; a
    /// malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No {} found, using default data files", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Full path of a city's data file.
    pub fn path_for(&self, city: City) -> PathBuf {
        let file = self
            .files
            .get(&city)
            .map(String::as_str)
            .unwrap_or_else(|| city.default_file());
        self.data_dir.join(file)
    }
}
