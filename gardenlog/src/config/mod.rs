// Runtime configuration. No compiled-in absolute paths: defaults relative to
// the working directory, overridable by gardenlog.yaml and GARDENLOG_* env
// vars, in that precedence order.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "gardenlog.yaml";
pub const ENV_DATA_DIR: &str = "GARDENLOG_DATA_DIR";
pub const ENV_PHOTOS_DIR: &str = "GARDENLOG_PHOTOS_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_photos_dir")]
    pub photos_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_photos_dir() -> PathBuf {
    PathBuf::from("photos")
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: default_data_dir(),
            photos_dir: default_photos_dir(),
        }
    }
}

impl Config {
    /// Defaults, overridden by the YAML config file when it exists.
    pub fn load_from(config_file: &Path) -> Result<Self> {
        if !config_file.exists() {
            return Ok(Config::default());
        }
        let raw = std::fs::read_to_string(config_file)?;
        Ok(serde_yaml::from_str(&raw)?)
    }

    /// Full precedence chain: defaults, then `gardenlog.yaml` in the working
    /// directory, then `GARDENLOG_DATA_DIR`/`GARDENLOG_PHOTOS_DIR`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::load_from(Path::new(CONFIG_FILE))?;
        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            config.data_dir = dir.into();
        }
        if let Ok(dir) = std::env::var(ENV_PHOTOS_DIR) {
            config.photos_dir = dir.into();
        }
        Ok(config)
    }

    // Well-known files under the data directory.

    pub fn plants_dir(&self) -> PathBuf {
        self.data_dir.join("plants")
    }

    pub fn dashboard_order_file(&self) -> PathBuf {
        self.data_dir.join("dashboard_order.json")
    }

    pub fn corrections_file(&self) -> PathBuf {
        self.data_dir.join("corrections.json")
    }

    pub fn meta_file(&self) -> PathBuf {
        self.data_dir.join("meta.json")
    }
}
