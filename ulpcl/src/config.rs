//! Optional `ulpcl.toml` configuration (`spec.md` §4.9, new).
//!
//! Supplies fallback values for the output directory, error model and
//! thread count when the corresponding CLI flag isn't given. CLI flags
//! always win; this file only lowers the bar for repeat invocations.
//! Discovered the same way the teacher CLI discovers its own config:
//! current directory, then the user's config directory.

use std::path::{Path, PathBuf};

use dirs::config_dir;
use serde::{Deserialize, Serialize};

use crate::error::{Result, UlpclError};

pub const CONFIG_FILE_NAME: &str = "ulpcl.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    #[serde(default)]
    pub error_model: Option<String>,

    #[serde(default)]
    pub threads: Option<String>,

    #[serde(default)]
    pub discard_empty: bool,

    #[serde(default)]
    pub symbol_file: bool,
}

fn default_output_dir() -> String {
    ".".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            error_model: None,
            threads: None,
            discard_empty: false,
            symbol_file: false,
        }
    }
}

impl Config {
    /// Loads the first `ulpcl.toml` found in the current directory or the
    /// user's config directory, or the default config if neither exists.
    pub fn load() -> Result<Self> {
        match Self::find_config_file() {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(UlpclError::Toml)
    }

    fn find_config_file() -> Option<PathBuf> {
        let cwd = PathBuf::from(CONFIG_FILE_NAME);
        if cwd.exists() {
            return Some(cwd);
        }
        config_dir()
            .map(|dir| dir.join("ulpcl").join(CONFIG_FILE_NAME))
            .filter(|path| path.exists())
    }
}
