use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::calendar::WeekStart;
use crate::domain::TaskTime;
use crate::storage::DEFAULT_SLOT_KEY;

pub const CONFIG_FILE: &str = "config.toml";
const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config.toml: {0}")]
    TomlDecode(#[from] toml::de::Error),
    #[error("failed to encode config.toml: {0}")]
    TomlEncode(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub week_start: WeekStart,
    pub log_level: String,
    pub store_key: String,
    /// Time used for new tasks when none is given; the current time otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_time: Option<TaskTime>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            week_start: WeekStart::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            store_key: DEFAULT_SLOT_KEY.to_string(),
            default_time: None,
        }
    }
}

impl Config {
    pub fn load(state_dir: &Path) -> Result<Self, ConfigError> {
        let raw = match fs::read_to_string(state_dir.join(CONFIG_FILE)) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(ConfigError::Io(err)),
        };
        Ok(toml::from_str(&raw)?)
    }

    /// Writes the default config unless one exists. Returns whether a file was written.
    pub fn init(state_dir: &Path) -> Result<bool, ConfigError> {
        let path = state_dir.join(CONFIG_FILE);
        if path.exists() {
            return Ok(false);
        }
        fs::create_dir_all(state_dir)?;
        fs::write(&path, toml::to_string_pretty(&Self::default())?)?;
        Ok(true)
    }
}
