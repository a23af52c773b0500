use crate::grid::session::GridSettings;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::fs;

pub const KEYS: [&str; 6] = ["columns", "initial_rows", "first_box_id", "id_step", "seed", "log_file"];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub columns: usize,
    pub initial_rows: usize,
    pub first_box_id: u32,
    pub id_step: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let grid = GridSettings::default();
        Self {
            columns: grid.columns,
            initial_rows: grid.initial_rows,
            first_box_id: grid.first_box_id,
            id_step: grid.id_step,
            seed: None,
            log_file: None,
        }
    }
}

impl Config {
    /// Loads the config file, falling back to defaults when there is none.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = get_config_file_path()?;

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = get_config_file_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let content = toml::to_string(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        fs::write(&config_path, content)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 {
            return Err(ConfigError::InvalidValue("columns".into(), "must be at least 1".into()));
        }
        if self.id_step == 0 {
            return Err(ConfigError::InvalidValue("id_step".into(), "must be at least 1".into()));
        }

        // The counter must still hold a valid next id once the initial grid
        // and at least one further box have been numbered.
        let boxes = (self.columns as u128 * self.initial_rows as u128).max(1);
        let last = self.first_box_id as u128 + self.id_step as u128 * boxes;
        if last > u32::MAX as u128 {
            return Err(ConfigError::InvalidValue(
                "first_box_id".into(),
                format!(
                    "ids from {} in steps of {} overflow for a {}x{} grid",
                    self.first_box_id, self.id_step, self.initial_rows, self.columns
                ),
            ));
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        let value = match key {
            "columns" => self.columns.to_string(),
            "initial_rows" => self.initial_rows.to_string(),
            "first_box_id" => self.first_box_id.to_string(),
            "id_step" => self.id_step.to_string(),
            "seed" => self.seed.map(|s| s.to_string()).unwrap_or_default(),
            "log_file" => self.log_file.clone().unwrap_or_default(),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        };
        Ok(value)
    }

    /// Sets `key` from its string form. An empty value clears optional keys.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |e: std::num::ParseIntError| {
            ConfigError::InvalidValue(key.to_string(), e.to_string())
        };
        let mut updated = self.clone();
        match key {
            "columns" => updated.columns = value.parse().map_err(invalid)?,
            "initial_rows" => updated.initial_rows = value.parse().map_err(invalid)?,
            "first_box_id" => updated.first_box_id = value.parse().map_err(invalid)?,
            "id_step" => updated.id_step = value.parse().map_err(invalid)?,
            "seed" if value.is_empty() => updated.seed = None,
            "seed" => updated.seed = Some(value.parse().map_err(invalid)?),
            "log_file" if value.is_empty() => updated.log_file = None,
            "log_file" => updated.log_file = Some(value.to_string()),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn grid_settings(&self) -> GridSettings {
        GridSettings {
            columns: self.columns,
            initial_rows: self.initial_rows,
            first_box_id: self.first_box_id,
            id_step: self.id_step,
        }
    }
}

fn get_config_file_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?;

    Ok(config_dir.join("boxgrid").join("config.toml"))
}

#[derive(Debug)]
pub enum ConfigError {
    ConfigDirNotFound,
    UnknownKey(String),
    InvalidValue(String, String),
    ReadError(String),
    WriteError(String),
    ParseError(String),
    SerializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigDirNotFound => {
                write!(f, "Could not find config directory")
            }
            ConfigError::UnknownKey(key) => {
                write!(f, "Unknown configuration key '{}'. Supported keys: {}", key, KEYS.join(", "))
            }
            ConfigError::InvalidValue(key, msg) => {
                write!(f, "Invalid value for '{}': {}", key, msg)
            }
            ConfigError::ReadError(msg) => {
                write!(f, "Failed to read config file: {}", msg)
            }
            ConfigError::WriteError(msg) => {
                write!(f, "Failed to write config file: {}", msg)
            }
            ConfigError::ParseError(msg) => {
                write!(f, "Failed to parse config file: {}", msg)
            }
            ConfigError::SerializeError(msg) => {
                write!(f, "Failed to serialize config: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
