use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Driver configuration.
///
/// Missing fields in a config file fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchpadConfig {
    /// Substring matched against MIDI port names
    pub device_name: String,
    /// Events buffered by the input stream between reads
    pub input_buffer_size: usize,
    /// Output stream buffer size
    pub output_buffer_size: usize,
    /// Output latency in milliseconds (0 = send immediately)
    pub output_latency_ms: u64,
    /// Maximum events taken by a single read
    pub read_batch_size: usize,
    /// Listen loop polling period in milliseconds
    pub poll_interval_ms: u64,
    /// Hits the listen loop may queue ahead of the consumer
    pub delivery_capacity: usize,
}

impl Default for LaunchpadConfig {
    fn default() -> Self {
        Self {
            device_name: "Launchpad".to_string(),
            input_buffer_size: 1024,
            output_buffer_size: 1024,
            output_latency_ms: 0,
            read_batch_size: 64,
            poll_interval_ms: 10,
            delivery_capacity: 1,
        }
    }
}

impl LaunchpadConfig {
    /// Load a config from a JSON file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        let config: Self =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save the config as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if parent != Path::new("") && parent != Path::new(".") {
                fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
            }
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        fs::write(path, content).map_err(|e| ConfigError::WriteError(e.to_string()))
    }

    /// Check every field, collecting all problems.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.device_name.trim().is_empty() {
            errors.push("device_name must not be empty".to_string());
        }
        if self.input_buffer_size == 0 {
            errors.push("input_buffer_size must be greater than 0".to_string());
        }
        if self.output_buffer_size == 0 {
            errors.push("output_buffer_size must be greater than 0".to_string());
        }
        if self.read_batch_size == 0 {
            errors.push("read_batch_size must be greater than 0".to_string());
        }
        if self.poll_interval_ms == 0 {
            errors.push("poll_interval_ms must be greater than 0".to_string());
        }
        if self.delivery_capacity == 0 {
            errors.push("delivery_capacity must be greater than 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::ValidationError(errors))
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn output_latency(&self) -> Duration {
        Duration::from_millis(self.output_latency_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ReadError(String),
    WriteError(String),
    ParseError(String),
    SerializeError(String),
    ValidationError(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(msg) => write!(f, "Failed to read config file: {}", msg),
            ConfigError::WriteError(msg) => write!(f, "Failed to write config file: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse config file: {}", msg),
            ConfigError::SerializeError(msg) => write!(f, "Failed to serialize config: {}", msg),
            ConfigError::ValidationError(errors) => {
                write!(f, "Config validation errors: {}", errors.join(", "))
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = LaunchpadConfig::default();
        assert_eq!(config.device_name, "Launchpad");
        assert_eq!(config.read_batch_size, 64);
        assert_eq!(config.poll_interval(), Duration::from_millis(10));
        assert_eq!(config.output_latency(), Duration::ZERO);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("launchpad.json");

        let config = LaunchpadConfig {
            device_name: "Launchpad Mini".to_string(),
            poll_interval_ms: 25,
            ..Default::default()
        };
        config.save(&config_path).unwrap();

        let loaded = LaunchpadConfig::load(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("launchpad.json");
        fs::write(&config_path, r#"{ "read_batch_size": 16 }"#).unwrap();

        let loaded = LaunchpadConfig::load(&config_path).unwrap();
        assert_eq!(loaded.read_batch_size, 16);
        assert_eq!(loaded.device_name, "Launchpad");
    }

    #[test]
    fn test_validation() {
        let config = LaunchpadConfig {
            device_name: " ".to_string(),
            read_batch_size: 0,
            poll_interval_ms: 0,
            ..Default::default()
        };

        match config.validate() {
            Err(ConfigError::ValidationError(errors)) => assert_eq!(errors.len(), 3),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_errors() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.json");
        assert!(matches!(
            LaunchpadConfig::load(&missing),
            Err(ConfigError::ReadError(_))
        ));

        let garbage = temp_dir.path().join("garbage.json");
        fs::write(&garbage, "not json").unwrap();
        assert!(matches!(
            LaunchpadConfig::load(&garbage),
            Err(ConfigError::ParseError(_))
        ));
    }
}
