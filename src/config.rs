use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_DEVICE: &str = "/dev/ttyUSB0";

/// The controller only listens at this non-standard rate
pub const DEFAULT_BAUD_RATE: u32 = 10_000;

pub const DEFAULT_BYTE_DELAY_MS: u64 = 5;
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub device: String,
    /// Only meant for bench testing with other adapters or controllers
    pub baud_rate: u32,
    /// Pause after each byte written to the controller
    pub byte_delay_ms: u64,
    /// Serial write timeout
    pub timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            device: DEFAULT_DEVICE.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            byte_delay_ms: DEFAULT_BYTE_DELAY_MS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl Config {
    /// Load a JSON config file; keys not present keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .context(format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&data)
            .context(format!("Failed to parse config file {}", path.display()))?;

        if config.baud_rate == 0 {
            anyhow::bail!("Invalid baud_rate 0 in {}", path.display());
        }

        if config.timeout_ms == 0 {
            anyhow::bail!("Invalid timeout_ms 0 in {}", path.display());
        }

        if config.baud_rate != DEFAULT_BAUD_RATE {
            warn!(
                "baud_rate {} from {} differs from the controller's {} baud",
                config.baud_rate,
                path.display(),
                DEFAULT_BAUD_RATE
            );
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.device, "/dev/ttyUSB0");
        assert_eq!(config.baud_rate, 10000);
        assert_eq!(config.byte_delay_ms, 5);
    }

    #[test]
    fn test_partial_override() {
        let file = write_config(r#"{ "device": "/dev/ttyACM1", "byte_delay_ms": 10 }"#);
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.device, "/dev/ttyACM1");
        assert_eq!(config.byte_delay_ms, 10);
        assert_eq!(config.baud_rate, DEFAULT_BAUD_RATE);
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn test_empty_object_is_default() {
        let file = write_config("{}");
        assert_eq!(Config::load(file.path()).unwrap(), Config::default());
    }

    #[test]
    fn test_malformed_json() {
        let file = write_config(r#"{ "device": "#);
        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_zero_baud_rejected() {
        let file = write_config(r#"{ "baud_rate": 0 }"#);
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let file = write_config(r#"{ "timeout_ms": 0 }"#);
        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid timeout_ms 0"));
    }

    #[test]
    fn test_baud_override_for_other_hardware() {
        let file = write_config(r#"{ "baud_rate": 115200 }"#);
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.baud_rate, 115200);
        assert_eq!(config.device, DEFAULT_DEVICE);
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(Path::new("/nonexistent/t9rgb.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
