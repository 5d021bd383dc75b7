// Loop rate, serial defaults and the file/CLI configuration surface
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// Runtime loop frequency
pub const LOOP_HZ: u64 = 50;
pub const MAX_LOOP_HZ: u64 = 1_000;

// Serial link to the motor controller
pub const DEFAULT_BAUD_RATE: u32 = 57_600;
pub const DEFAULT_WRITE_TIMEOUT_MS: u64 = 50;

// Substring looked for in port metadata during discovery
pub const DEFAULT_DEVICE_MATCH: &str = "Arduino";

/// Motor link configuration. Fixed once the link is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Explicit serial port; `None` means discover one
    pub port: Option<String>,
    pub baud_rate: u32,
    pub write_timeout_ms: u64,
    pub device_match: String,
}

impl LinkConfig {
    pub fn with_port(port: impl Into<String>) -> Self {
        Self {
            port: Some(port.into()),
            ..Self::default()
        }
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            write_timeout_ms: DEFAULT_WRITE_TIMEOUT_MS,
            device_match: DEFAULT_DEVICE_MATCH.to_string(),
        }
    }
}

/// Top-level configuration for the bridge binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub link: LinkConfig,
    pub loop_hz: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            link: LinkConfig::default(),
            loop_hz: LOOP_HZ,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("Loop rate {hz} Hz is outside 1..=1000 Hz")]
    LoopRate { hz: u64 },
}

impl BridgeConfig {
    /// Load from a JSON file. Missing fields fall back to defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: "<inline>".to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_LOOP_HZ).contains(&self.loop_hz) {
            return Err(ConfigError::LoopRate { hz: self.loop_hz });
        }
        Ok(())
    }

    /// Tick period for the loop rate, clamped into the valid range so it is
    /// never zero
    pub fn tick_period(&self) -> Duration {
        let hz = self.loop_hz.clamp(1, MAX_LOOP_HZ);
        Duration::from_micros(1_000_000 / hz)
    }
}
