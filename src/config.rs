//! Front-end configuration.
//!
//! Settings shared by the CLI, the terminal front panel and the browser
//! build. Stored as JSON; every field is optional in the file.

use std::collections::BTreeMap;
use std::path::Path;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Word cycles per second of the real machine.
pub const HARDWARE_RATE: u32 = 3500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
    /// Instructions executed per front-panel tick.
    pub cycles_per_tick: u32,
    /// Tick period in milliseconds.
    pub tick_ms: u64,
    /// Cycles a scripted key stays down.
    pub key_hold_cycles: u64,
    /// Cycles run after a scripted key is released.
    pub key_settle_cycles: u64,
    /// Terminal key to calculator key code. Single characters only.
    pub keymap: BTreeMap<String, u8>,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            cycles_per_tick: 35,
            tick_ms: 10,
            key_hold_cycles: 200,
            key_settle_cycles: 2000,
            keymap: BTreeMap::new(),
        }
    }
}

impl FrontendConfig {
    /// Load a configuration file. Missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config = Self::from_json(&text)?;
        tracing::info!("Loaded config from {:?} ({} mapped keys)", path, config.keymap.len());
        Ok(config)
    }

    /// Parse and validate a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| ConfigError::Format(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.cycles_per_tick == 0 {
            return Err(ConfigError::Invalid("cycles_per_tick must be at least 1".into()));
        }
        if self.tick_ms == 0 {
            return Err(ConfigError::Invalid("tick_ms must be at least 1".into()));
        }
        if let Some(key) = self.keymap.keys().find(|k| k.chars().count() != 1) {
            return Err(ConfigError::Invalid(format!("keymap key {:?} is not a single character", key)));
        }
        Ok(())
    }

    /// Key code bound to a terminal character.
    pub fn key_code(&self, c: char) -> Option<u8> {
        let mut buf = [0u8; 4];
        self.keymap.get(&*c.encode_utf8(&mut buf)).copied()
    }

    /// Effective speed in cycles per second.
    pub fn cycles_per_second(&self) -> u64 {
        self.cycles_per_tick as u64 * 1000 / self.tick_ms.max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("malformed config: {0}")]
    Format(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}
