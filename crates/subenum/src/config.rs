use crate::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/config/engines.yaml");

// region:        --- Config file

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// `None` when the file has no `engines` table, which enables everything.
    #[serde(default)]
    pub engines: Option<HashMap<String, EngineConfig>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    pub delay_ms: Option<u64>,
    pub max_pages: Option<u32>,
    pub max_domains: Option<usize>,
}

fn enabled_by_default() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_ms: None,
            max_pages: None,
            max_domains: None,
        }
    }
}

/// Per-engine overrides of the tuned pagination constants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineTuning {
    pub delay: Option<Duration>,
    pub max_pages: Option<u32>,
    pub max_domains: Option<usize>,
}

impl From<&EngineConfig> for EngineTuning {
    fn from(config: &EngineConfig) -> Self {
        Self {
            delay: config.delay_ms.map(Duration::from_millis),
            max_pages: config.max_pages,
            max_domains: config.max_domains,
        }
    }
}

impl Config {
    /// Config entry for a registry key, keys are compared case-insensitively.
    pub fn engine(&self, key: &str) -> Option<&EngineConfig> {
        self.engines
            .as_ref()?
            .iter()
            .find(|(name, _)| name.trim().eq_ignore_ascii_case(key))
            .map(|(_, config)| config)
    }
}

// endregion:     --- Config file

// region:        --- Loading

/// Loads the engine configuration. A missing file is not an error; an
/// unreadable or invalid one is logged and treated as absent.
pub fn load_config(path: Option<&Path>) -> Option<Config> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
    if !path.exists() {
        debug!("No config file at {:?}", path);
        return None;
    }

    match read_config(path) {
        Ok(config) => {
            debug!("Config loaded from {:?}", path);
            Some(config)
        }
        Err(err) => {
            warn!("Could not load config file {:?}: {}", path, err);
            None
        }
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    // an empty document deserializes to null
    let config: Option<Config> = serde_yaml::from_str(&content)?;
    Ok(config.unwrap_or_default())
}

// endregion:     --- Loading

// region:        --- Tests


// endregion:     --- Tests
