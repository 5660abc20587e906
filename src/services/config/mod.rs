pub mod models;

pub use models::*;

use anyhow::Context;
use std::path::Path;
use std::sync::Mutex;

/// Read an [`EmulatorConfig`] from a JSON file. Missing fields take their
/// defaults; no path means the built-in defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<EmulatorConfig> {
    let Some(path) = path else {
        return Ok(EmulatorConfig::default());
    };

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: EmulatorConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid config file {}", path.display()))?;

    log::info!("Loaded config from {}", path.display());
    Ok(config)
}

/// In-memory config shared by the command layer. Nothing is written back
/// to disk.
pub struct ConfigService {
    config: Mutex<EmulatorConfig>,
}

impl ConfigService {
    pub fn new(config: EmulatorConfig) -> Self {
        Self {
            config: Mutex::new(config),
        }
    }

    pub fn get_config(&self) -> EmulatorConfig {
        self.config
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn update_learner(&self, learner: LearnerProfile) {
        self.config
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .learner = learner;
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new(EmulatorConfig::default())
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
