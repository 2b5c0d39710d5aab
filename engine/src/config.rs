use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

/// Tunables for the session manager and the simulation runner. Every field
/// has a default so a YAML file only needs the keys it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Rooms cannot be created while the catalog holds fewer cards than this.
    pub min_catalog_cards: usize,
    pub room_code_attempts: usize,
    pub default_max_players: usize,
    pub points_per_correct: u32,
    pub poll_interval_ms: u64,
    /// Retries the runner spends on a stale revision before giving up.
    pub stale_write_retries: usize,
    pub database_url: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_catalog_cards: 10,
            room_code_attempts: 10,
            default_max_players: 4,
            points_per_correct: 1,
            poll_interval_ms: 3000,
            stale_write_retries: 3,
            database_url: None,
        }
    }
}

impl EngineConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&contents)?;
        log::info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
