//! Expedition configuration with documented constants
//!
//! Everything a scheduled expedition can be tuned by is collected here.
//! Rule constants that are part of the dice system itself (DCs, dice sizes)
//! live next to the code that rolls them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{ConfigurationError, Result};

/// Configuration for one scheduled expedition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpeditionConfig {
    // === DUNGEON ===
    /// Number of floors a guild descends before the run counts as completed
    ///
    /// Counted from the guild's resume floor. At 3, a guild resuming on
    /// floor 4 finishes after clearing floor 6.
    pub max_floors: u32,

    // === COMBAT ===
    /// Rounds before an encounter is declared a stalemate
    ///
    /// The party disengages from a stalemate without treasure. Twenty rounds
    /// is far beyond a normal fight; it only bounds pathological cases such
    /// as two sides that can no longer hit each other.
    pub max_combat_rounds: u32,

    /// Whether a room-level morale check can interrupt combat between rounds
    ///
    /// The check only runs after a round in which an ally went down.
    pub combat_morale_checks: bool,

    // === RECOVERY ===
    /// Identify found items with treasury gold when the guild can afford it
    ///
    /// When false (or the treasury is short) items are equipped unidentified
    /// and risk being cursed.
    pub identify_items: bool,

    /// Treasury gold spent to identify one magic item
    pub identification_cost: u64,

    // === RUNNER ===
    /// Worker threads for running guilds in parallel
    ///
    /// 0 lets the pool pick one thread per core.
    pub worker_threads: usize,
}

impl Default for ExpeditionConfig {
    fn default() -> Self {
        Self {
            max_floors: 3,
            max_combat_rounds: 20,
            combat_morale_checks: true,
            identify_items: true,
            identification_cost: 50,
            worker_threads: 0,
        }
    }
}

impl ExpeditionConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        if self.max_floors == 0 {
            return Err(ConfigurationError::InvalidConfig(
                "max_floors must be at least 1".into(),
            ));
        }

        if self.max_combat_rounds == 0 {
            return Err(ConfigurationError::InvalidConfig(
                "max_combat_rounds must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Parse and validate a config from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ExpeditionConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}
