//! Colony configuration.
//!
//! Loaded from JSON. Every field has a default, so a partial file (or `{}`)
//! is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Top-level configuration for a colony
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColonyConfig {
    pub home: HomeConfig,
    pub residency: ResidencyConfig,
    pub sawmill: CraftingConfig,
}

/// How big homes are and how far they can be upgraded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeConfig {
    /// Residents a home holds at level 0
    pub base_capacity: u32,
    /// Extra residents per level above 0
    pub capacity_per_level: u32,
    pub max_level: u8,
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            base_capacity: 2,
            capacity_per_level: 0,
            max_level: 4,
        }
    }
}

/// Most residents a single home may be configured to hold
pub const MAX_HOME_CAPACITY: u32 = 1024;

impl HomeConfig {
    /// Resident capacity of a home at the given level. Saturates rather than
    /// overflowing for rules that were never validated.
    pub fn capacity_at(&self, level: u8) -> usize {
        let level = level.min(self.max_level) as u32;
        self.capacity_per_level
            .saturating_mul(level)
            .saturating_add(self.base_capacity) as usize
    }

    /// Capacity at max level, or `None` if it does not fit in a `u32`
    fn checked_top_capacity(&self) -> Option<u32> {
        self.capacity_per_level
            .checked_mul(self.max_level as u32)?
            .checked_add(self.base_capacity)
    }
}

/// Residency bookkeeping options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResidencyConfig {
    /// Also flag a home as changed when residents leave it.
    ///
    /// Off by default: only arrivals mark a home dirty, which is what existing
    /// saves were written under.
    pub mark_dirty_on_eviction: bool,
}

/// Recipe rules for crafting buildings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CraftingConfig {
    /// Share of wooden inputs a recipe must exceed to be accepted
    pub min_wood_ratio: f64,
    /// Also count plank and log inputs toward the total the share is taken
    /// over. Off by default: planks and logs only add to the wooden side,
    /// which is how sawmills have always judged recipes.
    pub count_planks_and_logs: bool,
}

impl Default for CraftingConfig {
    fn default() -> Self {
        Self {
            min_wood_ratio: 0.75,
            count_planks_and_logs: false,
        }
    }
}

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ColonyConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: ColonyConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded colony config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.home.base_capacity == 0 {
            return Err(ConfigError::Invalid(
                "home.base_capacity must be at least 1".into(),
            ));
        }
        if self.home.max_level == 0 {
            return Err(ConfigError::Invalid(
                "home.max_level must be at least 1".into(),
            ));
        }
        match self.home.checked_top_capacity() {
            Some(top) if top <= MAX_HOME_CAPACITY => {}
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "home capacity at level {} must not exceed {}",
                    self.home.max_level, MAX_HOME_CAPACITY
                )))
            }
        }
        if !(0.0..1.0).contains(&self.sawmill.min_wood_ratio) {
            return Err(ConfigError::Invalid(format!(
                "sawmill.min_wood_ratio must be in [0, 1), got {}",
                self.sawmill.min_wood_ratio
            )));
        }
        Ok(())
    }
}
