//! Battle configuration.

use crate::catalog::ArchetypeCatalog;
use crate::error::{SimError, SimResult};
use crate::spatial::cell_count;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Tunables for a single battle. Every field has a default, so a partial
/// JSON document is enough to override what a caller cares about.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Grid width in cells.
    pub width: i32,
    /// Grid height in cells.
    pub height: i32,
    /// Seed for the world-owned generator.
    pub seed: u64,
    /// Micro-moves a unit stays put after attacking.
    pub attack_cooldown: u32,
    /// Ticks a medic waits between heal scans.
    pub heal_cooldown: u32,
    /// Mortar engagements needed before a launch.
    pub reload_threshold: u32,
    /// Damage dealt by stepping on a hazard.
    pub hazard_damage: f32,
    /// Damage multiplier gained per unit of elevation advantage.
    pub elevation_factor: f32,
    pub catalog: ArchetypeCatalog,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            seed: 0,
            attack_cooldown: 10,
            heal_cooldown: 10,
            reload_threshold: 30,
            hazard_damage: 80.0,
            elevation_factor: 0.3,
            catalog: ArchetypeCatalog::default(),
        }
    }
}

impl BattleConfig {
    pub fn with_size(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Parse a config document and check its grid dimensions.
    pub fn from_json(json: &str) -> SimResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(SimError::Config)?;
        config.cell_count()?;
        Ok(config)
    }

    /// Cells in the configured grid.
    pub fn cell_count(&self) -> SimResult<usize> {
        cell_count(self.width, self.height)
    }
}
