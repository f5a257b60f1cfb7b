//! Runtime configuration.
//!
//! Every section falls back to the defaults in `constants`, so a config file
//! only needs the values it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::DragonType;
use crate::error::ConfigError;

/// Top-level configuration for a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// RNG seed for spawn placement. Same seed = same simulation.
    pub seed: u64,
    /// Fixed steps per simulated second.
    pub tick_rate: u32,
    /// Initial time scale (1.0 = normal, 0.0 = frozen).
    pub time_scale: f64,
    pub terrain: TerrainConfig,
    pub movement: MovementConfig,
    pub combat: CombatConfig,
    pub spawn: SpawnConfig,
}

/// Terrain generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub width: u32,
    pub height: u32,
    pub tile_size: f32,
    pub seed: u32,
    pub noise_scale: f64,
    pub clearing_radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub agent_speed: f32,
    pub arrival_epsilon: f32,
}

/// Combat tuning. Dragon numbers are per-variant profiles scaled by these
/// multipliers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub dragon_aggro_scale: f32,
    pub dragon_damage_scale: f32,
    pub agent_attack_range: f32,
    pub agent_attack_damage: f32,
    pub agent_attack_interval_secs: f32,
    pub corpse_linger_secs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub initial_agents: u32,
    /// Place the default set of structures and quests at startup.
    pub initial_structures: bool,
    pub dragon_waves: Vec<DragonWave>,
    /// Distance from the origin at which wave dragons appear.
    pub dragon_spawn_distance: f32,
}

/// A scheduled group of dragons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragonWave {
    pub spawn_at_secs: f64,
    pub dragons: Vec<(DragonType, u32)>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tick_rate: TICK_RATE,
            time_scale: 1.0,
            terrain: TerrainConfig::default(),
            movement: MovementConfig::default(),
            combat: CombatConfig::default(),
            spawn: SpawnConfig::default(),
        }
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_WIDTH,
            height: DEFAULT_GRID_HEIGHT,
            tile_size: DEFAULT_TILE_SIZE,
            seed: 42,
            noise_scale: DEFAULT_NOISE_SCALE,
            clearing_radius: DEFAULT_CLEARING_RADIUS,
        }
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            agent_speed: AGENT_SPEED,
            arrival_epsilon: ARRIVAL_EPSILON,
        }
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            dragon_aggro_scale: 1.0,
            dragon_damage_scale: 1.0,
            agent_attack_range: AGENT_ATTACK_RANGE,
            agent_attack_damage: AGENT_ATTACK_DAMAGE,
            agent_attack_interval_secs: AGENT_ATTACK_INTERVAL_SECS,
            corpse_linger_secs: CORPSE_LINGER_SECS,
        }
    }
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            initial_agents: 100,
            initial_structures: true,
            dragon_waves: vec![
                DragonWave {
                    spawn_at_secs: 30.0,
                    dragons: vec![(DragonType::Fire, 1)],
                },
                DragonWave {
                    spawn_at_secs: 90.0,
                    dragons: vec![(DragonType::Fire, 1), (DragonType::Ice, 1)],
                },
                DragonWave {
                    spawn_at_secs: 180.0,
                    dragons: vec![(DragonType::Shadow, 2), (DragonType::Ancient, 1)],
                },
            ],
            dragon_spawn_distance: 24.0,
        }
    }
}

impl GameConfig {
    /// Parse a JSON config and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Seconds per fixed step.
    pub fn dt(&self) -> f64 {
        1.0 / f64::from(self.tick_rate.max(1))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::Invalid("tick_rate must be positive".into()));
        }
        if !(0.0..=16.0).contains(&self.time_scale) {
            return Err(ConfigError::Invalid(format!(
                "time_scale {} outside 0..=16",
                self.time_scale
            )));
        }
        if self.terrain.width == 0 || self.terrain.height == 0 {
            return Err(ConfigError::Invalid("terrain must have at least one tile".into()));
        }
        if !(self.terrain.tile_size.is_finite() && self.terrain.tile_size > 0.0) {
            return Err(ConfigError::Invalid("tile_size must be positive".into()));
        }
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(self.movement.agent_speed) || !positive(self.movement.arrival_epsilon) {
            return Err(ConfigError::Invalid(
                "agent_speed and arrival_epsilon must be positive".into(),
            ));
        }
        if self.combat.agent_attack_interval_secs <= 0.0 {
            return Err(ConfigError::Invalid(
                "agent_attack_interval_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}
