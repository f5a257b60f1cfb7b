//! Dragon wave spawner: releases scheduled waves once their time arrives.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use empire_core::config::DragonWave;
use empire_core::constants::DRAGON_FLIGHT_HEIGHT;
use empire_core::enums::DragonType;
use empire_core::events::GameEvent;
use empire_core::types::Position;

use crate::store::EntityStore;
use crate::world_setup;

/// A single wave definition.
#[derive(Debug, Clone)]
pub struct WaveEntry {
    /// Simulation time at which this wave spawns.
    pub spawn_at_secs: f64,
    /// Dragons to spawn: (kind, count).
    pub dragons: Vec<(DragonType, u32)>,
    pub spawned: bool,
}

/// All waves for a session, in schedule order.
#[derive(Debug, Clone, Default)]
pub struct WaveSchedule {
    pub waves: Vec<WaveEntry>,
}

impl WaveSchedule {
    pub fn from_config(waves: &[DragonWave]) -> Self {
        let mut waves: Vec<WaveEntry> = waves
            .iter()
            .map(|w| WaveEntry {
                spawn_at_secs: w.spawn_at_secs,
                dragons: w.dragons.clone(),
                spawned: false,
            })
            .collect();
        waves.sort_by(|a, b| a.spawn_at_secs.total_cmp(&b.spawn_at_secs));
        Self { waves }
    }

    /// Total number of dragons across all waves.
    pub fn total_dragons(&self) -> u32 {
        self.waves
            .iter()
            .flat_map(|w| w.dragons.iter())
            .map(|(_, count)| count)
            .sum()
    }

    pub fn pending(&self) -> usize {
        self.waves.iter().filter(|w| !w.spawned).count()
    }
}

/// Spawn every due wave at random bearings `spawn_distance` from the origin.
pub fn run(
    store: &mut EntityStore,
    rng: &mut ChaCha8Rng,
    schedule: &mut WaveSchedule,
    spawn_distance: f32,
    now_secs: f64,
    events: &mut Vec<GameEvent>,
) {
    for (index, wave) in schedule.waves.iter_mut().enumerate() {
        if wave.spawned || now_secs < wave.spawn_at_secs {
            continue;
        }
        let mut count = 0;
        for &(kind, n) in &wave.dragons {
            for _ in 0..n {
                let bearing: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
                let position = Position::new(
                    bearing.cos() * spawn_distance,
                    DRAGON_FLIGHT_HEIGHT,
                    bearing.sin() * spawn_distance,
                );
                let dragon = world_setup::spawn_dragon(store, kind, position);
                events.push(GameEvent::DragonSpawned { dragon, kind });
                count += 1;
            }
        }
        wave.spawned = true;
        info!(wave = index, count, at = now_secs, "dragon wave spawned");
        events.push(GameEvent::WaveSpawned { wave: index, count });
    }
}
