//! Entity spawn factories for setting up the simulation world.
//!
//! Creates agents, dragons, structures and the opening questline with
//! their component bundles.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use empire_core::components::*;
use empire_core::config::SpawnConfig;
use empire_core::constants::AGENT_MAX_HEALTH;
use empire_core::enums::*;
use empire_core::ids::{AgentId, DragonId, StructureId};
use empire_core::types::Position;
use empire_world::TerrainGrid;

use empire_dragon_ai::profiles::get_profile;

use crate::store::EntityStore;

/// Tiles searched outward when a spawn point lands on impassable ground.
const SPAWN_SNAP_RADIUS: u32 = 6;

struct StructureSpec {
    name: &'static str,
    kind: StructureType,
    x: f32,
    z: f32,
    quest: Option<QuestSpec>,
}

struct QuestSpec {
    title: &'static str,
    work_secs: f32,
    reward: (&'static str, ToolType, Rarity),
}

const OPENING_STRUCTURES: [StructureSpec; 5] = [
    StructureSpec {
        name: "Base Camp",
        kind: StructureType::Base,
        x: 0.0,
        z: 0.0,
        quest: None,
    },
    StructureSpec {
        name: "Castle of Code",
        kind: StructureType::Castle,
        x: -12.0,
        z: -10.0,
        quest: Some(QuestSpec {
            title: "Fortify the Castle",
            work_secs: 60.0,
            reward: ("Iron Hammer", ToolType::Build, Rarity::Rare),
        }),
    },
    StructureSpec {
        name: "Tower of Research",
        kind: StructureType::Tower,
        x: 12.0,
        z: -10.0,
        quest: Some(QuestSpec {
            title: "Decipher the Ancient Scrolls",
            work_secs: 45.0,
            reward: ("Seeing Stone", ToolType::Analyze, Rarity::Uncommon),
        }),
    },
    StructureSpec {
        name: "Workshop of Tools",
        kind: StructureType::Workshop,
        x: -12.0,
        z: 10.0,
        quest: Some(QuestSpec {
            title: "Forge New Tools",
            work_secs: 30.0,
            reward: ("Master's Chisel", ToolType::Edit, Rarity::Epic),
        }),
    },
    StructureSpec {
        name: "Campfire",
        kind: StructureType::Campfire,
        x: 12.0,
        z: 10.0,
        quest: Some(QuestSpec {
            title: "Rally the Troops",
            work_secs: 20.0,
            reward: ("Signal Horn", ToolType::Communicate, Rarity::Common),
        }),
    },
];

/// Populate a fresh world from the spawn config.
pub fn setup_world(
    store: &mut EntityStore,
    terrain: &TerrainGrid,
    rng: &mut ChaCha8Rng,
    spawn: &SpawnConfig,
) {
    if spawn.initial_structures {
        spawn_opening_structures(store, terrain);
    }
    let agents = spawn_agents_near(store, terrain, rng, spawn.initial_agents, Position::ORIGIN, 0);
    info!(
        agents = agents.len(),
        structures = store.structure_count(),
        quests = store.quest_count(),
        "world populated"
    );
}

/// Place the opening structures with their quests and questline.
pub fn spawn_opening_structures(store: &mut EntityStore, terrain: &TerrainGrid) {
    let mut quests = Vec::new();
    for spec in &OPENING_STRUCTURES {
        let wanted = Position::new(spec.x, 0.0, spec.z);
        let Some(position) = terrain.nearest_walkable(&wanted, SPAWN_SNAP_RADIUS) else {
            debug!(name = spec.name, "no walkable ground for structure");
            continue;
        };
        let structure = spawn_structure(store, spec.name, spec.kind, position, Some(Faction::Player));

        if let Some(q) = &spec.quest {
            let (name, kind, rarity) = q.reward;
            let mut quest = Quest::new(q.title, q.work_secs);
            quest.structure = Some(structure);
            quest.reward = Some(Tool {
                name: name.to_string(),
                kind,
                rarity,
            });
            quests.push(store.add_quest(quest));
        }
    }
    if !quests.is_empty() {
        store.add_questline(Questline::new("The First Campaign", quests));
    }
}

/// Scatter `count` agents around `near`, snapping each to walkable ground.
/// Names continue from `first_number`.
pub fn spawn_agents_near(
    store: &mut EntityStore,
    terrain: &TerrainGrid,
    rng: &mut ChaCha8Rng,
    count: u32,
    near: Position,
    first_number: u32,
) -> Vec<AgentId> {
    let spread = (count as f32).sqrt() * 0.75 + 1.0;
    let mut spawned = Vec::with_capacity(count as usize);
    for n in 0..count {
        let angle: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
        let radius: f32 = spread * rng.gen_range(0.0f32..1.0).sqrt();
        let wanted = near.offset(angle.cos() * radius, angle.sin() * radius);
        let Some(tile) = terrain.nearest_walkable(&wanted, SPAWN_SNAP_RADIUS) else {
            continue;
        };
        // Keep the scatter inside the snapped tile rather than on its centre.
        let position = if terrain.world_to_tile(&wanted) == terrain.world_to_tile(&tile) {
            Position::new(wanted.x, 0.0, wanted.z)
        } else {
            tile
        };
        let name = format!("Agent {}", first_number + n + 1);
        spawned.push(spawn_agent(store, name, position));
    }
    spawned
}

pub fn spawn_agent(store: &mut EntityStore, name: impl Into<String>, position: Position) -> AgentId {
    store.add_agent(Agent::new(name, AGENT_MAX_HEALTH), position)
}

/// Spawn a dragon whose lair is its spawn point.
pub fn spawn_dragon(store: &mut EntityStore, kind: DragonType, position: Position) -> DragonId {
    let profile = get_profile(kind);
    let dragon = Dragon {
        kind,
        health: profile.max_health,
        max_health: profile.max_health,
        state: DragonState::Idle,
        target: None,
        home: position,
        patrol_angle: 0.0,
        attack_cooldown_secs: 0.0,
    };
    store.add_dragon(dragon, position)
}

pub fn spawn_structure(
    store: &mut EntityStore,
    name: impl Into<String>,
    kind: StructureType,
    position: Position,
    owner: Option<Faction>,
) -> StructureId {
    let structure = Structure {
        name: name.into(),
        kind,
        owner,
        quest: None,
    };
    store.add_structure(structure, position)
}
