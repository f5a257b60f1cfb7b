//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Agent lifecycle / activity state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentState {
    #[default]
    Idle,
    /// Following a path toward `target_position`.
    Moving,
    /// Stationed at an assigned structure, contributing quest work.
    Working,
    /// Engaging a dragon.
    Attacking,
    Dead,
}

/// Dragon variants. Combat tuning per variant lives in the dragon AI profiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DragonType {
    #[default]
    Fire,
    Ice,
    Shadow,
    Ancient,
}

/// Dragon behaviour state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragonState {
    #[default]
    Idle,
    /// Circling its home position.
    Patrol,
    Attacking,
    Dead,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureType {
    #[default]
    Base,
    Castle,
    Tower,
    Workshop,
    Campfire,
}

impl StructureType {
    /// Hit radius used for picking and for arrival around the footprint.
    pub fn footprint_radius(self) -> f32 {
        match self {
            StructureType::Castle => 2.5,
            StructureType::Base => 2.0,
            StructureType::Tower => 1.5,
            StructureType::Workshop => 1.5,
            StructureType::Campfire => 0.75,
        }
    }
}

/// Owning faction of a structure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    #[default]
    Player,
    Neutral,
    Hostile,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestStatus {
    #[default]
    NotStarted,
    Active,
    Complete,
    Failed,
}

/// Derived status of a questline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestlineStatus {
    #[default]
    NotStarted,
    InProgress,
    Complete,
    Failed,
}

/// Geometric arrangement used when a group moves to one destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormationType {
    /// Evenly spaced ring around the destination.
    #[default]
    Circle,
    /// Single rank perpendicular to the approach.
    Line,
    /// Arrowhead with the first member at the tip.
    Wedge,
    /// Single file.
    Column,
}

/// Terrain classification of a tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Biome {
    #[default]
    Grass,
    Sand,
    Forest,
    Stone,
    Water,
    Mountain,
    /// Returned for positions outside the grid.
    Unknown,
}

impl Biome {
    pub fn is_walkable(self) -> bool {
        !matches!(self, Biome::Water | Biome::Mountain | Biome::Unknown)
    }

    /// Traversal cost multiplier for entering a tile of this biome.
    pub fn movement_cost(self) -> f32 {
        match self {
            Biome::Grass => 1.0,
            Biome::Stone => 1.25,
            Biome::Sand => 1.5,
            Biome::Forest => 2.0,
            Biome::Water | Biome::Mountain | Biome::Unknown => f32::INFINITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolType {
    Search,
    Edit,
    Build,
    Analyze,
    Communicate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// Damage multiplier granted by an equipped tool of this rarity.
    pub fn damage_multiplier(self) -> f32 {
        match self {
            Rarity::Common => 1.0,
            Rarity::Uncommon => 1.1,
            Rarity::Rare => 1.25,
            Rarity::Epic => 1.5,
            Rarity::Legendary => 2.0,
        }
    }
}

/// Top-level run state of the simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Active,
    Paused,
}

