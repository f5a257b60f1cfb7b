//! Player commands sent from the UI to the simulation.
//!
//! Commands are applied synchronously by the engine; effects are visible to
//! the very next read.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::ids::{AgentId, DragonId, PartyId, StructureId};
use crate::types::Position;

/// All possible player actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    // --- Selection ---
    /// Replace the agent selection.
    SelectAgents { ids: Vec<AgentId> },
    /// Extend the agent selection.
    AddToSelection { ids: Vec<AgentId> },
    ClearSelection,
    /// Set or clear the selected structure.
    SelectStructure { structure: Option<StructureId> },

    // --- Orders ---
    /// Move the selected agents to a point in formation.
    MoveSelected { target: Position },
    /// Send the selected agents to work at a structure.
    AssignSelectedToStructure { structure: StructureId },
    /// Order the selected agents to attack a dragon.
    AttackWithSelected { dragon: DragonId },
    /// Equip an inventory slot (or unequip with `None`).
    EquipTool { agent: AgentId, slot: Option<usize> },

    // --- Spawning ---
    SpawnAgents { count: u32, near: Position },
    SpawnDragon { kind: DragonType, position: Position },
    SpawnStructure {
        name: String,
        kind: StructureType,
        position: Position,
        owner: Option<Faction>,
    },
    DespawnAgent { agent: AgentId },

    // --- Parties ---
    /// Form a party from the currently selected agents.
    CreatePartyFromSelection { name: String, formation: FormationType },
    SetPartyFormation { party: PartyId, formation: FormationType },
    DisbandParty { party: PartyId },

    // --- Camera ---
    PanCamera { dx: f32, dz: f32 },
    /// Multiply zoom by `factor`.
    ZoomCamera { factor: f32 },
    /// Adjust the rotation/elevation targets (radians).
    OrbitCamera { rotation: f32, elevation: f32 },
    ResizeViewport { width: f32, height: f32 },

    // --- Simulation control ---
    /// Set time scale (1.0 = normal, 2.0 = double, 0.0 = frozen).
    SetTimeScale { scale: f64 },
    Pause,
    Resume,
}
