//! World snapshot — the complete visible state handed to renderers each frame.
//!
//! Entity lists are in spawn order so instanced renderers can diff frame to
//! frame by index.

use serde::{Deserialize, Serialize};

use crate::camera::CameraState;
use crate::components::{Party, Quest, Questline};
use crate::enums::*;
use crate::events::GameEvent;
use crate::ids::{AgentId, DragonId, PartyId, QuestId, StructureId};
use crate::types::{Position, SimTime};

/// Complete game state published after each step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub time_scale: f64,
    pub agents: Vec<AgentView>,
    pub dragons: Vec<DragonView>,
    pub structures: Vec<StructureView>,
    pub quests: Vec<Quest>,
    pub questlines: Vec<Questline>,
    pub parties: Vec<Party>,
    pub selected_agents: Vec<AgentId>,
    pub selected_structure: Option<StructureId>,
    pub selection_box: SelectionBox,
    pub camera: CameraState,
    pub stats: WorldStats,
    pub connections: Vec<ConnectionView>,
    pub events: Vec<GameEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentView {
    pub id: AgentId,
    pub name: String,
    pub position: Position,
    pub target_position: Option<Position>,
    pub state: AgentState,
    pub current_task: Option<String>,
    pub health: f32,
    pub max_health: f32,
    pub party: Option<PartyId>,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DragonView {
    pub id: DragonId,
    pub kind: DragonType,
    pub position: Position,
    pub health: f32,
    pub max_health: f32,
    pub state: DragonState,
    pub target: Option<AgentId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureView {
    pub id: StructureId,
    pub name: String,
    pub kind: StructureType,
    pub position: Position,
    pub owner: Option<Faction>,
    pub quest: Option<QuestId>,
    pub selected: bool,
}

/// Screen-space drag rectangle. Reset at the start of every gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionBox {
    pub active: bool,
    pub start_x: f32,
    pub start_y: f32,
    pub end_x: f32,
    pub end_y: f32,
}

impl SelectionBox {
    pub fn width(&self) -> f32 {
        (self.end_x - self.start_x).abs()
    }

    pub fn height(&self) -> f32 {
        (self.end_y - self.start_y).abs()
    }

    /// Inclusive containment test on normalised corners.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let (min_x, max_x) = (self.start_x.min(self.end_x), self.start_x.max(self.end_x));
        let (min_y, max_y) = (self.start_y.min(self.end_y), self.start_y.max(self.end_y));
        x >= min_x && x <= max_x && y >= min_y && y <= max_y
    }
}

/// Aggregate counts for the HUD.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldStats {
    pub agent_count: usize,
    pub living_agents: usize,
    pub dragon_count: usize,
    pub structure_count: usize,
    pub quest_count: usize,
    pub completed_quest_count: usize,
    pub party_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionKind {
    /// Agent to the structure it is assigned to.
    Assignment,
    /// Consecutive members of a party.
    Party,
}

/// A line for the connection overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectionView {
    pub from: Position,
    pub to: Position,
    pub kind: ConnectionKind,
}
