//! ECS components and bookkeeping records.
//!
//! Components are plain data. Game logic lives in systems, not components.
//! Every link to another entity is an id resolved through the store on use.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::ids::{AgentId, DragonId, PartyId, QuestId, QuestlineId, StructureId};
use crate::types::Position;

/// A player-controllable unit. Position is a separate component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub name: String,
    pub state: AgentState,
    /// Final destination of the current move order.
    pub target_position: Option<Position>,
    /// Remaining waypoints toward `target_position` (front = next).
    pub path: VecDeque<Position>,
    /// Free-text description of what the agent is doing.
    pub current_task: Option<String>,
    pub health: f32,
    pub max_health: f32,
    pub party: Option<PartyId>,
    /// Structure the agent was assigned to work at.
    pub assigned_structure: Option<StructureId>,
    /// Dragon the agent was ordered to attack.
    pub attack_target: Option<DragonId>,
    /// Seconds until the agent may strike again.
    pub attack_cooldown_secs: f32,
    pub inventory: Vec<Tool>,
    /// Index into `inventory`.
    pub equipped_tool: Option<usize>,
    /// Simulation time of death, for corpse cleanup.
    pub died_at_secs: Option<f64>,
}

impl Agent {
    pub fn new(name: impl Into<String>, max_health: f32) -> Self {
        Self {
            name: name.into(),
            state: AgentState::Idle,
            target_position: None,
            path: VecDeque::new(),
            current_task: None,
            health: max_health,
            max_health,
            party: None,
            assigned_structure: None,
            attack_target: None,
            attack_cooldown_secs: 0.0,
            inventory: Vec::new(),
            equipped_tool: None,
            died_at_secs: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.state != AgentState::Dead
    }

    pub fn equipped(&self) -> Option<&Tool> {
        self.equipped_tool.and_then(|idx| self.inventory.get(idx))
    }
}

/// A hostile unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dragon {
    pub kind: DragonType,
    pub health: f32,
    pub max_health: f32,
    pub state: DragonState,
    /// Agent currently aggroed on.
    pub target: Option<AgentId>,
    /// Center of the patrol circle and leash anchor.
    pub home: Position,
    /// Current angle around `home` while patrolling (radians).
    pub patrol_angle: f32,
    /// Seconds until the next strike.
    pub attack_cooldown_secs: f32,
}

/// A static building or objective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Structure {
    pub name: String,
    pub kind: StructureType,
    pub owner: Option<Faction>,
    /// Quest worked at this structure.
    pub quest: Option<QuestId>,
}

/// An inventory item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    pub kind: ToolType,
    pub rarity: Rarity,
}

/// A unit of work tied to a structure. Stored outside the ECS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quest {
    pub id: QuestId,
    pub title: String,
    pub status: QuestStatus,
    pub structure: Option<StructureId>,
    pub assigned_agents: Vec<AgentId>,
    /// Agent-seconds of work needed to complete.
    pub work_required_secs: f32,
    pub work_done_secs: f32,
    /// Seconds after activation before the quest fails.
    pub deadline_secs: Option<f64>,
    pub started_at_secs: Option<f64>,
    pub reward: Option<Tool>,
}

impl Quest {
    /// A not-started quest. The store assigns the id on insertion.
    pub fn new(title: impl Into<String>, work_required_secs: f32) -> Self {
        Self {
            id: QuestId::default(),
            title: title.into(),
            status: QuestStatus::NotStarted,
            structure: None,
            assigned_agents: Vec::new(),
            work_required_secs,
            work_done_secs: 0.0,
            deadline_secs: None,
            started_at_secs: None,
            reward: None,
        }
    }

    pub fn progress(&self) -> f32 {
        if self.work_required_secs <= 0.0 {
            return 1.0;
        }
        (self.work_done_secs / self.work_required_secs).clamp(0.0, 1.0)
    }
}

/// Ordered chain of quests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Questline {
    pub id: QuestlineId,
    pub name: String,
    pub quests: Vec<QuestId>,
    pub status: QuestlineStatus,
}

impl Questline {
    pub fn new(name: impl Into<String>, quests: Vec<QuestId>) -> Self {
        Self {
            id: QuestlineId::default(),
            name: name.into(),
            quests,
            status: QuestlineStatus::NotStarted,
        }
    }
}

/// A named group of agents sharing a formation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    pub id: PartyId,
    pub name: String,
    pub formation: FormationType,
    /// Member order is formation slot order.
    pub members: Vec<AgentId>,
}
