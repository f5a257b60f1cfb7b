//! Events emitted by the simulation for UI feedback.

use serde::{Deserialize, Serialize};

use crate::enums::DragonType;
use crate::ids::{AgentId, DragonId, QuestId, QuestlineId, StructureId};
use crate::types::Position;

/// Something noteworthy happened during a step or command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    AgentsSelected { count: usize },
    AgentClicked { agent: AgentId },
    StructureClicked { structure: StructureId },
    DragonClicked { dragon: DragonId },
    /// Hover target changed. All `None` means nothing is hovered.
    HoverChanged {
        agent: Option<AgentId>,
        structure: Option<StructureId>,
        dragon: Option<DragonId>,
    },
    MoveOrdered { target: Position, count: usize },
    AgentsAssigned { structure: StructureId, count: usize },
    AgentArrived { agent: AgentId },
    /// No route from the agent to its formation slot; the agent stays put.
    PathUnreachable { agent: AgentId, target: Position },
    AgentDied { agent: AgentId },
    DragonSpawned { dragon: DragonId, kind: DragonType },
    DragonAggro { dragon: DragonId, agent: AgentId },
    DragonSlain { dragon: DragonId },
    WaveSpawned { wave: usize, count: u32 },
    QuestActivated { quest: QuestId },
    QuestCompleted { quest: QuestId },
    QuestFailed { quest: QuestId },
    QuestlineCompleted { questline: QuestlineId },
}
