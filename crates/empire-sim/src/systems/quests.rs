//! Quest system: accumulates work from agents at quest structures, resolves
//! completion and deadlines, and derives questline status.

use tracing::info;

use empire_core::components::Tool;
use empire_core::enums::{AgentState, QuestStatus, QuestlineStatus};
use empire_core::events::GameEvent;
use empire_core::ids::{AgentId, QuestId, StructureId};

use crate::store::EntityStore;

enum Resolution {
    Complete,
    Failed,
}

/// Recompute quest and questline progress for one step.
pub fn run(store: &mut EntityStore, dt: f32, now_secs: f64, events: &mut Vec<GameEvent>) {
    // Working agents per structure, in spawn order.
    let workers: Vec<(AgentId, StructureId)> = store
        .living_agents()
        .filter_map(|id| {
            let agent = store.get_agent(id)?;
            if agent.state != AgentState::Working {
                return None;
            }
            agent.assigned_structure.map(|s| (id, s))
        })
        .collect();

    let mut resolved: Vec<(QuestId, Resolution)> = Vec::new();
    for quest in store.quests_mut() {
        if quest.status != QuestStatus::Active {
            continue;
        }
        let expired = match (quest.deadline_secs, quest.started_at_secs) {
            (Some(deadline), Some(started)) => now_secs - started >= deadline,
            _ => false,
        };
        if expired {
            quest.status = QuestStatus::Failed;
            resolved.push((quest.id, Resolution::Failed));
            continue;
        }

        let working = workers
            .iter()
            .filter(|(_, s)| Some(*s) == quest.structure)
            .count();
        quest.work_done_secs += dt * working as f32;
        if quest.work_done_secs >= quest.work_required_secs {
            quest.work_done_secs = quest.work_required_secs;
            quest.status = QuestStatus::Complete;
            resolved.push((quest.id, Resolution::Complete));
        }
    }

    for (quest_id, resolution) in resolved {
        release_agents(store, quest_id, &resolution, &workers);
        match resolution {
            Resolution::Complete => {
                grant_reward(store, quest_id);
                events.push(GameEvent::QuestCompleted { quest: quest_id });
            }
            Resolution::Failed => {
                events.push(GameEvent::QuestFailed { quest: quest_id });
            }
        }
    }

    update_questlines(store, events);
}

/// Send every agent tied to a finished quest back to idle with a task note.
fn release_agents(
    store: &mut EntityStore,
    quest_id: QuestId,
    resolution: &Resolution,
    workers: &[(AgentId, StructureId)],
) {
    let Some(quest) = store.get_quest(quest_id) else {
        return;
    };
    let note = match resolution {
        Resolution::Complete => format!("Completed: {}", quest.title),
        Resolution::Failed => format!("Failed: {}", quest.title),
    };
    if matches!(resolution, Resolution::Complete) {
        info!(quest = %quest_id, title = %quest.title, "quest complete");
    } else {
        info!(quest = %quest_id, title = %quest.title, "quest failed");
    }

    let mut agents = quest.assigned_agents.clone();
    for &(agent, structure) in workers {
        if Some(structure) == quest.structure && !agents.contains(&agent) {
            agents.push(agent);
        }
    }
    let structure = quest.structure;

    for agent_id in agents {
        let Some(agent) = store.agent_mut(agent_id) else {
            continue;
        };
        if !agent.is_alive() || agent.assigned_structure != structure {
            continue;
        }
        if matches!(agent.state, AgentState::Working | AgentState::Moving) {
            agent.state = AgentState::Idle;
            agent.target_position = None;
            agent.path.clear();
        }
        agent.assigned_structure = None;
        agent.current_task = Some(note.clone());
    }
}

/// Hand the quest's reward to its first living assignee, equipping it if
/// their hands are empty.
fn grant_reward(store: &mut EntityStore, quest_id: QuestId) {
    let Some(quest) = store.get_quest(quest_id) else {
        return;
    };
    let Some(reward) = quest.reward.clone() else {
        return;
    };
    let recipients: Vec<AgentId> = quest.assigned_agents.clone();
    let Some(recipient) = recipients.into_iter().find(|&a| store.is_agent_alive(a)) else {
        return;
    };
    give_tool(store, recipient, reward);
}

fn give_tool(store: &mut EntityStore, agent_id: AgentId, tool: Tool) {
    if let Some(agent) = store.agent_mut(agent_id) {
        agent.inventory.push(tool);
        if agent.equipped_tool.is_none() {
            agent.equipped_tool = Some(agent.inventory.len() - 1);
        }
    }
}

/// Derive each questline's status from its quests.
fn update_questlines(store: &mut EntityStore, events: &mut Vec<GameEvent>) {
    let statuses: Vec<Vec<QuestStatus>> = store
        .questlines()
        .map(|line| {
            line.quests
                .iter()
                .filter_map(|&q| store.get_quest(q).map(|quest| quest.status))
                .collect()
        })
        .collect();

    for (line, statuses) in store.questlines_mut().zip(statuses) {
        let status = derive_questline_status(&statuses);
        if status == QuestlineStatus::Complete && line.status != QuestlineStatus::Complete {
            info!(questline = %line.id, name = %line.name, "questline complete");
            events.push(GameEvent::QuestlineCompleted { questline: line.id });
        }
        line.status = status;
    }
}

pub fn derive_questline_status(statuses: &[QuestStatus]) -> QuestlineStatus {
    if statuses.is_empty() {
        return QuestlineStatus::NotStarted;
    }
    if statuses.contains(&QuestStatus::Failed) {
        QuestlineStatus::Failed
    } else if statuses.iter().all(|&s| s == QuestStatus::Complete) {
        QuestlineStatus::Complete
    } else if statuses.iter().any(|&s| s != QuestStatus::NotStarted) {
        QuestlineStatus::InProgress
    } else {
        QuestlineStatus::NotStarted
    }
}
