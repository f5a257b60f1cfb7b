//! Snapshot system: reads the store and builds a complete `WorldSnapshot`.
//!
//! This system is read-only; it never modifies the store.

use empire_core::constants::MAX_CONNECTIONS;
use empire_core::enums::GamePhase;
use empire_core::events::GameEvent;
use empire_core::state::*;
use empire_core::types::SimTime;

use crate::store::EntityStore;

/// Build a complete snapshot from the current store state.
pub fn build_snapshot(
    store: &EntityStore,
    time: &SimTime,
    phase: GamePhase,
    time_scale: f64,
    events: Vec<GameEvent>,
) -> WorldSnapshot {
    WorldSnapshot {
        time: *time,
        phase,
        time_scale,
        agents: build_agents(store),
        dragons: build_dragons(store),
        structures: build_structures(store),
        quests: store.quests().cloned().collect(),
        questlines: store.questlines().cloned().collect(),
        parties: store.parties().cloned().collect(),
        selected_agents: store.selected_agents(),
        selected_structure: store.selected_structure(),
        selection_box: store.selection_box(),
        camera: *store.camera(),
        stats: store.stats(),
        connections: build_connections(store),
        events,
    }
}

fn build_agents(store: &EntityStore) -> Vec<AgentView> {
    store
        .agent_ids()
        .iter()
        .filter_map(|&id| {
            let position = store.agent_position(id)?;
            let agent = store.get_agent(id)?;
            Some(AgentView {
                id,
                name: agent.name.clone(),
                position,
                target_position: agent.target_position,
                state: agent.state,
                current_task: agent.current_task.clone(),
                health: agent.health,
                max_health: agent.max_health,
                party: agent.party,
                selected: store.is_selected(id),
            })
        })
        .collect()
}

fn build_dragons(store: &EntityStore) -> Vec<DragonView> {
    store
        .dragon_ids()
        .iter()
        .filter_map(|&id| {
            let position = store.dragon_position(id)?;
            let dragon = store.get_dragon(id)?;
            Some(DragonView {
                id,
                kind: dragon.kind,
                position,
                health: dragon.health,
                max_health: dragon.max_health,
                state: dragon.state,
                target: dragon.target,
            })
        })
        .collect()
}

fn build_structures(store: &EntityStore) -> Vec<StructureView> {
    let selected = store.selected_structure();
    store
        .structure_ids()
        .iter()
        .filter_map(|&id| {
            let position = store.structure_position(id)?;
            let structure = store.get_structure(id)?;
            Some(StructureView {
                id,
                name: structure.name.clone(),
                kind: structure.kind,
                position,
                owner: structure.owner,
                quest: structure.quest,
                selected: selected == Some(id),
            })
        })
        .collect()
}

/// Overlay lines: agent → assigned structure, then consecutive party
/// members. Capped at `MAX_CONNECTIONS`.
fn build_connections(store: &EntityStore) -> Vec<ConnectionView> {
    let mut connections = Vec::new();

    for id in store.living_agents() {
        let assigned = store.get_agent(id).and_then(|a| a.assigned_structure);
        let ends = assigned.and_then(|s| Some((store.agent_position(id)?, store.structure_position(s)?)));
        if let Some((from, to)) = ends {
            connections.push(ConnectionView {
                from,
                to,
                kind: ConnectionKind::Assignment,
            });
        }
    }

    for party in store.parties() {
        for pair in party.members.windows(2) {
            let ends = store
                .agent_position(pair[0])
                .zip(store.agent_position(pair[1]));
            if let Some((from, to)) = ends {
                connections.push(ConnectionView {
                    from,
                    to,
                    kind: ConnectionKind::Party,
                });
            }
        }
    }

    connections.truncate(MAX_CONNECTIONS);
    connections
}
