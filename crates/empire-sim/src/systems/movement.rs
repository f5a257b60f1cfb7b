//! Movement system: advances moving agents along their waypoints.
//!
//! Each agent spends a distance budget of `speed * dt` walking through its
//! remaining waypoints, then arrives once it is within the arrival epsilon
//! of its final target.

use empire_core::config::MovementConfig;
use empire_core::enums::AgentState;
use empire_core::events::GameEvent;
use empire_core::ids::AgentId;

use crate::store::EntityStore;

/// Advance every moving agent, in spawn order.
pub fn run(store: &mut EntityStore, movement: &MovementConfig, dt: f32, events: &mut Vec<GameEvent>) {
    let moving: Vec<AgentId> = store
        .agent_ids()
        .iter()
        .copied()
        .filter(|&id| {
            store
                .get_agent(id)
                .is_some_and(|a| a.state == AgentState::Moving)
        })
        .collect();

    for id in moving {
        let structure_name = store
            .get_agent(id)
            .and_then(|a| a.assigned_structure)
            .and_then(|s| store.get_structure(s).map(|s| s.name.clone()));

        let Some((pos, agent)) = store.agent_entry_mut(id) else {
            continue;
        };
        let Some(target) = agent.target_position else {
            agent.state = AgentState::Idle;
            agent.path.clear();
            continue;
        };

        let mut budget = movement.agent_speed * dt;
        while budget > 0.0 {
            let waypoint = agent.path.front().copied().unwrap_or(target);
            let (next, reached) = pos.step_toward(&waypoint, budget);
            budget -= pos.distance_to(&next);
            *pos = next;
            if !reached || agent.path.pop_front().is_none() {
                break;
            }
        }

        if pos.distance_to(&target) > movement.arrival_epsilon {
            continue;
        }

        *pos = target;
        agent.target_position = None;
        agent.path.clear();
        match structure_name {
            Some(name) => {
                agent.state = AgentState::Working;
                agent.current_task = Some(format!("Working at {name}"));
            }
            None => {
                agent.state = AgentState::Idle;
                agent.current_task = None;
            }
        }
        events.push(GameEvent::AgentArrived { agent: id });
    }
}
