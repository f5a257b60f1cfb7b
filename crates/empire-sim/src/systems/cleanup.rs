//! Cleanup system: removes slain dragons and agents whose corpse has
//! lingered long enough.

use empire_core::enums::DragonState;
use empire_core::ids::{AgentId, DragonId};

use crate::store::EntityStore;

/// Remove dead entities. Reuses the caller's buffers to avoid per-step
/// allocation.
pub fn run(
    store: &mut EntityStore,
    now_secs: f64,
    corpse_linger_secs: f64,
    dead_agents: &mut Vec<AgentId>,
    dead_dragons: &mut Vec<DragonId>,
) {
    dead_agents.clear();
    dead_dragons.clear();

    // Agents killed outside combat have no time of death yet.
    for &id in store.agent_ids() {
        let unstamped = store
            .get_agent(id)
            .is_some_and(|a| !a.is_alive() && a.died_at_secs.is_none());
        if unstamped {
            dead_agents.push(id);
        }
    }
    for id in dead_agents.drain(..) {
        if let Some(agent) = store.agent_mut(id) {
            agent.died_at_secs = Some(now_secs);
        }
    }

    for &id in store.agent_ids() {
        let expired = store
            .get_agent(id)
            .and_then(|a| a.died_at_secs)
            .is_some_and(|died| now_secs - died >= corpse_linger_secs);
        if expired {
            dead_agents.push(id);
        }
    }

    for &id in store.dragon_ids() {
        let dead = store
            .get_dragon(id)
            .is_some_and(|d| d.state == DragonState::Dead);
        if dead {
            dead_dragons.push(id);
        }
    }

    for id in dead_agents.drain(..) {
        let _ = store.remove_agent(id);
    }
    for id in dead_dragons.drain(..) {
        let _ = store.remove_dragon(id);
    }
}
