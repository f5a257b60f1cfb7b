//! Reference sweep: clears ids that no longer resolve.
//!
//! Every cross-entity link is a weak id. Removing an entity leaves its
//! inbound references dangling until this sweep runs at the end of the
//! step, after which parties, quests, dragons and agents only name live
//! entities.

use std::collections::HashSet;

use tracing::debug;

use empire_core::enums::AgentState;
use empire_core::ids::{AgentId, DragonId, PartyId, QuestId, StructureId};

use crate::store::EntityStore;

pub fn run(store: &mut EntityStore) {
    let agents: HashSet<AgentId> = store.agent_ids().iter().copied().collect();
    let living: HashSet<AgentId> = store.living_agents().collect();
    let dragons: HashSet<DragonId> = store
        .dragon_ids()
        .iter()
        .copied()
        .filter(|&d| store.is_dragon_alive(d))
        .collect();
    let structures: HashSet<StructureId> = store.structure_ids().iter().copied().collect();
    let quests: HashSet<QuestId> = store.quest_ids().into_iter().collect();
    let parties: HashSet<PartyId> = store.parties().map(|p| p.id).collect();

    for party in store.parties_mut() {
        let before = party.members.len();
        party.members.retain(|m| living.contains(m));
        if party.members.len() != before {
            debug!(party = %party.id, dropped = before - party.members.len(), "stale party members");
        }
    }

    for quest in store.quests_mut() {
        quest.assigned_agents.retain(|a| agents.contains(a));
        if quest.structure.is_some_and(|s| !structures.contains(&s)) {
            debug!(quest = %quest.id, "quest structure removed");
            quest.structure = None;
        }
    }

    for line in store.questlines_mut() {
        line.quests.retain(|q| quests.contains(q));
    }

    for &id in &structures {
        if let Some(structure) = store.structure_mut(id) {
            if structure.quest.is_some_and(|q| !quests.contains(&q)) {
                structure.quest = None;
            }
        }
    }

    for id in store.dragon_ids().to_vec() {
        if let Some(dragon) = store.dragon_mut(id) {
            if dragon.target.is_some_and(|a| !living.contains(&a)) {
                dragon.target = None;
            }
        }
    }

    for &id in &agents {
        let Some(agent) = store.agent_mut(id) else {
            continue;
        };
        if agent.attack_target.is_some_and(|d| !dragons.contains(&d)) {
            agent.attack_target = None;
            if agent.state == AgentState::Attacking {
                agent.state = AgentState::Idle;
                agent.current_task = None;
            }
        }
        if agent.assigned_structure.is_some_and(|s| !structures.contains(&s)) {
            agent.assigned_structure = None;
            if agent.state == AgentState::Working {
                agent.state = AgentState::Idle;
                agent.current_task = None;
            }
        }
        if agent.party.is_some_and(|p| !parties.contains(&p)) {
            agent.party = None;
        }
    }

    store.retain_selection(|id| living.contains(&id));
    if store
        .selected_structure()
        .is_some_and(|s| !structures.contains(&s))
    {
        let _ = store.set_selected_structure(None);
    }
}
