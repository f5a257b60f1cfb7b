//! Agent combat system: agents ordered to attack chase their dragon and
//! strike it on a fixed interval.

use tracing::info;

use empire_core::config::{CombatConfig, MovementConfig};
use empire_core::enums::{AgentState, DragonState};
use empire_core::events::GameEvent;
use empire_core::ids::{AgentId, DragonId};
use empire_core::types::Position;
use empire_world::TerrainGrid;

use crate::store::EntityStore;

/// Run one combat step for every attacking agent, in spawn order.
pub fn run(
    store: &mut EntityStore,
    terrain: &TerrainGrid,
    combat: &CombatConfig,
    movement: &MovementConfig,
    dt: f32,
    events: &mut Vec<GameEvent>,
) {
    let attackers: Vec<(AgentId, Option<DragonId>)> = store
        .living_agents()
        .filter_map(|id| {
            let agent = store.get_agent(id)?;
            (agent.state == AgentState::Attacking).then_some((id, agent.attack_target))
        })
        .collect();

    for (agent_id, dragon_id) in attackers {
        let target = dragon_id
            .filter(|&d| store.is_dragon_alive(d))
            .and_then(|d| store.dragon_position(d).map(|pos| (d, pos)));

        let Some((agent_pos, agent)) = store.agent_entry_mut(agent_id) else {
            continue;
        };
        agent.attack_cooldown_secs = (agent.attack_cooldown_secs - dt).max(0.0);

        let Some((dragon_id, dragon_pos)) = target else {
            // Target gone: stand down.
            agent.state = AgentState::Idle;
            agent.attack_target = None;
            agent.current_task = None;
            continue;
        };

        let distance = agent_pos.horizontal_distance_to(&dragon_pos);
        if distance > combat.agent_attack_range {
            let goal = Position::new(dragon_pos.x, agent_pos.y, dragon_pos.z);
            let max_step = (movement.agent_speed * dt).min(distance - combat.agent_attack_range * 0.9);
            let (next, _) = agent_pos.step_toward(&goal, max_step.max(0.0));
            // Agents chase on foot and stop at impassable ground.
            if terrain.is_walkable_at(&next) {
                *agent_pos = next;
            }
            continue;
        }

        if agent.attack_cooldown_secs > 0.0 {
            continue;
        }
        agent.attack_cooldown_secs = combat.agent_attack_interval_secs;
        let multiplier = agent.equipped().map_or(1.0, |tool| tool.rarity.damage_multiplier());
        let damage = combat.agent_attack_damage * multiplier;

        let Some(dragon) = store.dragon_mut(dragon_id) else {
            continue;
        };
        dragon.health = (dragon.health - damage).max(0.0);
        if dragon.health <= 0.0 {
            dragon.state = DragonState::Dead;
            dragon.target = None;
            info!(dragon = %dragon_id, agent = %agent_id, "dragon slain");
            events.push(GameEvent::DragonSlain { dragon: dragon_id });
        }
    }
}
