//! Dragon AI system: runs the behaviour FSM for each dragon and applies
//! movement, aggro changes and strikes to the store.

use tracing::debug;

use empire_core::config::CombatConfig;
use empire_core::enums::DragonState;
use empire_core::events::GameEvent;
use empire_core::ids::{AgentId, DragonId};
use empire_core::types::Position;

use empire_dragon_ai::fsm::{evaluate, DragonContext, DragonUpdate, TargetChange};
use empire_dragon_ai::profiles::get_profile;

use crate::store::EntityStore;

/// Nearest living agent to `from` on the ground plane. Ties keep the
/// earliest spawned agent.
fn nearest_agent(store: &EntityStore, from: &Position) -> Option<(AgentId, Position)> {
    let mut best: Option<(f32, AgentId, Position)> = None;
    for id in store.living_agents() {
        let Some(pos) = store.agent_position(id) else {
            continue;
        };
        let d = from.horizontal_distance_to(&pos);
        if best.is_none_or(|(bd, _, _)| d < bd) {
            best = Some((d, id, pos));
        }
    }
    best.map(|(_, id, pos)| (id, pos))
}

/// Run the dragon FSM for every dragon, in spawn order.
pub fn run(
    store: &mut EntityStore,
    combat: &CombatConfig,
    dt: f32,
    now_secs: f64,
    events: &mut Vec<GameEvent>,
) {
    let ids: Vec<DragonId> = store.dragon_ids().to_vec();
    for id in ids {
        let Some((ctx, current_target, nearest)) = build_context(store, id, combat, dt) else {
            continue;
        };
        let update = evaluate(&ctx);
        apply(store, id, &ctx, update, current_target, nearest, combat, now_secs, events);
    }
}

#[allow(clippy::type_complexity)]
fn build_context(
    store: &EntityStore,
    id: DragonId,
    combat: &CombatConfig,
    dt: f32,
) -> Option<(DragonContext, Option<AgentId>, Option<AgentId>)> {
    let position = store.dragon_position(id)?;
    let dragon = store.get_dragon(id)?;

    // A target that died or vanished is treated as no target.
    let current_target = dragon.target.filter(|&a| store.is_agent_alive(a));
    let target_position = current_target.and_then(|a| store.agent_position(a));
    let nearest = nearest_agent(store, &position);

    let ctx = DragonContext {
        kind: dragon.kind,
        state: dragon.state,
        health: dragon.health,
        position,
        home: dragon.home,
        patrol_angle: dragon.patrol_angle,
        cooldown_secs: dragon.attack_cooldown_secs,
        target: target_position,
        nearest_agent: nearest.map(|(_, pos)| pos),
        aggro_scale: combat.dragon_aggro_scale,
        dt,
    };
    Some((ctx, current_target, nearest.map(|(a, _)| a)))
}

#[allow(clippy::too_many_arguments)]
fn apply(
    store: &mut EntityStore,
    id: DragonId,
    ctx: &DragonContext,
    update: DragonUpdate,
    current_target: Option<AgentId>,
    nearest: Option<AgentId>,
    combat: &CombatConfig,
    now_secs: f64,
    events: &mut Vec<GameEvent>,
) {
    let target = match update.target {
        TargetChange::Keep => current_target,
        TargetChange::AcquireNearest => nearest,
        TargetChange::Drop => None,
    };

    if let Some((pos, dragon)) = store.dragon_entry_mut(id) {
        *pos = update.new_position;
        dragon.state = update.new_state;
        dragon.patrol_angle = update.new_patrol_angle;
        dragon.attack_cooldown_secs = update.new_cooldown_secs;
        dragon.target = target;
    }

    if update.new_state == DragonState::Dead && update.state_changed {
        events.push(GameEvent::DragonSlain { dragon: id });
        return;
    }
    if update.target == TargetChange::AcquireNearest {
        if let Some(agent) = target {
            debug!(dragon = %id, agent = %agent, "dragon aggro");
            events.push(GameEvent::DragonAggro { dragon: id, agent });
        }
    }

    if update.strike {
        let Some(victim) = target else {
            return;
        };
        let damage = get_profile(ctx.kind).attack_damage * combat.dragon_damage_scale;
        let health = match store.agent_mut(victim) {
            Some(agent) => {
                agent.health = (agent.health - damage).max(0.0);
                agent.health
            }
            None => return,
        };
        if health <= 0.0 && store.kill_agent(victim, now_secs) {
            debug!(dragon = %id, agent = %victim, "agent killed");
            events.push(GameEvent::AgentDied { agent: victim });
            if let Some(dragon) = store.dragon_mut(id) {
                dragon.target = None;
            }
        }
    }
}
