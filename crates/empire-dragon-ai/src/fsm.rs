//! Dragon behaviour finite state machine.
//!
//! Pure functions that compute state transitions, movement and strikes for
//! one dragon from a snapshot of its situation. No ECS dependency: the
//! caller resolves target ids to positions and applies the result.

use empire_core::constants::DRAGON_PATROL_RADIUS;
use empire_core::enums::{DragonState, DragonType};
use empire_core::types::Position;

use crate::profiles::{get_profile, DragonProfile};

/// Input to the dragon FSM for a single entity.
pub struct DragonContext {
    pub kind: DragonType,
    pub state: DragonState,
    pub health: f32,
    pub position: Position,
    pub home: Position,
    pub patrol_angle: f32,
    pub cooldown_secs: f32,
    /// Position of the current aggro target, if it is still alive.
    pub target: Option<Position>,
    /// Position of the nearest living agent, if any.
    pub nearest_agent: Option<Position>,
    /// Multiplier on the profile's aggro range.
    pub aggro_scale: f32,
    pub dt: f32,
}

/// What to do with the aggro target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetChange {
    Keep,
    /// Take the nearest agent from the context as the new target.
    AcquireNearest,
    Drop,
}

/// Output from the dragon FSM.
#[derive(Debug, Clone, Copy)]
pub struct DragonUpdate {
    pub new_state: DragonState,
    pub new_position: Position,
    pub new_patrol_angle: f32,
    pub new_cooldown_secs: f32,
    pub target: TargetChange,
    /// A strike lands this step.
    pub strike: bool,
    pub state_changed: bool,
}

/// Evaluate the FSM for one dragon.
pub fn evaluate(ctx: &DragonContext) -> DragonUpdate {
    let cooldown = (ctx.cooldown_secs - ctx.dt).max(0.0);
    let no_change = DragonUpdate {
        new_state: ctx.state,
        new_position: ctx.position,
        new_patrol_angle: ctx.patrol_angle,
        new_cooldown_secs: cooldown,
        target: TargetChange::Keep,
        strike: false,
        state_changed: false,
    };

    if ctx.state == DragonState::Dead {
        return no_change;
    }
    if ctx.health <= 0.0 {
        return DragonUpdate {
            new_state: DragonState::Dead,
            target: TargetChange::Drop,
            state_changed: true,
            ..no_change
        };
    }

    let profile = get_profile(ctx.kind);

    // Keep chasing the current target while it stays on the leash.
    if let Some(target) = ctx.target {
        if target.horizontal_distance_to(&ctx.home) <= profile.leash_range {
            return engage(ctx, &profile, target, TargetChange::Keep, cooldown);
        }
    }

    let aggro_range = profile.aggro_range * ctx.aggro_scale;
    if let Some(nearest) = ctx.nearest_agent {
        if nearest.horizontal_distance_to(&ctx.position) <= aggro_range
            && nearest.horizontal_distance_to(&ctx.home) <= profile.leash_range
        {
            return engage(ctx, &profile, nearest, TargetChange::AcquireNearest, cooldown);
        }
    }

    let target = if ctx.target.is_some() {
        TargetChange::Drop
    } else {
        TargetChange::Keep
    };
    let update = if profile.patrols {
        patrol(ctx, &profile, cooldown)
    } else {
        return_home(ctx, &profile, cooldown)
    };
    DragonUpdate { target, ..update }
}

/// Close in on `target` and strike when in range and off cooldown.
fn engage(
    ctx: &DragonContext,
    profile: &DragonProfile,
    target: Position,
    change: TargetChange,
    cooldown: f32,
) -> DragonUpdate {
    let distance = ctx.position.horizontal_distance_to(&target);
    let (new_position, strike, new_cooldown) = if distance <= profile.attack_range {
        if cooldown <= 0.0 {
            (ctx.position, true, profile.attack_interval_secs)
        } else {
            (ctx.position, false, cooldown)
        }
    } else {
        let goal = Position::new(target.x, ctx.position.y, target.z);
        let step = profile.speed * ctx.dt;
        // Stop at the edge of attack range rather than on top of the agent.
        let max_step = step.min(distance - profile.attack_range * 0.9);
        let (pos, _) = ctx.position.step_toward(&goal, max_step.max(0.0));
        (pos, false, cooldown)
    };

    DragonUpdate {
        new_state: DragonState::Attacking,
        new_position,
        new_patrol_angle: ctx.patrol_angle,
        new_cooldown_secs: new_cooldown,
        target: change,
        strike,
        state_changed: ctx.state != DragonState::Attacking,
    }
}

/// Circle the home position.
fn patrol(ctx: &DragonContext, profile: &DragonProfile, cooldown: f32) -> DragonUpdate {
    let step = profile.speed * 0.5 * ctx.dt;
    let angle = ctx.patrol_angle + step / DRAGON_PATROL_RADIUS;
    let waypoint = Position::new(
        ctx.home.x + angle.cos() * DRAGON_PATROL_RADIUS,
        ctx.position.y,
        ctx.home.z + angle.sin() * DRAGON_PATROL_RADIUS,
    );
    // Returning from a chase can leave the dragon far off the circle; fly
    // back at full speed until it rejoins.
    let speed = if ctx.position.horizontal_distance_to(&waypoint) > 1.0 {
        profile.speed
    } else {
        profile.speed * 0.5
    };
    let (new_position, _) = ctx.position.step_toward(&waypoint, speed * ctx.dt);

    DragonUpdate {
        new_state: DragonState::Patrol,
        new_position,
        new_patrol_angle: angle.rem_euclid(std::f32::consts::TAU),
        new_cooldown_secs: cooldown,
        target: TargetChange::Keep,
        strike: false,
        state_changed: ctx.state != DragonState::Patrol,
    }
}

/// Go back to the lair and wait there.
fn return_home(ctx: &DragonContext, profile: &DragonProfile, cooldown: f32) -> DragonUpdate {
    let home = Position::new(ctx.home.x, ctx.position.y, ctx.home.z);
    let (new_position, _) = ctx.position.step_toward(&home, profile.speed * ctx.dt);
    DragonUpdate {
        new_state: DragonState::Idle,
        new_position,
        new_patrol_angle: ctx.patrol_angle,
        new_cooldown_secs: cooldown,
        target: TargetChange::Keep,
        strike: false,
        state_changed: ctx.state != DragonState::Idle,
    }
}
