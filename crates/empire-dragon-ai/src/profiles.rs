//! Variant-specific combat profiles.
//!
//! Consolidates per-variant parameters for the dragon FSM. Scenario-level
//! scaling (`CombatConfig`) is applied on top by the caller.

use empire_core::enums::DragonType;

/// Combat and movement profile for a dragon variant.
pub struct DragonProfile {
    pub max_health: f32,
    /// Chase speed (world units per second).
    pub speed: f32,
    /// Distance at which an agent draws aggro.
    pub aggro_range: f32,
    /// Aggro is dropped once the target is this far from home.
    pub leash_range: f32,
    /// Distance within which strikes land.
    pub attack_range: f32,
    pub attack_damage: f32,
    /// Seconds between strikes.
    pub attack_interval_secs: f32,
    /// Whether the dragon circles its home when it has no target.
    pub patrols: bool,
}

/// Get the profile for a given variant.
pub fn get_profile(kind: DragonType) -> DragonProfile {
    match kind {
        DragonType::Fire => DragonProfile {
            max_health: 200.0,
            speed: 3.0,
            aggro_range: 8.0,
            leash_range: 20.0,
            attack_range: 2.0,
            attack_damage: 15.0,
            attack_interval_secs: 1.5,
            patrols: true,
        },
        DragonType::Ice => DragonProfile {
            max_health: 250.0,
            speed: 2.5,
            aggro_range: 7.0,
            leash_range: 18.0,
            attack_range: 2.5,
            attack_damage: 12.0,
            attack_interval_secs: 1.2,
            patrols: true,
        },
        DragonType::Shadow => DragonProfile {
            max_health: 150.0,
            speed: 4.5,
            aggro_range: 10.0,
            leash_range: 25.0,
            attack_range: 1.5,
            attack_damage: 10.0,
            attack_interval_secs: 0.8,
            patrols: true,
        },
        // Lair guardian: stays put until something comes close.
        DragonType::Ancient => DragonProfile {
            max_health: 600.0,
            speed: 2.0,
            aggro_range: 6.0,
            leash_range: 12.0,
            attack_range: 3.0,
            attack_damage: 30.0,
            attack_interval_secs: 2.5,
            patrols: false,
        },
    }
}
