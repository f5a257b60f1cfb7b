//! Formation layouts: where each of N agents stands around a destination.

use std::f32::consts::TAU;

use empire_core::constants::{FORMATION_MIN_RADIUS, FORMATION_RADIUS_PER_SQRT, FORMATION_SPACING};
use empire_core::enums::FormationType;
use empire_core::types::Position;

/// Ring radius for `count` agents.
pub fn radial_radius(count: usize) -> f32 {
    FORMATION_MIN_RADIUS.max((count as f32).sqrt() * FORMATION_RADIUS_PER_SQRT)
}

/// Agent `i` of `count` sits at angle `(i / count) * 2π` on a ring of
/// `radial_radius(count)` around `center`.
pub fn radial_targets(center: Position, count: usize) -> Vec<Position> {
    let radius = radial_radius(count);
    (0..count)
        .map(|i| {
            let angle = (i as f32 / count as f32) * TAU;
            center.offset(angle.cos() * radius, angle.sin() * radius)
        })
        .collect()
}

/// Target positions for `count` agents in the given formation, in slot order.
pub fn formation_targets(formation: FormationType, center: Position, count: usize) -> Vec<Position> {
    let half = (count as f32 - 1.0) * 0.5;
    match formation {
        FormationType::Circle => radial_targets(center, count),
        FormationType::Line => (0..count)
            .map(|i| center.offset((i as f32 - half) * FORMATION_SPACING, 0.0))
            .collect(),
        FormationType::Column => (0..count)
            .map(|i| center.offset(0.0, (i as f32 - half) * FORMATION_SPACING))
            .collect(),
        // Slot 0 at the tip, then alternating right/left one row back.
        FormationType::Wedge => (0..count)
            .map(|i| {
                let row = i.div_ceil(2) as f32;
                let side = if i % 2 == 1 { 1.0 } else { -1.0 };
                center.offset(side * row * FORMATION_SPACING, row * FORMATION_SPACING)
            })
            .collect(),
    }
}
