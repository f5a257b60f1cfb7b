//! Fundamental geometric and simulation types.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// 3D position in world space.
/// x = East, y = Up, z = South. The ground plane is y = 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each step).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl Position {
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn from_vec3(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }

    /// Straight-line distance to another position.
    pub fn distance_to(&self, other: &Position) -> f32 {
        self.to_vec3().distance(other.to_vec3())
    }

    /// Distance on the ground plane (ignoring height).
    pub fn horizontal_distance_to(&self, other: &Position) -> f32 {
        let dx = other.x - self.x;
        let dz = other.z - self.z;
        (dx * dx + dz * dz).sqrt()
    }

    /// Move toward `other` by at most `max_step`. Returns the new position
    /// and whether `other` was reached.
    pub fn step_toward(&self, other: &Position, max_step: f32) -> (Position, bool) {
        let from = self.to_vec3();
        let delta = other.to_vec3() - from;
        let dist = delta.length();
        if dist <= max_step || dist <= f32::EPSILON {
            return (*other, true);
        }
        (Self::from_vec3(from + delta / dist * max_step), false)
    }

    /// Offset on the ground plane.
    pub fn offset(&self, dx: f32, dz: f32) -> Position {
        Self::new(self.x + dx, self.y, self.z + dz)
    }
}

impl From<Vec3> for Position {
    fn from(v: Vec3) -> Self {
        Self::from_vec3(v)
    }
}

impl SimTime {
    /// Advance by one step of `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        self.tick += 1;
        self.elapsed_secs += dt;
    }
}
