//! Camera pose shared between the store and the camera controller.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::types::Position;

/// Orbit camera pose. `rotation` and `elevation` ease toward their
/// `*_target` values each frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub position: Position,
    /// Look-at point on the ground.
    pub target: Position,
    pub zoom: f32,
    /// Azimuth around the vertical axis (radians).
    pub rotation: f32,
    /// Angle above the ground plane (radians).
    pub elevation: f32,
    pub rotation_target: f32,
    pub elevation_target: f32,
    pub viewport: Viewport,
}

/// Screen dimensions and lens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    /// Vertical field of view (radians).
    pub fov_y: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            fov_y: CAMERA_FOV_DEG.to_radians(),
        }
    }
}

impl Default for CameraState {
    fn default() -> Self {
        let elevation = CAMERA_DEFAULT_ELEVATION;
        Self {
            position: Position::new(
                0.0,
                elevation.sin() * CAMERA_BASE_DISTANCE,
                elevation.cos() * CAMERA_BASE_DISTANCE,
            ),
            target: Position::ORIGIN,
            zoom: 1.0,
            rotation: 0.0,
            elevation,
            rotation_target: 0.0,
            elevation_target: elevation,
            viewport: Viewport::default(),
        }
    }
}
