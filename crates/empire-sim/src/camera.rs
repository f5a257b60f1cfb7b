//! Camera controller: orbit pose updates and the world↔screen transform.
//!
//! Screen coordinates are pixels with the origin at the top-left corner and
//! y growing downward. The pose is stored in the entity store; everything
//! here is a function of `CameraState`.

use glam::{Mat4, Vec2, Vec3};

use empire_core::camera::CameraState;
use empire_core::constants::*;
use empire_core::types::Position;

/// A ray in world space. `direction` is unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance along the ray to the horizontal plane `y = plane_y`.
    pub fn intersect_plane_y(&self, plane_y: f32) -> Option<f32> {
        if self.direction.y.abs() < 1e-6 {
            return None;
        }
        let t = (plane_y - self.origin.y) / self.direction.y;
        (t >= 0.0).then_some(t)
    }

    /// Distance along the ray to the first intersection with a sphere.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.length_squared() - radius * radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let sqrt_disc = disc.sqrt();
        let near = -b - sqrt_disc;
        if near >= 0.0 {
            return Some(near);
        }
        // Origin inside the sphere.
        let far = -b + sqrt_disc;
        (far >= 0.0).then_some(far)
    }
}

/// Unit vector from the look-at target toward the eye.
fn orbit_direction(rotation: f32, elevation: f32) -> Vec3 {
    Vec3::new(
        elevation.cos() * rotation.sin(),
        elevation.sin(),
        elevation.cos() * rotation.cos(),
    )
}

/// Recompute `position` from target, zoom, rotation and elevation.
pub fn sync_position(camera: &mut CameraState) {
    let distance = CAMERA_BASE_DISTANCE / camera.zoom.max(f32::EPSILON);
    let eye = camera.target.to_vec3() + orbit_direction(camera.rotation, camera.elevation) * distance;
    camera.position = Position::from_vec3(eye);
}

pub fn view_matrix(camera: &CameraState) -> Mat4 {
    Mat4::look_at_rh(camera.position.to_vec3(), camera.target.to_vec3(), Vec3::Y)
}

pub fn projection_matrix(camera: &CameraState) -> Mat4 {
    let viewport = &camera.viewport;
    let aspect = viewport.width / viewport.height.max(1.0);
    Mat4::perspective_rh_gl(viewport.fov_y, aspect, CAMERA_NEAR, CAMERA_FAR)
}

pub fn view_projection(camera: &CameraState) -> Mat4 {
    projection_matrix(camera) * view_matrix(camera)
}

/// Project a world position to screen pixels. `None` when the point is
/// behind the camera or outside the view frustum.
pub fn world_to_screen(camera: &CameraState, pos: &Position) -> Option<Vec2> {
    let clip = view_projection(camera) * pos.to_vec3().extend(1.0);
    if clip.w <= 0.0 {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    if ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 || ndc.z.abs() > 1.0 {
        return None;
    }
    let viewport = &camera.viewport;
    Some(Vec2::new(
        (ndc.x + 1.0) * 0.5 * viewport.width,
        (1.0 - ndc.y) * 0.5 * viewport.height,
    ))
}

/// World-space ray through a screen pixel, starting on the near plane.
pub fn screen_ray(camera: &CameraState, screen: Vec2) -> Ray {
    let viewport = &camera.viewport;
    let ndc_x = 2.0 * screen.x / viewport.width.max(1.0) - 1.0;
    let ndc_y = 1.0 - 2.0 * screen.y / viewport.height.max(1.0);

    let inverse = view_projection(camera).inverse();
    let near = inverse.project_point3(Vec3::new(ndc_x, ndc_y, -1.0));
    let far = inverse.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));

    Ray {
        origin: near,
        direction: (far - near).normalize_or_zero(),
    }
}

/// Where the ray through `screen` meets the plane `y = plane_y`.
pub fn screen_to_world(camera: &CameraState, screen: Vec2, plane_y: f32) -> Option<Position> {
    let ray = screen_ray(camera, screen);
    let t = ray.intersect_plane_y(plane_y)?;
    Some(Position::from_vec3(ray.at(t)))
}

/// Move the look-at target on the ground plane, relative to the current
/// heading: `dx` is screen-right, `dz` is screen-down.
pub fn pan(camera: &mut CameraState, dx: f32, dz: f32) {
    if !dx.is_finite() || !dz.is_finite() {
        return;
    }
    let (sin, cos) = camera.rotation.sin_cos();
    let right = Vec3::new(cos, 0.0, -sin);
    let back = Vec3::new(sin, 0.0, cos);
    let target = camera.target.to_vec3() + right * dx + back * dz;
    camera.target = Position::from_vec3(target);
    sync_position(camera);
}

/// Multiply the zoom level, clamped to the allowed range.
pub fn zoom_by(camera: &mut CameraState, factor: f32) {
    if !factor.is_finite() || factor <= 0.0 {
        return;
    }
    camera.zoom = (camera.zoom * factor).clamp(CAMERA_MIN_ZOOM, CAMERA_MAX_ZOOM);
    sync_position(camera);
}

/// Nudge the orbit targets; `update` eases the pose toward them.
pub fn orbit(camera: &mut CameraState, rotation: f32, elevation: f32) {
    if rotation.is_finite() {
        camera.rotation_target += rotation;
    }
    if elevation.is_finite() {
        camera.elevation_target = (camera.elevation_target + elevation)
            .clamp(CAMERA_MIN_ELEVATION, CAMERA_MAX_ELEVATION);
    }
}

pub fn resize(camera: &mut CameraState, width: f32, height: f32) {
    if width > 0.0 && height > 0.0 {
        camera.viewport.width = width;
        camera.viewport.height = height;
    }
}

/// Ease rotation and elevation toward their targets.
pub fn update(camera: &mut CameraState, dt: f32) {
    let blend = 1.0 - (-CAMERA_SMOOTHING * dt.max(0.0)).exp();
    camera.rotation += (camera.rotation_target - camera.rotation) * blend;
    camera.elevation += (camera.elevation_target - camera.elevation) * blend;
    camera.elevation = camera
        .elevation
        .clamp(CAMERA_MIN_ELEVATION, CAMERA_MAX_ELEVATION);
    sync_position(camera);
}
