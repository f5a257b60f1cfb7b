//! Simulation constants and default tuning parameters.
//!
//! Anything a scenario may want to change is mirrored in `config` and read
//! from there at runtime; these are the defaults.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 30;

// --- Terrain ---

pub const DEFAULT_GRID_WIDTH: u32 = 64;
pub const DEFAULT_GRID_HEIGHT: u32 = 64;

/// World units per tile edge.
pub const DEFAULT_TILE_SIZE: f32 = 1.0;

/// Noise frequency in cycles per world unit.
pub const DEFAULT_NOISE_SCALE: f64 = 0.06;

/// Radius around the origin forced to grass so the starting area is open.
pub const DEFAULT_CLEARING_RADIUS: f32 = 8.0;

// --- Agents ---

/// Agent walking speed (world units per second).
pub const AGENT_SPEED: f32 = 4.0;

/// Distance at which an agent counts as having reached its target.
pub const ARRIVAL_EPSILON: f32 = 0.1;

pub const AGENT_MAX_HEALTH: f32 = 100.0;

/// Sphere radius for agent picking.
pub const AGENT_HIT_RADIUS: f32 = 0.5;

pub const AGENT_ATTACK_RANGE: f32 = 1.5;
pub const AGENT_ATTACK_DAMAGE: f32 = 8.0;
pub const AGENT_ATTACK_INTERVAL_SECS: f32 = 1.0;

/// Seconds a dead agent stays in the world before removal.
pub const CORPSE_LINGER_SECS: f64 = 3.0;

// --- Dragons ---

/// Sphere radius for dragon picking.
pub const DRAGON_HIT_RADIUS: f32 = 1.5;

/// Radius of the patrol circle around a dragon's home.
pub const DRAGON_PATROL_RADIUS: f32 = 4.0;

/// Dragons fly; their position sits this far above the ground.
pub const DRAGON_FLIGHT_HEIGHT: f32 = 3.0;

// --- Game loop ---

/// Longest frame delta `advance` will integrate in one step (seconds).
pub const MAX_FRAME_DT: f64 = 1.0;

// --- Formations ---

/// Radial formation radius = max(FORMATION_MIN_RADIUS, sqrt(n) * FORMATION_RADIUS_PER_SQRT).
pub const FORMATION_MIN_RADIUS: f32 = 1.0;
pub const FORMATION_RADIUS_PER_SQRT: f32 = 0.5;

/// Spacing between members in line, wedge and column formations.
pub const FORMATION_SPACING: f32 = 1.0;

// --- Selection ---

/// Minimum drag extent (pixels) before a drag becomes a selection box.
pub const SELECTION_BOX_MIN_PX: f32 = 5.0;

// --- Camera ---

pub const CAMERA_FOV_DEG: f32 = 50.0;

/// Orbit distance at zoom 1.0.
pub const CAMERA_BASE_DISTANCE: f32 = 30.0;

pub const CAMERA_DEFAULT_ELEVATION: f32 = 1.1;
pub const CAMERA_MIN_ELEVATION: f32 = 0.25;
pub const CAMERA_MAX_ELEVATION: f32 = 1.45;
pub const CAMERA_MIN_ZOOM: f32 = 0.5;
pub const CAMERA_MAX_ZOOM: f32 = 4.0;

/// Exponential easing rate for rotation/elevation smoothing (1/s).
pub const CAMERA_SMOOTHING: f32 = 8.0;

pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 500.0;

// --- Snapshots ---

/// Cap on connection lines exported per snapshot.
pub const MAX_CONNECTIONS: usize = 100;
