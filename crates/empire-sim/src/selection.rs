//! Selection system: turns pointer gestures into selection changes and
//! click / right-click outcomes.
//!
//! A gesture is an explicit state machine. `Down` starts a drag, `Move`
//! stretches the box, and `Up` either box-selects (when the box grew past
//! the size threshold) or resolves a click by ray-casting against the
//! scene. Right-clicks and hovers bypass the drag state entirely.
//!
//! The system only writes the store's selection slots. Orders that follow
//! from a gesture (move, assign, attack) are returned as `SelectionOutcome`s
//! for the engine to dispatch.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use empire_core::camera::CameraState;
use empire_core::constants::{
    AGENT_HIT_RADIUS, DRAGON_HIT_RADIUS, SELECTION_BOX_MIN_PX,
};
use empire_core::ids::{AgentId, DragonId, StructureId};
use empire_core::state::SelectionBox;
use empire_core::types::Position;

use crate::camera;
use crate::store::EntityStore;

/// Discrete input events, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PointerEvent {
    /// Primary button pressed. `additive` extends rather than replaces the
    /// selection (shift held).
    Down { x: f32, y: f32, additive: bool },
    Move { x: f32, y: f32 },
    Up { x: f32, y: f32 },
    RightClick { x: f32, y: f32 },
    Hover { x: f32, y: f32 },
    /// Abandon the current gesture (focus lost, escape pressed).
    Cancel,
}

/// Drag gesture state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        start: Vec2,
        current: Vec2,
        additive: bool,
    },
}

/// What a screen ray hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HitTarget {
    Agent(AgentId),
    Dragon(DragonId),
    Structure(StructureId),
    Ground(Position),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub target: HitTarget,
    /// Distance along the ray from the near plane.
    pub distance: f32,
}

/// Result of a gesture for the engine to act on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SelectionOutcome {
    /// Box selection finished with this many agents selected.
    AgentsSelected { count: usize },
    AgentClicked(AgentId),
    StructureClicked(StructureId),
    DragonClicked(DragonId),
    /// Left click on open ground: move the selection there.
    GroundClicked(Position),
    /// Right click on a structure: assign the selection to it.
    AssignToStructure(StructureId),
    /// Right click on a dragon: attack it with the selection.
    AttackDragon(DragonId),
    /// Right click on open ground.
    MoveTo(Position),
    /// Hovered entity changed; `None` when the pointer left all entities.
    HoverChanged(Option<HitTarget>),
}

fn box_exceeds_threshold(start: Vec2, current: Vec2) -> bool {
    let size = (current - start).abs();
    size.x >= SELECTION_BOX_MIN_PX || size.y >= SELECTION_BOX_MIN_PX
}

fn selection_box(start: Vec2, current: Vec2) -> SelectionBox {
    SelectionBox {
        active: box_exceeds_threshold(start, current),
        start_x: start.x,
        start_y: start.y,
        end_x: current.x,
        end_y: current.y,
    }
}

/// Drag state machine plus the currently hovered entity.
#[derive(Debug, Clone, Default)]
pub struct SelectionSystem {
    state: DragState,
    hovered: Option<HitTarget>,
}

impl SelectionSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn hovered(&self) -> Option<HitTarget> {
        self.hovered
    }

    /// Feed one pointer event. Mutates only the store's selection slots.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        store: &mut EntityStore,
    ) -> Option<SelectionOutcome> {
        match event {
            PointerEvent::Down { x, y, additive } => {
                // A new press overrides any stale gesture.
                let start = Vec2::new(x, y);
                self.state = DragState::Dragging {
                    start,
                    current: start,
                    additive,
                };
                store.set_selection_box(selection_box(start, start));
                None
            }
            PointerEvent::Move { x, y } => {
                if let DragState::Dragging { start, additive, .. } = self.state {
                    let current = Vec2::new(x, y);
                    self.state = DragState::Dragging {
                        start,
                        current,
                        additive,
                    };
                    store.set_selection_box(selection_box(start, current));
                }
                None
            }
            PointerEvent::Up { x, y } => {
                let DragState::Dragging {
                    start, additive, ..
                } = self.state
                else {
                    return None;
                };
                self.state = DragState::Idle;
                let current = Vec2::new(x, y);
                let drag_box = selection_box(start, current);
                store.set_selection_box(SelectionBox::default());

                if drag_box.active {
                    let ids = box_select(store, store.camera(), &drag_box);
                    let count = if additive {
                        store.add_to_selection(ids)
                    } else {
                        store.select(ids)
                    };
                    Some(SelectionOutcome::AgentsSelected { count })
                } else {
                    self.click(store, start, additive)
                }
            }
            PointerEvent::RightClick { x, y } => {
                let hit = hit_test(store, store.camera(), Vec2::new(x, y))?;
                match hit.target {
                    HitTarget::Structure(id) => Some(SelectionOutcome::AssignToStructure(id)),
                    HitTarget::Dragon(id) => Some(SelectionOutcome::AttackDragon(id)),
                    HitTarget::Ground(pos) => Some(SelectionOutcome::MoveTo(pos)),
                    // Right-clicking a unit does nothing.
                    HitTarget::Agent(_) => None,
                }
            }
            PointerEvent::Hover { x, y } => {
                let hovered = hit_test(store, store.camera(), Vec2::new(x, y))
                    .map(|hit| hit.target)
                    .filter(|target| !matches!(target, HitTarget::Ground(_)));
                if hovered == self.hovered {
                    return None;
                }
                self.hovered = hovered;
                Some(SelectionOutcome::HoverChanged(hovered))
            }
            PointerEvent::Cancel => {
                self.state = DragState::Idle;
                store.set_selection_box(SelectionBox::default());
                None
            }
        }
    }

    /// Resolve a sub-threshold drag as a click at `point`.
    fn click(
        &mut self,
        store: &mut EntityStore,
        point: Vec2,
        additive: bool,
    ) -> Option<SelectionOutcome> {
        let hit = hit_test(store, store.camera(), point)?;
        match hit.target {
            HitTarget::Agent(id) => {
                if additive {
                    store.add_to_selection([id]);
                } else {
                    store.select([id]);
                }
                Some(SelectionOutcome::AgentClicked(id))
            }
            HitTarget::Structure(id) => {
                // The hit came from the store, so the id is live.
                let _ = store.set_selected_structure(Some(id));
                Some(SelectionOutcome::StructureClicked(id))
            }
            HitTarget::Dragon(id) => Some(SelectionOutcome::DragonClicked(id)),
            HitTarget::Ground(pos) => Some(SelectionOutcome::GroundClicked(pos)),
        }
    }
}

/// Living agents whose projected position falls inside the box, in spawn
/// order. Depth plays no part.
pub fn box_select(store: &EntityStore, camera: &CameraState, drag_box: &SelectionBox) -> Vec<AgentId> {
    store
        .living_agents()
        .filter(|&id| {
            store
                .agent_position(id)
                .and_then(|pos| camera::world_to_screen(camera, &pos))
                .is_some_and(|screen| drag_box.contains(screen.x, screen.y))
        })
        .collect()
}

/// Cast a ray through `screen` and return the nearest hit. Agents, dragons
/// and structures are spheres; the ground is the plane `y = 0`. The
/// smallest ray distance wins; exact ties keep the earlier candidate in
/// the order agents, dragons, structures, ground.
pub fn hit_test(store: &EntityStore, camera: &CameraState, screen: Vec2) -> Option<Hit> {
    let ray = camera::screen_ray(camera, screen);
    let mut best: Option<Hit> = None;
    let mut consider = |target: HitTarget, distance: Option<f32>| {
        if let Some(distance) = distance {
            if best.is_none_or(|b| distance < b.distance) {
                best = Some(Hit { target, distance });
            }
        }
    };

    for id in store.living_agents() {
        if let Some(pos) = store.agent_position(id) {
            let center = pos.to_vec3() + Vec3::Y * AGENT_HIT_RADIUS;
            consider(HitTarget::Agent(id), ray.intersect_sphere(center, AGENT_HIT_RADIUS));
        }
    }
    for &id in store.dragon_ids() {
        if !store.is_dragon_alive(id) {
            continue;
        }
        if let Some(pos) = store.dragon_position(id) {
            consider(
                HitTarget::Dragon(id),
                ray.intersect_sphere(pos.to_vec3(), DRAGON_HIT_RADIUS),
            );
        }
    }
    for &id in store.structure_ids() {
        let Some(radius) = store.get_structure(id).map(|s| s.kind.footprint_radius()) else {
            continue;
        };
        if let Some(pos) = store.structure_position(id) {
            let center = pos.to_vec3() + Vec3::Y * radius;
            consider(HitTarget::Structure(id), ray.intersect_sphere(center, radius));
        }
    }
    if let Some(t) = ray.intersect_plane_y(0.0) {
        consider(HitTarget::Ground(Position::from_vec3(ray.at(t))), Some(t));
    }

    best
}
