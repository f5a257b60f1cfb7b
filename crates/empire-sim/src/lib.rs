//! Simulation engine for Agents of Empire.
//!
//! Owns the entity store (a hecs world plus bookkeeping records), runs the
//! game loop systems, interprets pointer gestures and produces
//! `WorldSnapshot`s for an external renderer.

pub mod camera;
pub mod engine;
pub mod formation;
pub mod selection;
pub mod store;
pub mod systems;
pub mod world_setup;

pub use empire_core as core;
pub use engine::SimulationEngine;
pub use selection::{PointerEvent, SelectionOutcome};
pub use store::EntityStore;

#[cfg(test)]
mod tests;
