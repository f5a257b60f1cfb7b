//! Game loop systems that operate on the entity store each step.
//!
//! Systems are plain functions over `&mut EntityStore`. They keep no state
//! of their own beyond what the engine passes in, and never abort a step
//! because one entity holds a stale reference.

pub mod agent_combat;
pub mod cleanup;
pub mod dragons;
pub mod movement;
pub mod quests;
pub mod references;
pub mod snapshot;
pub mod spawner;
