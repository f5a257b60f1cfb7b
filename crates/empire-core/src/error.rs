//! Error types shared across the simulation crates.
//!
//! None of these are fatal to the frame loop: reference misses are logged
//! and dropped, path failures leave the agent idle, and config errors only
//! surface at startup.

use std::path::PathBuf;

use crate::ids::{AgentId, DragonId, PartyId, QuestId, QuestlineId, StructureId};

/// A store operation referenced an id that is not (or no longer) live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    #[error("dragon not found: {0}")]
    DragonNotFound(DragonId),

    #[error("structure not found: {0}")]
    StructureNotFound(StructureId),

    #[error("quest not found: {0}")]
    QuestNotFound(QuestId),

    #[error("questline not found: {0}")]
    QuestlineNotFound(QuestlineId),

    #[error("party not found: {0}")]
    PartyNotFound(PartyId),
}

/// Pathfinding failure. Callers treat every variant as "unreachable".
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("position outside the grid")]
    OutOfBounds,

    #[error("start tile ({0}, {1}) is not walkable")]
    StartBlocked(i32, i32),

    #[error("goal tile ({0}, {1}) is not walkable")]
    GoalBlocked(i32, i32),

    #[error("no walkable route between tiles")]
    Unreachable,
}

/// Configuration could not be loaded or failed validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
