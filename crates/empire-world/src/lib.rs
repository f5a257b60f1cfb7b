//! World grid for Agents of Empire.
//!
//! Procedural biome terrain, tile queries and tile-grid pathfinding.

pub use empire_core as core;

pub mod grid;
pub mod pathfinding;
pub mod terrain;

// Re-export key types for convenience.
pub use grid::{TerrainGrid, Tile, TileCoord};
pub use pathfinding::Path;
pub use terrain::classify_biome;
