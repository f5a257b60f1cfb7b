//! Procedural terrain: noise fields classified into biome bands.
//!
//! Generation is a pure function of `TerrainConfig`; the same config always
//! yields the same grid.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use tracing::debug;

use empire_core::config::TerrainConfig;
use empire_core::enums::Biome;

use crate::grid::{TerrainGrid, TileCoord};

/// Elevation below which tiles are water.
const WATER_LEVEL: f64 = -0.3;
/// Elevation band above water that becomes beach.
const SAND_LEVEL: f64 = -0.2;
/// Elevation above which rock shows through.
const STONE_LEVEL: f64 = 0.35;
/// Elevation above which tiles are impassable peaks.
const MOUNTAIN_LEVEL: f64 = 0.5;
/// Moisture above which lowland becomes forest.
const FOREST_MOISTURE: f64 = 0.25;

/// Map an (elevation, moisture) sample, both roughly in [-1, 1], to a biome.
pub fn classify_biome(elevation: f64, moisture: f64) -> Biome {
    if elevation < WATER_LEVEL {
        Biome::Water
    } else if elevation < SAND_LEVEL {
        Biome::Sand
    } else if elevation > MOUNTAIN_LEVEL {
        Biome::Mountain
    } else if elevation > STONE_LEVEL {
        Biome::Stone
    } else if moisture > FOREST_MOISTURE {
        Biome::Forest
    } else {
        Biome::Grass
    }
}

impl TerrainGrid {
    /// Generate terrain from two seeded fBm fields (elevation, moisture).
    /// Tiles whose centre lies within `clearing_radius` of the origin are
    /// always grass.
    pub fn generate(config: &TerrainConfig) -> Self {
        let elevation: Fbm<Perlin> = Fbm::new(config.seed)
            .set_octaves(3)
            .set_persistence(0.5)
            .set_lacunarity(2.0);
        let moisture: Fbm<Perlin> = Fbm::new(config.seed.wrapping_add(1))
            .set_octaves(2)
            .set_persistence(0.4)
            .set_lacunarity(2.0);

        // Sample positions come from tile centres, which need the grid's
        // geometry; build an all-grass grid first to reuse its mapping.
        let layout = TerrainGrid::from_fn(config.width, config.height, config.tile_size, |_, _| {
            Biome::Grass
        });
        let scale = config.noise_scale;

        let grid = TerrainGrid::from_fn(config.width, config.height, config.tile_size, |i, j| {
            let center = layout.tile_center(TileCoord::new(i, j));
            let dist = (center.x * center.x + center.z * center.z).sqrt();
            if dist < config.clearing_radius {
                return Biome::Grass;
            }
            let p = [f64::from(center.x) * scale, f64::from(center.z) * scale];
            classify_biome(elevation.get(p), moisture.get(p))
        });

        debug!(
            width = config.width,
            height = config.height,
            seed = config.seed,
            biomes = ?grid.biome_histogram(),
            "Terrain generated"
        );
        grid
    }
}
