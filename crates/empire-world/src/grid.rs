//! TerrainGrid: the static tile lattice with biome queries.

use empire_core::enums::Biome;
use empire_core::types::Position;

/// Integer tile coordinates. `i` runs along world x, `j` along world z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileCoord {
    pub i: i32,
    pub j: i32,
}

impl TileCoord {
    pub const fn new(i: i32, j: i32) -> Self {
        Self { i, j }
    }

    pub fn manhattan(&self, other: &TileCoord) -> u32 {
        self.i.abs_diff(other.i) + self.j.abs_diff(other.j)
    }
}

/// One grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    pub coord: TileCoord,
    pub biome: Biome,
    pub walkable: bool,
    /// Cost multiplier for entering this tile.
    pub cost: f32,
}

/// The tile lattice, centred on the world origin.
///
/// Biomes are fixed after construction; there is no API to change them.
#[derive(Debug, Clone)]
pub struct TerrainGrid {
    width: u32,
    height: u32,
    tile_size: f32,
    /// Row-major (`j * width + i`).
    biomes: Vec<Biome>,
}

impl TerrainGrid {
    /// Build a grid by evaluating `biome_fn(i, j)` for every tile.
    pub fn from_fn(
        width: u32,
        height: u32,
        tile_size: f32,
        mut biome_fn: impl FnMut(i32, i32) -> Biome,
    ) -> Self {
        let mut biomes = Vec::with_capacity(width as usize * height as usize);
        for j in 0..height as i32 {
            for i in 0..width as i32 {
                biomes.push(biome_fn(i, j));
            }
        }
        Self {
            width,
            height,
            tile_size,
            biomes,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn tile_count(&self) -> usize {
        self.biomes.len()
    }

    /// World x/z of the grid's minimum corner.
    fn origin(&self) -> (f32, f32) {
        (
            -(self.width as f32 * self.tile_size) / 2.0,
            -(self.height as f32 * self.tile_size) / 2.0,
        )
    }

    pub fn in_bounds(&self, coord: TileCoord) -> bool {
        coord.i >= 0 && coord.j >= 0 && coord.i < self.width as i32 && coord.j < self.height as i32
    }

    pub(crate) fn index(&self, coord: TileCoord) -> Option<usize> {
        if !self.in_bounds(coord) {
            return None;
        }
        Some(coord.j as usize * self.width as usize + coord.i as usize)
    }

    pub(crate) fn coord_of(&self, index: usize) -> TileCoord {
        let w = self.width as usize;
        TileCoord::new((index % w) as i32, (index / w) as i32)
    }

    /// Tile containing a world position, or None outside the grid.
    pub fn world_to_tile(&self, pos: &Position) -> Option<TileCoord> {
        let (ox, oz) = self.origin();
        let fi = (pos.x - ox) / self.tile_size;
        let fj = (pos.z - oz) / self.tile_size;
        if !fi.is_finite() || !fj.is_finite() {
            return None;
        }
        let coord = TileCoord::new(fi.floor() as i32, fj.floor() as i32);
        self.in_bounds(coord).then_some(coord)
    }

    /// World position of a tile's centre on the ground plane.
    pub fn tile_center(&self, coord: TileCoord) -> Position {
        let (ox, oz) = self.origin();
        Position::new(
            ox + (coord.i as f32 + 0.5) * self.tile_size,
            0.0,
            oz + (coord.j as f32 + 0.5) * self.tile_size,
        )
    }

    /// Biome of a tile; `Biome::Unknown` outside the grid.
    pub fn biome(&self, coord: TileCoord) -> Biome {
        self.index(coord)
            .and_then(|idx| self.biomes.get(idx).copied())
            .unwrap_or(Biome::Unknown)
    }

    pub fn tile(&self, coord: TileCoord) -> Option<Tile> {
        let idx = self.index(coord)?;
        let biome = *self.biomes.get(idx)?;
        Some(Tile {
            coord,
            biome,
            walkable: biome.is_walkable(),
            cost: biome.movement_cost(),
        })
    }

    /// Biome of the tile containing `pos`. Fails closed to `Biome::Unknown`.
    pub fn biome_at_position(&self, pos: &Position) -> Biome {
        self.world_to_tile(pos)
            .map_or(Biome::Unknown, |coord| self.biome(coord))
    }

    pub fn is_walkable(&self, coord: TileCoord) -> bool {
        self.biome(coord).is_walkable()
    }

    pub fn is_walkable_at(&self, pos: &Position) -> bool {
        self.biome_at_position(pos).is_walkable()
    }

    /// Iterate all tiles in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        self.biomes.iter().enumerate().map(|(idx, &biome)| Tile {
            coord: self.coord_of(idx),
            biome,
            walkable: biome.is_walkable(),
            cost: biome.movement_cost(),
        })
    }

    /// Closest walkable tile centre to `pos`, searching square rings out to
    /// `max_radius` tiles. Ties resolve to the first tile found in ring order.
    pub fn nearest_walkable(&self, pos: &Position, max_radius: u32) -> Option<Position> {
        let (ox, oz) = self.origin();
        let ci = ((pos.x - ox) / self.tile_size).floor() as i32;
        let cj = ((pos.z - oz) / self.tile_size).floor() as i32;

        for r in 0..=max_radius as i32 {
            let mut best: Option<(f32, TileCoord)> = None;
            for dj in -r..=r {
                for di in -r..=r {
                    if di.abs() != r && dj.abs() != r {
                        continue;
                    }
                    let coord = TileCoord::new(ci + di, cj + dj);
                    if !self.is_walkable(coord) {
                        continue;
                    }
                    let d = self.tile_center(coord).horizontal_distance_to(pos);
                    if best.is_none_or(|(bd, _)| d < bd) {
                        best = Some((d, coord));
                    }
                }
            }
            if let Some((_, coord)) = best {
                return Some(self.tile_center(coord));
            }
        }
        None
    }

    /// Biome counts, for logging and tests.
    pub fn biome_histogram(&self) -> Vec<(Biome, usize)> {
        let mut counts: Vec<(Biome, usize)> = Vec::new();
        for &biome in &self.biomes {
            match counts.iter_mut().find(|(b, _)| *b == biome) {
                Some((_, n)) => *n += 1,
                None => counts.push((biome, 1)),
            }
        }
        counts
    }
}
