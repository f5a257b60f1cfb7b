//! A* shortest paths over the tile grid.
//!
//! 4-connected adjacency with a Manhattan heuristic (admissible because no
//! walkable tile costs less than 1.0). Expansion order is fully determined
//! by (f, h, insertion sequence), so identical queries return identical
//! paths.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use empire_core::error::PathError;
use empire_core::types::Position;

use crate::grid::{TerrainGrid, TileCoord};

/// Neighbour offsets, in expansion order.
const NEIGHBORS: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

/// Cheapest walkable tile cost; scales the heuristic.
const MIN_TILE_COST: f32 = 1.0;

/// A route from start to goal.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    /// Start position, intermediate tile centres, goal position.
    pub waypoints: Vec<Position>,
    /// Tiles visited, start tile first.
    pub tiles: Vec<TileCoord>,
    /// Sum of entry costs of every tile after the first.
    pub cost: f32,
}

impl Path {
    /// Number of tile-to-tile steps.
    pub fn steps(&self) -> usize {
        self.tiles.len().saturating_sub(1)
    }
}

/// Open-set entry. Ordered so the max-heap pops the lowest f, then the
/// lowest h, then the earliest pushed.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    f: f32,
    h: f32,
    seq: u64,
    index: usize,
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.h.total_cmp(&self.h))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl TerrainGrid {
    /// Shortest path between two world positions.
    ///
    /// Fails with an explicit error rather than returning an empty or partial
    /// path when either end is off-grid or blocked, or no route exists.
    pub fn find_path(&self, start: &Position, goal: &Position) -> Result<Path, PathError> {
        let start_tile = self.world_to_tile(start).ok_or(PathError::OutOfBounds)?;
        let goal_tile = self.world_to_tile(goal).ok_or(PathError::OutOfBounds)?;

        let (tiles, cost) = self.find_tile_path(start_tile, goal_tile)?;

        let mut waypoints = Vec::with_capacity(tiles.len().max(2));
        waypoints.push(*start);
        if tiles.len() > 2 {
            for &coord in &tiles[1..tiles.len() - 1] {
                let center = self.tile_center(coord);
                waypoints.push(Position::new(center.x, goal.y, center.z));
            }
        }
        waypoints.push(*goal);

        Ok(Path {
            waypoints,
            tiles,
            cost,
        })
    }

    /// Shortest tile sequence from `start` to `goal` inclusive, with its cost.
    pub fn find_tile_path(
        &self,
        start: TileCoord,
        goal: TileCoord,
    ) -> Result<(Vec<TileCoord>, f32), PathError> {
        let start_idx = self.index(start).ok_or(PathError::OutOfBounds)?;
        let goal_idx = self.index(goal).ok_or(PathError::OutOfBounds)?;
        if !self.is_walkable(start) {
            return Err(PathError::StartBlocked(start.i, start.j));
        }
        if !self.is_walkable(goal) {
            return Err(PathError::GoalBlocked(goal.i, goal.j));
        }
        if start_idx == goal_idx {
            return Ok((vec![start], 0.0));
        }

        let n = self.tile_count();
        let mut g_score = vec![f32::INFINITY; n];
        let mut came_from: Vec<Option<usize>> = vec![None; n];
        let mut closed = vec![false; n];
        let mut open = BinaryHeap::new();
        let mut seq: u64 = 0;

        let heuristic = |coord: TileCoord| coord.manhattan(&goal) as f32 * MIN_TILE_COST;

        g_score[start_idx] = 0.0;
        let h0 = heuristic(start);
        open.push(Frontier {
            f: h0,
            h: h0,
            seq,
            index: start_idx,
        });

        // Each tile is closed at most once, so the loop is bounded by the
        // number of tiles plus the number of pushes (4 per closed tile).
        while let Some(node) = open.pop() {
            if closed[node.index] {
                continue;
            }
            if node.index == goal_idx {
                return Ok((self.reconstruct(&came_from, goal_idx), g_score[goal_idx]));
            }
            closed[node.index] = true;

            let current = self.coord_of(node.index);
            for (di, dj) in NEIGHBORS {
                let next = TileCoord::new(current.i + di, current.j + dj);
                let Some(next_idx) = self.index(next) else {
                    continue;
                };
                if closed[next_idx] {
                    continue;
                }
                let biome = self.biome(next);
                if !biome.is_walkable() {
                    continue;
                }
                let tentative = g_score[node.index] + biome.movement_cost();
                if tentative < g_score[next_idx] {
                    g_score[next_idx] = tentative;
                    came_from[next_idx] = Some(node.index);
                    seq += 1;
                    let h = heuristic(next);
                    open.push(Frontier {
                        f: tentative + h,
                        h,
                        seq,
                        index: next_idx,
                    });
                }
            }
        }

        Err(PathError::Unreachable)
    }

    fn reconstruct(&self, came_from: &[Option<usize>], goal_idx: usize) -> Vec<TileCoord> {
        let mut tiles = vec![self.coord_of(goal_idx)];
        let mut current = goal_idx;
        while let Some(prev) = came_from.get(current).copied().flatten() {
            tiles.push(self.coord_of(prev));
            current = prev;
        }
        tiles.reverse();
        tiles
    }
}
