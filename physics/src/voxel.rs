//! Sparse voxel obstacle source.
//!
//! # Model
//! - Space is divided into cubic cells of edge `cell_size` (world units).
//! - A cell is addressed by integer coordinates `[cx, cy, cz]`, with
//!   `cx = floor(x / cell_size)` and likewise for y and z.
//! - A solid cell holds a local box in cell-relative fractions (`[0, 1]` per axis): a full cube
//!   is `[0,0,0]..[1,1,1]`, a bottom half slab is `[0,0,0]..[1,0.5,1]`.
//!
//! # Queries
//! A region query visits the cells the region covers when that is cheaper than scanning every
//! solid cell, and otherwise scans the solid cells. Either way results come out in cell order.

use std::collections::HashMap;

use crate::collision::{Aabb, ObstacleSource, Vec3, obstacles::overlaps_closed};

/// Integer cell coordinates.
pub type CellCoord = [i32; 3];

/// Sparse set of solid cells, each with its own collision shape.
#[derive(Clone, Debug)]
pub struct VoxelGrid {
    cell_size: f32,
    cells: HashMap<CellCoord, Aabb>,
}

impl Default for VoxelGrid {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl VoxelGrid {
    /// Empty grid. Non-positive or non-finite sizes fall back to unit cells.
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            log::warn!("Invalid voxel cell size {cell_size}, using 1.0");
            1.0
        };
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell containing world point `p`.
    #[inline]
    pub fn cell_of(&self, p: &Vec3) -> CellCoord {
        [
            (p.x / self.cell_size).floor() as i32,
            (p.y / self.cell_size).floor() as i32,
            (p.z / self.cell_size).floor() as i32,
        ]
    }

    /// Make `cell` a full solid cube.
    pub fn set_solid(&mut self, cell: CellCoord) {
        self.cells
            .insert(cell, Aabb::new(Vec3::zeros(), Vec3::repeat(1.0)));
    }

    /// Make `cell` solid with a partial shape given in cell-relative fractions.
    ///
    /// The shape is clamped to the cell. An empty or non-finite shape clears the cell instead.
    pub fn set_shape(&mut self, cell: CellCoord, local: Aabb) {
        let min = local.min.map(|v| v.clamp(0.0, 1.0));
        let max = local.max.map(|v| v.clamp(0.0, 1.0));
        let degenerate = !local.is_finite() || (max - min).iter().any(|&e| e <= 0.0);
        if degenerate {
            self.cells.remove(&cell);
            return;
        }
        self.cells.insert(cell, Aabb { min, max });
    }

    /// Bottom slab of `height` (fraction of a cell).
    pub fn set_slab(&mut self, cell: CellCoord, height: f32) {
        self.set_shape(
            cell,
            Aabb::new(Vec3::zeros(), Vec3::new(1.0, height, 1.0)),
        );
    }

    /// Clear `cell`. Returns whether it was solid.
    pub fn remove(&mut self, cell: CellCoord) -> bool {
        self.cells.remove(&cell).is_some()
    }

    #[inline]
    pub fn is_solid(&self, cell: CellCoord) -> bool {
        self.cells.contains_key(&cell)
    }

    /// World-space box of a solid cell.
    pub fn cell_box(&self, cell: CellCoord) -> Option<Aabb> {
        self.cells.get(&cell).map(|local| self.world_box(cell, local))
    }

    /// World boxes of every solid cell, in cell order (y, then z, then x).
    pub fn solid_boxes(&self) -> Vec<Aabb> {
        let mut cells: Vec<(&CellCoord, &Aabb)> = self.cells.iter().collect();
        cells.sort_by_key(|(cell, _)| [cell[1], cell[2], cell[0]]);
        cells
            .into_iter()
            .map(|(&cell, local)| self.world_box(cell, local))
            .collect()
    }

    #[inline]
    fn world_box(&self, cell: CellCoord, local: &Aabb) -> Aabb {
        let origin = Vec3::new(cell[0] as f32, cell[1] as f32, cell[2] as f32) * self.cell_size;
        Aabb {
            min: origin + local.min * self.cell_size,
            max: origin + local.max * self.cell_size,
        }
    }
}

impl ObstacleSource for VoxelGrid {
    fn collect(&self, region: &Aabb, out: &mut Vec<Aabb>) {
        if self.cells.is_empty() || !region.is_finite() {
            return;
        }
        let lo = self.cell_of(&region.min);
        let hi = self.cell_of(&region.max);
        // `None` when the covered cell count overflows, which always favors the scan.
        let span = (0..3)
            .map(|i| i64::from(hi[i]) - i64::from(lo[i]) + 1)
            .try_fold(1_i64, |acc, n| acc.checked_mul(n));

        if span.is_some_and(|span| span <= self.cells.len() as i64) {
            for cy in lo[1]..=hi[1] {
                for cz in lo[2]..=hi[2] {
                    for cx in lo[0]..=hi[0] {
                        let cell = [cx, cy, cz];
                        if let Some(b) = self.cell_box(cell) {
                            if overlaps_closed(&b, region) {
                                out.push(b);
                            }
                        }
                    }
                }
            }
        } else {
            let mut hits: Vec<(CellCoord, Aabb)> = self
                .cells
                .iter()
                .map(|(&cell, local)| (cell, self.world_box(cell, local)))
                .filter(|(_, b)| overlaps_closed(b, region))
                .collect();
            hits.sort_by_key(|(cell, _)| [cell[1], cell[2], cell[0]]);
            out.extend(hits.into_iter().map(|(_, b)| b));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        collision::resolve,
        integrator::{ActorInput, ActorState, PhysicsConfig, step},
    };

    fn flat_floor(grid: &mut VoxelGrid, half: i32) {
        for x in -half..=half {
            for z in -half..=half {
                grid.set_solid([x, -1, z]);
            }
        }
    }

    #[test]
    fn cell_mapping_floors_negative_coordinates() {
        let grid = VoxelGrid::default();
        assert_eq!(grid.cell_of(&Vec3::new(-0.5, 0.0, 1.999)), [-1, 0, 1]);
        let coarse = VoxelGrid::new(2.0);
        assert_eq!(coarse.cell_of(&Vec3::new(3.0, -0.1, 4.0)), [1, -1, 2]);
    }

    #[test]
    fn slab_and_shape_boxes() {
        let mut grid = VoxelGrid::new(2.0);
        grid.set_slab([1, 0, 0], 0.5);
        let b = grid.cell_box([1, 0, 0]).unwrap();
        assert_eq!(b.min, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(b.max, Vec3::new(4.0, 1.0, 2.0));

        grid.set_shape([0, 0, 0], Aabb::new(Vec3::zeros(), Vec3::new(1.0, 0.0, 1.0)));
        assert!(!grid.is_solid([0, 0, 0]));
        assert!(grid.remove([1, 0, 0]));
        assert!(grid.is_empty());
    }

    #[test]
    fn queries_agree_on_both_paths() {
        let mut grid = VoxelGrid::default();
        flat_floor(&mut grid, 3);
        grid.set_solid([0, 0, 2]);

        // Small region: visits covered cells.
        let small = Aabb::new(Vec3::new(-0.5, -0.5, -0.5), Vec3::new(0.5, 0.5, 0.5));
        let hits = grid.query(&small);
        assert_eq!(hits.len(), 4);

        // Huge region: scans solid cells.
        let huge = Aabb::new(Vec3::repeat(-100.0), Vec3::repeat(100.0));
        assert_eq!(grid.query(&huge), grid.solid_boxes());
    }

    #[test]
    fn extreme_regions_fall_back_to_the_scan() {
        let mut grid = VoxelGrid::default();
        flat_floor(&mut grid, 2);
        let vast = Aabb::new(Vec3::repeat(-1.0e10), Vec3::repeat(1.0e10));
        assert_eq!(grid.query(&vast), grid.solid_boxes());

        let mover = Aabb::from_feet(0.5, 0.0, 0.5, 0.6, 1.8);
        // Leaves the floor behind horizontally, so nothing clips the fall.
        let res = resolve(&mover, Vec3::new(3.0e9, -3.0e9, 3.0e9), &grid, 0.0);
        assert_eq!(res.displacement, Vec3::new(3.0e9, -3.0e9, 3.0e9));
        assert!(!res.has_collision);
        assert!(!res.landed);
    }

    #[test]
    fn actor_walks_along_voxel_floor() {
        let mut grid = VoxelGrid::default();
        flat_floor(&mut grid, 4);
        let mover = Aabb::from_feet(0.5, 0.0, 0.5, 0.6, 1.8);
        let res = resolve(&mover, Vec3::new(1.0, -0.1, 0.0), &grid, 0.6);
        assert!((res.displacement.x - 1.0).abs() < 1.0e-6);
        assert!(res.displacement.y.abs() < 1.0e-6);
        assert!(!res.has_collision);
        assert!(res.landed);
    }

    #[test]
    fn actor_steps_onto_slab() {
        let mut grid = VoxelGrid::default();
        flat_floor(&mut grid, 4);
        for x in 2..=4 {
            for z in -4..=4 {
                grid.set_slab([x, 0, z], 0.5);
            }
        }

        let config = PhysicsConfig::defaults();
        let input = ActorInput {
            seq: 1,
            forward: true,
            yaw: -90.0,
            ..Default::default()
        };
        let mut state = ActorState {
            on_ground: true,
            ..ActorState::at(0.5, 0.0, 0.5)
        };
        for _ in 0..12 {
            state = step(&state, &input, &config, &grid, 0.05);
        }
        assert!(state.x > 2.5);
        assert!((state.y - 0.5).abs() < 1.0e-3, "y = {}", state.y);
    }

    #[test]
    fn full_block_wall_blocks() {
        let mut grid = VoxelGrid::default();
        flat_floor(&mut grid, 4);
        for y in 0..2 {
            for z in -4..=4 {
                grid.set_solid([2, y, z]);
            }
        }
        let mover = Aabb::from_feet(1.5, 0.0, 0.5, 0.6, 1.8);
        let res = resolve(&mover, Vec3::new(1.0, 0.0, 0.0), &grid, 0.6);
        assert!(res.displacement.x <= 0.2 + 1.0e-5);
        assert!(res.colliding_horizontally);
        assert!(!res.stepped);
    }
}
