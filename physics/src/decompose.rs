//! Mesh-to-box decomposition.
//!
//! Two strategies, both producing identity-rotation [`Obb`]s in the mesh's local space:
//! - [`decompose`]: cheap vertex sampling on a small adaptive grid (2..=5 cells per axis).
//!   Conservative and coarse; a cell is solid if any vertex falls inside it.
//! - [`decompose_surface`]: exact triangle-vs-cell tests on a finer grid, followed by greedy
//!   merging of occupied cells into larger boxes.
//!
//! Both fall back to a single box covering the mesh bounds when nothing is marked.

use std::collections::BTreeSet;

use rapier3d::na as rna;
use rapier3d::parry::{
    query,
    shape::{Cuboid, Triangle},
};

use crate::{
    collision::{Aabb, Obb, Vec3},
    constants::{
        FLAT_EXTENT_EPS, MAX_VERTEX_GRID_DIVISIONS, SURFACE_CELL_PADDING, SURFACE_MAX_BOXES,
        SURFACE_MAX_DIVISIONS, SURFACE_TARGET_CELL, VERTEX_GRID_THRESHOLDS,
    },
    mesh::{CollisionMesh, bounds_of},
};

/// Grid size for a mesh whose largest dimension is `largest`.
pub fn subdivisions_for(largest: f32) -> usize {
    VERTEX_GRID_THRESHOLDS
        .iter()
        .find(|(limit, _)| largest < *limit)
        .map(|(_, d)| *d)
        .unwrap_or(MAX_VERTEX_GRID_DIVISIONS)
}

/// Occupied cells of a vertex-sampled grid over a mesh's bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct Occupancy {
    pub bounds: Aabb,
    /// Cells per axis. Flat axes collapse to a single cell.
    pub divisions: [usize; 3],
    /// `[ix, iy, iz]` of every cell containing at least one vertex.
    pub cells: BTreeSet<[usize; 3]>,
}

impl Occupancy {
    /// Edge length of one cell along each axis.
    pub fn cell_size(&self) -> Vec3 {
        let e = self.bounds.extents();
        Vec3::new(
            e.x / self.divisions[0] as f32,
            e.y / self.divisions[1] as f32,
            e.z / self.divisions[2] as f32,
        )
    }

    /// World box of one cell.
    pub fn cell_box(&self, cell: [usize; 3]) -> Aabb {
        let size = self.cell_size();
        let min = self.bounds.min
            + Vec3::new(
                cell[0] as f32 * size.x,
                cell[1] as f32 * size.y,
                cell[2] as f32 * size.z,
            );
        Aabb {
            min,
            max: min + size,
        }
    }
}

/// Sample a strided vertex buffer onto the adaptive grid.
///
/// Returns `None` when the buffer holds no complete finite vertex. Cells are half-open with the
/// last cell on each axis closed, so every vertex marks exactly one cell.
pub fn occupancy(vertices: &[f32], stride: usize) -> Option<Occupancy> {
    let bounds = bounds_of(vertices, stride)?;
    let extents = bounds.extents();
    let d = subdivisions_for(extents.max());
    let divisions = [0, 1, 2].map(|i| if extents[i] > FLAT_EXTENT_EPS { d } else { 1 });

    let mut cells = BTreeSet::new();
    for v in vertices.chunks_exact(stride) {
        let p = Vec3::new(v[0], v[1], v[2]);
        if !p.iter().all(|c| c.is_finite()) {
            continue;
        }
        let cell = [0, 1, 2].map(|i| cell_index(p[i], bounds.min[i], extents[i], divisions[i]));
        cells.insert(cell);
    }

    Some(Occupancy {
        bounds,
        divisions,
        cells,
    })
}

/// Vertex-sampling decomposition into one box per occupied cell.
///
/// An empty or undersized buffer (or `stride < 3`) yields no boxes.
pub fn decompose(vertices: &[f32], stride: usize) -> Vec<Obb> {
    let Some(grid) = occupancy(vertices, stride) else {
        return Vec::new();
    };

    if grid.cells.is_empty() {
        log::debug!("Vertex decomposition found no occupied cells; using bounds");
        return vec![Obb::from_aabb(&grid.bounds)];
    }

    let boxes: Vec<Obb> = grid
        .cells
        .iter()
        .map(|&cell| Obb::from_aabb(&grid.cell_box(cell)))
        .collect();
    log::debug!(
        "Vertex decomposition: {:?} divisions, {} boxes",
        grid.divisions,
        boxes.len()
    );
    boxes
}

/// Tuning for [`decompose_surface`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceOptions {
    /// Preferred cell edge length.
    pub target_cell: f32,
    /// Upper bound on cells per axis.
    pub max_divisions: usize,
    /// Merged box count above which vertex sampling is used instead.
    pub max_boxes: usize,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            target_cell: SURFACE_TARGET_CELL,
            max_divisions: SURFACE_MAX_DIVISIONS,
            max_boxes: SURFACE_MAX_BOXES,
        }
    }
}

/// Surface decomposition: mark every grid cell crossed by a triangle, then merge runs.
///
/// The result hugs the mesh surface (hollow shells stay hollow). Degenerate meshes fall back to
/// their bounds; an empty mesh yields no boxes.
pub fn decompose_surface(mesh: &CollisionMesh, options: &SurfaceOptions) -> Vec<Obb> {
    let Some(bounds) = mesh.bounds() else {
        return Vec::new();
    };
    let extents = bounds.extents();
    let target = if options.target_cell > 0.0 {
        options.target_cell
    } else {
        SURFACE_TARGET_CELL
    };
    let max_div = options.max_divisions.max(1);
    let divisions = [0, 1, 2].map(|i| {
        if extents[i] > FLAT_EXTENT_EPS {
            ((extents[i] / target).ceil() as usize).clamp(1, max_div)
        } else {
            1
        }
    });
    let cell = Vec3::new(
        extents.x / divisions[0] as f32,
        extents.y / divisions[1] as f32,
        extents.z / divisions[2] as f32,
    );
    let grid = Grid { divisions };
    let mut occupied = vec![false; grid.len()];

    let half = (cell * 0.5).add_scalar(SURFACE_CELL_PADDING);
    let cuboid = Cuboid::new(rna::Vector3::new(half.x, half.y, half.z));
    let identity = rna::Isometry3::identity();

    for tri in mesh.triangles() {
        let shape = Triangle::new(to_point(tri[0]), to_point(tri[1]), to_point(tri[2]));
        let tmin = tri[0].inf(&tri[1]).inf(&tri[2]);
        let tmax = tri[0].sup(&tri[1]).sup(&tri[2]);
        // One cell of slack on each side; the exact test below filters.
        let lo = [0, 1, 2].map(|i| {
            cell_index(tmin[i], bounds.min[i], extents[i], divisions[i]).saturating_sub(1)
        });
        let hi = [0, 1, 2].map(|i| {
            (cell_index(tmax[i], bounds.min[i], extents[i], divisions[i]) + 1)
                .min(divisions[i] - 1)
        });

        for y in lo[1]..=hi[1] {
            for z in lo[2]..=hi[2] {
                for x in lo[0]..=hi[0] {
                    let idx = grid.index(x, y, z);
                    if occupied[idx] {
                        continue;
                    }
                    let center = bounds.min
                        + Vec3::new(
                            (x as f32 + 0.5) * cell.x,
                            (y as f32 + 0.5) * cell.y,
                            (z as f32 + 0.5) * cell.z,
                        );
                    let cell_iso = rna::Isometry3::translation(center.x, center.y, center.z);
                    // Unsupported shape pairs count as hits.
                    occupied[idx] =
                        query::intersection_test(&identity, &shape, &cell_iso, &cuboid)
                            .unwrap_or(true);
                }
            }
        }
    }

    let runs = grid.merge(&occupied);
    if runs.is_empty() {
        log::debug!("Surface decomposition marked no cells; using bounds");
        return vec![Obb::from_aabb(&bounds)];
    }
    if runs.len() > options.max_boxes {
        log::warn!(
            "Surface decomposition produced {} boxes (cap {}); falling back to vertex sampling",
            runs.len(),
            options.max_boxes
        );
        return decompose(mesh.vertices(), 3);
    }

    let boxes: Vec<Obb> = runs
        .iter()
        .map(|(start, end)| {
            let min = bounds.min
                + Vec3::new(
                    start[0] as f32 * cell.x,
                    start[1] as f32 * cell.y,
                    start[2] as f32 * cell.z,
                );
            let max = bounds.min
                + Vec3::new(
                    end[0] as f32 * cell.x,
                    end[1] as f32 * cell.y,
                    end[2] as f32 * cell.z,
                );
            Obb::from_aabb(&Aabb { min, max })
        })
        .collect();
    log::debug!(
        "Surface decomposition: {:?} divisions, {} cells, {} boxes",
        divisions,
        occupied.iter().filter(|o| **o).count(),
        boxes.len()
    );
    boxes
}

#[inline]
fn cell_index(value: f32, min: f32, extent: f32, divisions: usize) -> usize {
    if divisions <= 1 || extent <= FLAT_EXTENT_EPS {
        return 0;
    }
    let cell = extent / divisions as f32;
    let t = (value - min) / cell;
    (t.floor().max(0.0) as usize).min(divisions - 1)
}

#[inline]
fn to_point(v: Vec3) -> rna::Point3<f32> {
    rna::Point3::new(v.x, v.y, v.z)
}

/// Dense cell grid, X fastest, then Z, then Y.
struct Grid {
    divisions: [usize; 3],
}

impl Grid {
    #[inline]
    fn len(&self) -> usize {
        self.divisions.iter().product()
    }

    #[inline]
    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        let [nx, _, nz] = self.divisions;
        (y * nz + z) * nx + x
    }

    /// Greedy merge of occupied cells into disjoint boxes.
    ///
    /// Returns `(start, end)` cell ranges, end exclusive. Runs grow along X, then Z, then Y.
    fn merge(&self, occupied: &[bool]) -> Vec<([usize; 3], [usize; 3])> {
        let [nx, ny, nz] = self.divisions;
        let mut used = vec![false; occupied.len()];
        let free = |used: &[bool], x: usize, y: usize, z: usize| {
            let i = self.index(x, y, z);
            occupied[i] && !used[i]
        };
        let mut runs = Vec::new();

        for y in 0..ny {
            for z in 0..nz {
                for x in 0..nx {
                    if !free(&used, x, y, z) {
                        continue;
                    }

                    let mut x1 = x + 1;
                    while x1 < nx && free(&used, x1, y, z) {
                        x1 += 1;
                    }

                    let mut z1 = z + 1;
                    'grow_z: while z1 < nz {
                        for xx in x..x1 {
                            if !free(&used, xx, y, z1) {
                                break 'grow_z;
                            }
                        }
                        z1 += 1;
                    }

                    let mut y1 = y + 1;
                    'grow_y: while y1 < ny {
                        for zz in z..z1 {
                            for xx in x..x1 {
                                if !free(&used, xx, y1, zz) {
                                    break 'grow_y;
                                }
                            }
                        }
                        y1 += 1;
                    }

                    for yy in y..y1 {
                        for zz in z..z1 {
                            for xx in x..x1 {
                                used[self.index(xx, yy, zz)] = true;
                            }
                        }
                    }
                    runs.push(([x, y, z], [x1, y1, z1]));
                }
            }
        }
        runs
    }
}
