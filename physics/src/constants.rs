/// Largest timestep (seconds) a single integrator step will simulate.
///
/// Longer frames are clamped rather than integrated, so a stalled caller cannot tunnel an actor
/// through thin geometry in one step.
pub const MAX_STEP_DT: f32 = 0.25;

/// Maximum look pitch in degrees (straight up / straight down).
pub const MAX_PITCH_DEG: f32 = 90.0;

/// Below this planar speed (units/s) the wish direction is treated as "no input".
pub const WISH_EPS: f32 = 1.0e-6;

/// Vertex-sampling decomposition: largest-dimension thresholds and the grid size used below each.
///
/// Meshes at or above the last threshold use [`MAX_VERTEX_GRID_DIVISIONS`].
pub const VERTEX_GRID_THRESHOLDS: [(f32, usize); 3] = [(1.0, 2), (2.0, 3), (4.0, 4)];

/// Grid size for meshes whose largest dimension is at least 4 units.
pub const MAX_VERTEX_GRID_DIVISIONS: usize = 5;

/// Extents at or below this are treated as flat (one cell along that axis).
pub const FLAT_EXTENT_EPS: f32 = 1.0e-6;

/// Surface decomposition: preferred cell edge length (world units).
pub const SURFACE_TARGET_CELL: f32 = 0.5;

/// Surface decomposition: hard cap on cells per axis.
pub const SURFACE_MAX_DIVISIONS: usize = 128;

/// Surface decomposition: merged boxes above this count fall back to vertex sampling.
pub const SURFACE_MAX_BOXES: usize = 8_000;

/// Padding added to each cell when testing it against triangles, so faces lying exactly on a
/// cell boundary still mark the cell.
pub const SURFACE_CELL_PADDING: f32 = 1.0e-4;

/// Default lower clamp for each enclosing-box extent.
pub const MIN_ENCLOSING_EXTENT: f32 = 0.25;

/// Default upper clamp for each enclosing-box extent.
pub const MAX_ENCLOSING_EXTENT: f32 = 64.0;
