/*!
Swept-resolver settings and tolerances.

These constants centralize the tolerances used by per-axis clipping, depenetration and
step-up. Keeping them together makes tuning easier and keeps behavior identical on every
caller (integrator, host tick, tests).

Notes
- Distances are in world units (one voxel = 1.0), time in seconds.
- Favor practical world-space tolerances over machine epsilon; positions are `f32`.
*/

/// Practical small distance for comparisons (world units).
/// A clipped axis only counts as a collision when it lost more than this.
pub const DIST_EPS: f32 = 1.0e-6;

/// Tolerance for strict box overlap tests.
/// Boxes closer than this along an axis are treated as touching, not overlapping.
pub const CONTACT_EPS: f32 = 1.0e-5;

/// Margin added around the swept mover when asking an obstacle source for candidates.
pub const QUERY_MARGIN: f32 = 0.25;

/// Extra distance the step-up pass drops below the start height when searching for a landing.
pub const STEP_DROP_EXTRA: f32 = 0.1;

/// Minimum horizontal gain (world units) for a step-up to replace the blocked result.
pub const STEP_MIN_GAIN: f32 = 1.0e-4;

/// Maximum push-out passes when the mover starts inside geometry.
pub const MAX_DEPENETRATION_ITERATIONS: usize = 6;

/// Extra separation added to each push-out so the mover ends up just outside the obstacle.
pub const DEPENETRATION_EPS: f32 = 1.0e-6;

/// How far below the feet [`is_supported`](super::sweep::is_supported) looks for ground.
pub const SUPPORT_PROBE_DISTANCE: f32 = 0.05;
