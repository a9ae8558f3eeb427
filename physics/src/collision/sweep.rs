//! Swept per-axis resolver with depenetration and step-up.
//!
//! Pipeline for one call to [`resolve`]:
//! 1. Ask the obstacle source once for everything near the swept (and step-raised) mover.
//! 2. Push the mover out of anything it already overlaps ([`depenetrate`]).
//! 3. Clip X, then Z at the start height, then Y from wherever the horizontal pass ended.
//! 4. If the horizontal pass was blocked and a step height is offered, retry it raised
//!    (up, across, down) and keep it only when it both gains ground and lands on something.
//!
//! Horizontal-then-vertical ordering means a grounded actor is blocked by a wall at the height
//! it stands at, even when gravity would otherwise pull it below the wall's base this tick.

use super::{
    obstacles::ObstacleSource,
    settings::{
        DEPENETRATION_EPS, DIST_EPS, MAX_DEPENETRATION_ITERATIONS, QUERY_MARGIN, STEP_DROP_EXTRA,
        STEP_MIN_GAIN, SUPPORT_PROBE_DISTANCE,
    },
    types::{Aabb, Axis, MovementResult, Vec3},
};

/// Compute how much of `movement` the `mover` can apply against `obstacles`.
///
/// `step_height <= 0` disables the step-up pass. The returned displacement is relative to the
/// mover's original position and includes any depenetration push.
pub fn resolve<O: ObstacleSource + ?Sized>(
    mover: &Aabb,
    movement: Vec3,
    obstacles: &O,
    step_height: f32,
) -> MovementResult {
    let step_height = if step_height.is_finite() {
        step_height.max(0.0)
    } else {
        0.0
    };

    let horizontal = Vec3::new(movement.x, 0.0, movement.z);
    let mut region = mover.swept(movement);
    if step_height > 0.0 {
        let raised = mover.translated(Vec3::new(0.0, step_height, 0.0));
        region = region.union(&raised.swept(horizontal));
    }
    let region = region.inflated(QUERY_MARGIN);

    let mut boxes = obstacles.query(&region);
    let before = boxes.len();
    boxes.retain(Aabb::is_finite);
    if boxes.len() != before {
        log::warn!(
            "Dropped {} non-finite obstacle box(es) from query",
            before - boxes.len()
        );
    }

    resolve_against(mover, movement, &boxes, step_height)
}

/// Same as [`resolve`] but against an already-gathered candidate list.
pub fn resolve_against(
    mover: &Aabb,
    movement: Vec3,
    boxes: &[Aabb],
    step_height: f32,
) -> MovementResult {
    let start = depenetrate(mover, boxes);
    let push = start.min - mover.min;
    if movement == Vec3::zeros() {
        return MovementResult::unobstructed(push);
    }

    let base = sweep_horizontal(&start, movement.x, movement.z, boxes);
    let blocked = base.hit_x || base.hit_z;

    let mut chosen = base;
    let mut stepped = false;
    if blocked && step_height > 0.0 {
        if let Some(step) = try_step_up(&start, movement.x, movement.z, boxes, step_height, &base)
        {
            log::trace!(
                "Step-up accepted: rise {:.3}, gain {:.3}",
                step.dy,
                step.planar_len() - base.planar_len()
            );
            chosen = step;
            stepped = true;
        }
    }

    let after_horizontal = start.translated(Vec3::new(chosen.dx, chosen.dy, chosen.dz));
    let dy = clip_axis(&after_horizontal, Axis::Y, movement.y, boxes);
    let hit_y = (movement.y - dy).abs() > DIST_EPS;
    let landed = (hit_y && movement.y < 0.0) || (stepped && movement.y <= 0.0);

    MovementResult {
        displacement: push + Vec3::new(chosen.dx, chosen.dy + dy, chosen.dz),
        has_collision: blocked,
        colliding_horizontally: chosen.hit_x || chosen.hit_z,
        hit_x: chosen.hit_x,
        hit_y,
        hit_z: chosen.hit_z,
        landed,
        stepped,
    }
}

/// Largest part of `delta` along `axis` that `mover` can travel without entering any box.
///
/// Only boxes overlapping the mover on both other axes can block. The result has the same sign
/// as `delta` and never exceeds it in magnitude; a box already touching the mover clips to zero.
pub fn clip_axis(mover: &Aabb, axis: Axis, delta: f32, boxes: &[Aabb]) -> f32 {
    if delta == 0.0 || !delta.is_finite() {
        return 0.0;
    }
    let i = axis.index();
    let (a, b) = axis.others();
    let mut clipped = delta;

    for c in boxes {
        if !mover.overlaps_on(c, a) || !mover.overlaps_on(c, b) {
            continue;
        }
        if delta > 0.0 {
            let gap = c.min[i] - mover.max[i];
            if gap >= -DIST_EPS && gap < clipped {
                clipped = gap.max(0.0);
            }
        } else {
            let gap = c.max[i] - mover.min[i];
            if gap <= DIST_EPS && gap > clipped {
                clipped = gap.min(0.0);
            }
        }
    }
    clipped
}

/// Push `mover` out of any box it overlaps, along each box's shallowest axis.
///
/// Each pass applies the largest single push found; passes repeat until nothing overlaps or the
/// iteration budget runs out. Boxes that only touch the mover are left alone.
pub fn depenetrate(mover: &Aabb, boxes: &[Aabb]) -> Aabb {
    let mut current = *mover;
    for _ in 0..MAX_DEPENETRATION_ITERATIONS {
        let mut best: Option<Vec3> = None;
        for c in boxes {
            if !current.intersects(c) {
                continue;
            }
            let (axis, depth) = Axis::ALL
                .iter()
                .map(|&axis| (axis, current.overlap_depth(c, axis)))
                .fold((Axis::X, f32::INFINITY), |acc, cand| {
                    if cand.1 < acc.1 { cand } else { acc }
                });
            if depth <= 0.0 {
                continue;
            }

            let i = axis.index();
            let sign = if current.center()[i] < c.center()[i] {
                -1.0
            } else {
                1.0
            };
            let push = axis.vector(sign * (depth + DEPENETRATION_EPS));
            if best.is_none_or(|b| push.norm_squared() > b.norm_squared()) {
                best = Some(push);
            }
        }

        match best {
            Some(push) => current = current.translated(push),
            None => break,
        }
    }
    current
}

/// True when something solid sits within a short probe below the mover's feet.
pub fn is_supported(mover: &Aabb, boxes: &[Aabb]) -> bool {
    let drop = clip_axis(mover, Axis::Y, -SUPPORT_PROBE_DISTANCE, boxes);
    drop > -SUPPORT_PROBE_DISTANCE + DIST_EPS
}

/// Horizontal part of a resolution path (start-height pass or stepped pass).
#[derive(Clone, Copy, Debug)]
struct Planar {
    dx: f32,
    dy: f32,
    dz: f32,
    hit_x: bool,
    hit_z: bool,
}

impl Planar {
    #[inline]
    fn planar_len(&self) -> f32 {
        (self.dx * self.dx + self.dz * self.dz).sqrt()
    }
}

fn sweep_horizontal(start: &Aabb, dx: f32, dz: f32, boxes: &[Aabb]) -> Planar {
    let allowed_x = clip_axis(start, Axis::X, dx, boxes);
    let moved = start.translated(Vec3::new(allowed_x, 0.0, 0.0));
    let allowed_z = clip_axis(&moved, Axis::Z, dz, boxes);

    Planar {
        dx: allowed_x,
        dy: 0.0,
        dz: allowed_z,
        hit_x: (dx - allowed_x).abs() > DIST_EPS,
        hit_z: (dz - allowed_z).abs() > DIST_EPS,
    }
}

/// Up, across, down. Returns the stepped path only if it lands and beats `base`.
fn try_step_up(
    start: &Aabb,
    dx: f32,
    dz: f32,
    boxes: &[Aabb],
    step_height: f32,
    base: &Planar,
) -> Option<Planar> {
    let lift = clip_axis(start, Axis::Y, step_height, boxes);
    if lift <= DIST_EPS {
        return None;
    }
    let raised = start.translated(Vec3::new(0.0, lift, 0.0));
    let across = sweep_horizontal(&raised, dx, dz, boxes);
    if across.planar_len() <= base.planar_len() + STEP_MIN_GAIN {
        return None;
    }

    let forward = raised.translated(Vec3::new(across.dx, 0.0, across.dz));
    let drop_request = -(lift + STEP_DROP_EXTRA);
    let drop = clip_axis(&forward, Axis::Y, drop_request, boxes);
    let landed = drop > drop_request + DIST_EPS;
    if !landed {
        return None;
    }

    Some(Planar {
        dy: lift + drop,
        ..across
    })
}
