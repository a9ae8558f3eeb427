//! Rapier-backed obstacle source for immutable world geometry.
//!
//! Builds an in-memory Rapier scene from static collider definitions and answers resolver
//! queries from the colliders' bounding boxes. Hosts that already keep their static world in
//! Rapier can feed it straight to the character integrator.
//!
//! Design goals
//! - Deterministic: given the same inputs (sorted by `id`), build identical in-memory sets.
//! - Immutable world: this builder assumes statics do not move after construction.
//!
//! Only each collider's AABB is reported, so rotated cuboids and tilted planes are seen as their
//! axis-aligned bounds.

// Re-export Rapier so downstream crates can use Rapier types without depending on `rapier3d`.
pub use rapier3d;

use rapier3d::{na::Translation3, prelude::*};

use crate::{
    collision::{Aabb, ObstacleSource, Vec3},
    rapier::{WorldStaticDef, collider_from_def},
};

/// Half-size used for the box standing in for an upward-facing half-space.
const HALF_SPACE_SPAN: f32 = 1.0e6;

/// Static bodies and their colliders.
pub struct RapierQueryWorld {
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
}

impl RapierQueryWorld {
    /// Build a query world from a list of static collider definitions.
    ///
    /// Determinism
    /// - The input is sorted by `id` before insertion.
    /// - Any NaN/invalid values should be filtered/validated by the caller.
    pub fn build(mut defs: Vec<WorldStaticDef>) -> Self {
        // Ensure deterministic insertion order.
        defs.sort_by_key(|d| d.id);

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        // Each static is a fixed rigid-body carrying the pose, with the collider attached at
        // identity.
        for def in defs.into_iter() {
            let iso = Isometry::from_parts(Translation3::from(def.translation), def.rotation);

            let rb = RigidBodyBuilder::fixed().pose(iso).build();
            let rb_handle = bodies.insert(rb);

            let collider = collider_from_def(&def);
            colliders.insert_with_parent(collider, rb_handle, &mut bodies);
        }

        log::debug!("Built Rapier query world with {} colliders", colliders.len());
        Self { bodies, colliders }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }
}

/// Linear in the number of colliders: every collider's bounds are tested on each query. Fine for
/// the small static sets this is built from; larger worlds should layer a spatial index (or a
/// [`VoxelGrid`](crate::voxel::VoxelGrid)) in front.
impl ObstacleSource for RapierQueryWorld {
    fn collect(&self, region: &Aabb, out: &mut Vec<Aabb>) {
        for (_, collider) in self.colliders.iter() {
            let aabb = collider_bounds(collider);
            if crate::collision::obstacles::overlaps_closed(&aabb, region) {
                out.push(aabb);
            }
        }
    }
}

/// World bounds of one collider.
///
/// Ground half-spaces get an explicit slab ending exactly at the plane height; Rapier's own
/// bounds for them are too large to keep the height precise.
fn collider_bounds(collider: &Collider) -> Aabb {
    if let Some(half_space) = collider.shape().as_halfspace() {
        let normal = collider.rotation() * half_space.normal.into_inner();
        if normal.y >= 1.0 - 1.0e-6 {
            let top = collider.translation().y;
            return Aabb {
                min: Vec3::new(-HALF_SPACE_SPAN, top - HALF_SPACE_SPAN, -HALF_SPACE_SPAN),
                max: Vec3::new(HALF_SPACE_SPAN, top, HALF_SPACE_SPAN),
            };
        }
    }
    let bounds = collider.compute_aabb();
    Aabb {
        min: Vec3::new(bounds.mins.x, bounds.mins.y, bounds.mins.z),
        max: Vec3::new(bounds.maxs.x, bounds.maxs.y, bounds.maxs.z),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        collision::{Obb, Quat, resolve},
        rapier::static_defs_from_boxes,
    };

    #[test]
    fn boxes_round_trip_through_colliders() {
        let wall = Aabb::new(Vec3::new(0.35, 0.0, -1.0), Vec3::new(1.0, 2.0, 1.0));
        let world = RapierQueryWorld::build(static_defs_from_boxes(7, &[wall]));
        assert_eq!(world.len(), 1);

        let hits = world.query(&Aabb::from_feet(0.0, 0.0, 0.0, 0.6, 1.8).inflated(0.25));
        assert_eq!(hits.len(), 1);
        assert!((hits[0].min - wall.min).norm() < 1.0e-4);
        assert!((hits[0].max - wall.max).norm() < 1.0e-4);

        let far = Aabb::from_feet(50.0, 0.0, 0.0, 0.6, 1.8);
        assert!(world.query(&far).is_empty());
    }

    #[test]
    fn resolver_clips_against_rapier_world() {
        let wall = Aabb::new(Vec3::new(0.35, 0.0, -1.0), Vec3::new(1.0, 2.0, 1.0));
        let world = RapierQueryWorld::build(static_defs_from_boxes(0, &[wall]));
        let res = resolve(
            &Aabb::from_feet(0.0, 0.0, 0.0, 0.6, 1.8),
            Vec3::new(1.0, 0.0, 0.0),
            &world,
            0.0,
        );
        assert!(res.displacement.x <= 0.051);
        assert!(res.has_collision);
    }

    #[test]
    fn ground_plane_supports_actor() {
        let world = RapierQueryWorld::build(vec![WorldStaticDef::ground_plane(0, 1.0)]);
        let res = resolve(
            &Aabb::from_feet(0.0, 1.5, 0.0, 0.6, 1.8),
            Vec3::new(0.0, -2.0, 0.0),
            &world,
            0.0,
        );
        assert!((res.displacement.y + 0.5).abs() < 1.0e-4);
        assert!(res.landed);
    }

    #[test]
    fn rotated_cuboid_reports_its_bounds() {
        let obb = Obb::new(
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.1),
            Quat::from_axis_angle(&Vec3::y_axis(), std::f32::consts::FRAC_PI_2),
        );
        let world = RapierQueryWorld::build(vec![WorldStaticDef::from_obb(0, &obb)]);
        let hits = world.query(&Aabb::new(Vec3::repeat(-5.0), Vec3::repeat(5.0)));
        assert_eq!(hits.len(), 1);
        let size = hits[0].extents();
        assert!((size.x - 0.2).abs() < 1.0e-3);
        assert!((size.z - 2.0).abs() < 1.0e-3);
    }
}
