//! Mapping from adapted collision boxes to Rapier colliders.
//!
//! Hosts that register static geometry with a Rapier scene convert boxes to
//! [`WorldStaticDef`]s here, then either build colliders directly with [`collider_from_def`] or
//! hand the whole list to [`RapierQueryWorld::build`](crate::rapier_world::RapierQueryWorld::build).

use rapier3d::{
    na::{Quaternion, UnitQuaternion},
    prelude::*,
};

use crate::collision::{Aabb, Obb, Quat, Vec3};

/// Canonical, schema-agnostic definition of an immutable world collider.
#[derive(Clone, Debug)]
pub struct WorldStaticDef {
    /// Stable unique identifier used to ensure deterministic insertion order.
    pub id: u32,
    /// World-space translation.
    pub translation: Vector<f32>,
    /// World-space rotation (unit quaternion).
    pub rotation: UnitQuaternion<f32>,
    /// Collider shape parameters.
    pub shape: ColliderShapeDef,
}

/// Supported static collider shapes.
#[derive(Clone, Debug)]
pub enum ColliderShapeDef {
    /// Infinite plane (half-space).
    ///
    /// This is represented by an offset along the plane normal.
    /// The plane normal is derived from the pose as `rotation * +Y`.
    Plane {
        /// Offset along the plane normal.
        offset_along_normal: f32,
    },

    /// Oriented cuboid with given half-extents.
    Cuboid { half_extents: Vector<f32> },
}

impl WorldStaticDef {
    /// Axis-aligned cuboid covering `aabb`.
    pub fn from_aabb(id: u32, aabb: &Aabb) -> Self {
        Self {
            id,
            translation: to_rapier_vector(&aabb.center()),
            rotation: UnitQuaternion::identity(),
            shape: ColliderShapeDef::Cuboid {
                half_extents: to_rapier_vector(&aabb.half_extents()),
            },
        }
    }

    /// Oriented cuboid matching `obb`, for rotated authored geometry.
    pub fn from_obb(id: u32, obb: &Obb) -> Self {
        Self {
            id,
            translation: to_rapier_vector(&obb.center),
            rotation: to_rapier_rotation(&obb.rotation),
            shape: ColliderShapeDef::Cuboid {
                half_extents: to_rapier_vector(&obb.half_extents),
            },
        }
    }

    /// Horizontal ground plane at height `y`.
    pub fn ground_plane(id: u32, y: f32) -> Self {
        Self {
            id,
            translation: vector![0.0, y, 0.0],
            rotation: UnitQuaternion::identity(),
            shape: ColliderShapeDef::Plane {
                offset_along_normal: 0.0,
            },
        }
    }
}

/// Definitions for a list of boxes, with ids counting up from `first_id`.
pub fn static_defs_from_boxes(first_id: u32, boxes: &[Aabb]) -> Vec<WorldStaticDef> {
    boxes
        .iter()
        .zip(first_id..)
        .map(|(b, id)| WorldStaticDef::from_aabb(id, b))
        .collect()
}

/// Build a Rapier collider from a `WorldStaticDef`.
///
/// This uses the pose stored on the rigid-body as the collider parent transform.
/// So the collider is created with identity local transform.
pub fn collider_from_def(def: &WorldStaticDef) -> Collider {
    match &def.shape {
        ColliderShapeDef::Plane {
            offset_along_normal,
        } => {
            // The parent body carries the pose, so the local normal is +Y and the world normal
            // is `rotation * +Y`. Only the extra offset along the normal is applied here.
            let halfspace = HalfSpace::new(Vector::y_axis());
            ColliderBuilder::new(SharedShape::new(halfspace))
                .translation(Vector::y() * *offset_along_normal)
                .user_data(u128::from(def.id))
                .build()
        }

        ColliderShapeDef::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
                .user_data(u128::from(def.id))
                .build()
        }
    }
}

/// Convert a collision-space vector into Rapier's vector type.
#[inline]
pub fn to_rapier_vector(v: &Vec3) -> Vector<f32> {
    vector![v.x, v.y, v.z]
}

#[inline]
fn to_rapier_rotation(q: &Quat) -> UnitQuaternion<f32> {
    let c = q.quaternion().coords;
    UnitQuaternion::new_normalize(Quaternion::new(c.w, c.x, c.y, c.z))
}
