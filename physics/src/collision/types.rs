/*!
Core collision types and math aliases shared by the collision submodules.

This module contains box arithmetic only. It defines the data types exchanged between:
- obstacles (sources answering "what is solid near this region" queries)
- sweep (per-axis clipping, depenetration and step-up)
- the decomposer/adapter pipeline that produces static boxes from meshes
- the character integrator

Conventions
- Units are world units (one voxel = 1.0). +Y is up.
- Boxes are closed volumes, but overlap tests are strict: two boxes that only touch along a face
  do not overlap. This is what lets an actor stand on (and walk across) a floor whose top face is
  exactly at its feet.
*/

use nalgebra as na;

use super::settings::CONTACT_EPS;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;

/// A world axis, used to drive the per-axis sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index into a `Vec3`.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// The two axes perpendicular to `self`.
    #[inline]
    pub const fn others(self) -> (Axis, Axis) {
        match self {
            Axis::X => (Axis::Y, Axis::Z),
            Axis::Y => (Axis::X, Axis::Z),
            Axis::Z => (Axis::X, Axis::Y),
        }
    }

    /// A vector of length `len` along this axis.
    #[inline]
    pub fn vector(self, len: f32) -> Vec3 {
        let mut v = Vec3::zeros();
        v[self.index()] = len;
        v
    }
}

/// Axis-aligned box with `min <= max` on every axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Build a box from two opposite corners in any order.
    #[inline]
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.inf(&b),
            max: a.sup(&b),
        }
    }

    #[inline]
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let h = half_extents.abs();
        Self {
            min: center - h,
            max: center + h,
        }
    }

    /// Actor-style box: feet at `y`, centered on `x`/`z`, `width` across X and Z.
    #[inline]
    pub fn from_feet(x: f32, y: f32, z: f32, width: f32, height: f32) -> Self {
        let half = width.abs() * 0.5;
        Self {
            min: Vec3::new(x - half, y, z - half),
            max: Vec3::new(x + half, y + height.abs(), z + half),
        }
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Full size along each axis.
    #[inline]
    pub fn extents(&self) -> Vec3 {
        self.max - self.min
    }

    #[inline]
    pub fn half_extents(&self) -> Vec3 {
        self.extents() * 0.5
    }

    #[inline]
    pub fn volume(&self) -> f32 {
        let e = self.extents();
        e.x * e.y * e.z
    }

    #[inline]
    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Smallest box containing both `self` and `other`.
    #[inline]
    pub fn union(&self, other: &Aabb) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Grow (or shrink, for negative values) by `margin` on every side.
    #[inline]
    pub fn inflated(&self, margin: f32) -> Self {
        let m = Vec3::repeat(margin);
        Self::new(self.min - m, self.max + m)
    }

    /// The volume covered while translating from the current position by `motion`.
    #[inline]
    pub fn swept(&self, motion: Vec3) -> Self {
        self.union(&self.translated(motion))
    }

    /// Strict interval overlap on a single axis (touching faces do not overlap).
    #[inline]
    pub fn overlaps_on(&self, other: &Aabb, axis: Axis) -> bool {
        let i = axis.index();
        self.min[i] < other.max[i] - CONTACT_EPS && self.max[i] > other.min[i] + CONTACT_EPS
    }

    /// Strict volume overlap.
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        Axis::ALL.iter().all(|&a| self.overlaps_on(other, a))
    }

    /// Signed interval overlap on `axis` (negative when separated).
    #[inline]
    pub fn overlap_depth(&self, other: &Aabb, axis: Axis) -> f32 {
        let i = axis.index();
        self.max[i].min(other.max[i]) - self.min[i].max(other.min[i])
    }

    /// Inclusive point containment.
    #[inline]
    pub fn contains_point(&self, p: &Vec3) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] && p[i] <= self.max[i])
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.min.iter().chain(self.max.iter()).all(|v| v.is_finite())
    }
}

/// Oriented box: a rotated cuboid given by center, half-extents and rotation.
///
/// Decomposition emits these with identity rotation; the rotation slot carries the pose of
/// rotated authored geometry (e.g. CSG blocks) through the adapter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obb {
    pub center: Vec3,
    pub half_extents: Vec3,
    pub rotation: Quat,
}

impl Obb {
    #[inline]
    pub fn new(center: Vec3, half_extents: Vec3, rotation: Quat) -> Self {
        Self {
            center,
            half_extents: half_extents.abs(),
            rotation,
        }
    }

    #[inline]
    pub fn axis_aligned(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(center, half_extents, Quat::identity())
    }

    #[inline]
    pub fn from_aabb(aabb: &Aabb) -> Self {
        Self::axis_aligned(aabb.center(), aabb.half_extents())
    }

    /// World-space corners, in no particular winding.
    pub fn corners(&self) -> [Vec3; 8] {
        let h = self.half_extents;
        let mut out = [Vec3::zeros(); 8];
        for (i, corner) in out.iter_mut().enumerate() {
            let sx = if i & 1 == 0 { -h.x } else { h.x };
            let sy = if i & 2 == 0 { -h.y } else { h.y };
            let sz = if i & 4 == 0 { -h.z } else { h.z };
            *corner = self.center + self.rotation * Vec3::new(sx, sy, sz);
        }
        out
    }

    /// Tight axis-aligned bounds of the rotated box.
    pub fn aabb(&self) -> Aabb {
        let corners = self.corners();
        let mut min = corners[0];
        let mut max = corners[0];
        for c in &corners[1..] {
            min = min.inf(c);
            max = max.sup(c);
        }
        Aabb { min, max }
    }

    #[inline]
    pub fn volume(&self) -> f32 {
        8.0 * self.half_extents.x * self.half_extents.y * self.half_extents.z
    }
}

/// Result of one swept resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovementResult {
    /// Displacement actually applied to the mover (includes any depenetration push and step rise).
    pub displacement: Vec3,
    /// The requested horizontal movement was blocked at the start height.
    ///
    /// This stays set when a step-up then succeeded; a failed step-up is a normal negative result.
    pub has_collision: bool,
    /// The horizontal path that was finally chosen is blocked on X or Z.
    pub colliding_horizontally: bool,
    /// Per-axis clip flags for the chosen path.
    pub hit_x: bool,
    /// The vertical move was clipped. A step-up rise alone does not set this.
    pub hit_y: bool,
    pub hit_z: bool,
    /// A downward move was stopped by a surface (the mover is standing on something).
    pub landed: bool,
    /// The step-up path was taken.
    pub stepped: bool,
}

impl MovementResult {
    /// Movement applied in full with nothing in the way.
    #[inline]
    pub fn unobstructed(displacement: Vec3) -> Self {
        Self {
            displacement,
            has_collision: false,
            colliding_horizontally: false,
            hit_x: false,
            hit_y: false,
            hit_z: false,
            landed: false,
            stepped: false,
        }
    }
}
