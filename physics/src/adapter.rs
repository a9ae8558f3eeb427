//! Decomposed boxes -> world-space axis-aligned boxes.
//!
//! Decomposition output lives in a model's local space. The adapter applies the model's scale
//! and rotation and re-expresses each result as an [`Aabb`] whose bottom face sits at the rotated
//! box's lowest point, so the resolver can treat every piece of static geometry the same way.

use serde::{Deserialize, Serialize};

use crate::{
    collision::{Aabb, Obb, Quat, Vec3},
    constants::{MAX_ENCLOSING_EXTENT, MIN_ENCLOSING_EXTENT},
};

/// Per-axis size clamps for [`enclosing_box`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnclosingLimits {
    pub min_extent: f32,
    pub max_extent: f32,
}

impl Default for EnclosingLimits {
    fn default() -> Self {
        Self {
            min_extent: MIN_ENCLOSING_EXTENT,
            max_extent: MAX_ENCLOSING_EXTENT,
        }
    }
}

impl EnclosingLimits {
    #[inline]
    fn clamp(&self, extent: f32) -> f32 {
        let lo = self.min_extent.max(0.0);
        let hi = self.max_extent.max(lo);
        extent.max(lo).min(hi)
    }
}

/// Scale then rotate each box about the model origin and take its world-aligned bounds.
pub fn adapt(boxes: &[Obb], rotation: &Quat, scale: &Vec3) -> Vec<Aabb> {
    boxes
        .iter()
        .map(|b| {
            let center = rotation * b.center.component_mul(scale);
            let half = b.half_extents.component_mul(scale);
            Obb::new(center, half, rotation * b.rotation).aabb()
        })
        .collect()
}

/// Fold `boxes` into one bounding box for coarse culling.
///
/// Each extent is clamped to `limits`, keeping the folded box's center on every axis (so the
/// vertical middle stays where the geometry is). Returns `None` for an empty list.
pub fn enclosing_box(boxes: &[Aabb], limits: &EnclosingLimits) -> Option<Aabb> {
    let folded = boxes.iter().copied().reduce(|acc, b| acc.union(&b))?;
    let size = folded.extents().map(|e| limits.clamp(e));
    Some(Aabb::from_center_half_extents(folded.center(), size * 0.5))
}

/// Placement of a model instance in the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::repeat(1.0),
        }
    }
}

impl ModelTransform {
    pub fn at(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }

    /// Rotation about +Y, in degrees.
    pub fn with_yaw_deg(mut self, yaw_deg: f32) -> Self {
        self.rotation = Quat::from_axis_angle(&Vec3::y_axis(), yaw_deg.to_radians());
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// World-space boxes for a model's local decomposition.
    pub fn apply(&self, boxes: &[Obb]) -> Vec<Aabb> {
        adapt(boxes, &self.rotation, &self.scale)
            .into_iter()
            .map(|b| b.translated(self.translation))
            .collect()
    }

    pub fn is_finite(&self) -> bool {
        self.translation.iter().all(|v| v.is_finite())
            && self.scale.iter().all(|v| v.is_finite())
            && self.rotation.coords.iter().all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn unit_cell(center: Vec3) -> Obb {
        Obb::axis_aligned(center, Vec3::repeat(0.5))
    }

    #[test]
    fn identity_adapt_keeps_boxes() {
        let boxes = [unit_cell(Vec3::new(1.0, 0.5, 0.0))];
        let out = adapt(&boxes, &Quat::identity(), &Vec3::repeat(1.0));
        assert_eq!(out[0].min, Vec3::new(0.5, 0.0, -0.5));
        assert_eq!(out[0].max, Vec3::new(1.5, 1.0, 0.5));
    }

    #[test]
    fn scale_applies_to_center_and_extents() {
        let boxes = [unit_cell(Vec3::new(1.0, 0.5, 0.0))];
        let out = adapt(&boxes, &Quat::identity(), &Vec3::new(2.0, 3.0, 1.0));
        assert!((out[0].min.x - 1.0).abs() < 1.0e-6);
        assert!((out[0].max.x - 3.0).abs() < 1.0e-6);
        assert!(out[0].min.y.abs() < 1.0e-6);
        assert!((out[0].max.y - 3.0).abs() < 1.0e-6);
    }

    #[test]
    fn quarter_turn_swaps_footprint_and_keeps_floor() {
        let long = Obb::axis_aligned(Vec3::new(1.0, 0.25, 0.0), Vec3::new(1.0, 0.25, 0.1));
        let yaw = Quat::from_axis_angle(&Vec3::y_axis(), FRAC_PI_2);
        let out = adapt(&[long], &yaw, &Vec3::repeat(1.0))[0];
        let size = out.extents();
        assert!((size.x - 0.2).abs() < 1.0e-5);
        assert!((size.z - 2.0).abs() < 1.0e-5);
        assert!(out.min.y.abs() < 1.0e-6);
        // +X rotated a quarter turn about +Y lands on -Z.
        assert!((out.center().z + 1.0).abs() < 1.0e-5);
    }

    #[test]
    fn tilted_box_sits_on_its_lowest_corner() {
        let cube = unit_cell(Vec3::new(0.0, 0.5, 0.0));
        let roll = Quat::from_axis_angle(&Vec3::z_axis(), std::f32::consts::FRAC_PI_4);
        let out = adapt(&[cube], &roll, &Vec3::repeat(1.0))[0];
        let diag = std::f32::consts::SQRT_2 * 0.5;
        assert!((out.extents().y - 2.0 * diag).abs() < 1.0e-5);
        assert!(out.min.y <= 0.0);
    }

    #[test]
    fn enclosing_box_folds_and_clamps() {
        let limits = EnclosingLimits::default();
        assert!(enclosing_box(&[], &limits).is_none());

        let tiny = Aabb::new(Vec3::zeros(), Vec3::new(0.1, 0.1, 0.1));
        let e = enclosing_box(&[tiny], &limits).unwrap();
        assert!((e.extents().x - 0.25).abs() < 1.0e-6);
        assert!((e.center() - tiny.center()).norm() < 1.0e-6);

        let huge = Aabb::new(Vec3::new(-100.0, 0.0, 0.0), Vec3::new(100.0, 10.0, 1.0));
        let e = enclosing_box(&[huge, tiny], &limits).unwrap();
        assert!((e.extents().x - 64.0).abs() < 1.0e-4);
        assert!((e.extents().y - 10.0).abs() < 1.0e-5);
        assert!((e.center().y - 5.0).abs() < 1.0e-5);
    }

    #[test]
    fn inverted_limits_do_not_panic() {
        let limits = EnclosingLimits {
            min_extent: 5.0,
            max_extent: 1.0,
        };
        let b = Aabb::new(Vec3::zeros(), Vec3::repeat(1.0));
        let e = enclosing_box(&[b], &limits).unwrap();
        assert!((e.extents().x - 5.0).abs() < 1.0e-6);
    }

    #[test]
    fn limits_deserialize_with_defaults() {
        let limits: EnclosingLimits = serde_json::from_str(r#"{ "max_extent": 32.0 }"#).unwrap();
        assert_eq!(limits.max_extent, 32.0);
        assert_eq!(limits.min_extent, MIN_ENCLOSING_EXTENT);
    }

    #[test]
    fn model_transform_places_boxes() {
        let t = ModelTransform::at(Vec3::new(10.0, 2.0, -3.0)).with_yaw_deg(180.0);
        assert!(t.is_finite());
        let out = t.apply(&[unit_cell(Vec3::new(1.0, 0.5, 0.0))])[0];
        assert!((out.center().x - 9.0).abs() < 1.0e-5);
        assert!((out.min.y - 2.0).abs() < 1.0e-5);
        assert!((out.center().z + 3.0).abs() < 1.0e-5);
    }
}
