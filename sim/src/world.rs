//! Static world geometry.
//!
//! This module is responsible for:
//! - Placing decomposed models into the world (adapter boxes per instance).
//! - Layering those boxes over the voxel terrain behind one [`ObstacleSource`].
//! - Exporting everything as native collider definitions for hosts that also run Rapier.
//!
//! Design notes
//! - The world is built once, then frozen behind an `Arc` and shared read-only by every tick
//!   worker. Runtime edits mean building a new world and swapping the `Arc`.
//! - Determinism: placements keep insertion order and voxel boxes come out in cell order, so
//!   exported collider ids are stable for the same build sequence.

use std::sync::Arc;

use physics::{
    Aabb, EnclosingLimits, ModelTransform, ObstacleSource, StaticBoxes, VoxelGrid,
    WorldStaticDef, collision::overlaps_closed, enclosing_box, static_defs_from_boxes,
};

use crate::{error::SimError, library::ModelLibrary};

/// One model instance in the world.
#[derive(Clone, Debug)]
pub struct PlacedModel {
    pub model_id: String,
    pub transform: ModelTransform,
    /// World-space collision boxes.
    pub boxes: StaticBoxes,
    /// Size-clamped bounds of `boxes`, for coarse interest culling.
    pub enclosing: Aabb,
}

/// Placed models plus voxel terrain.
#[derive(Clone, Debug, Default)]
pub struct StaticWorld {
    models: Vec<PlacedModel>,
    voxels: VoxelGrid,
    limits: EnclosingLimits,
}

impl StaticWorld {
    pub fn new(voxels: VoxelGrid) -> Self {
        Self {
            voxels,
            ..Self::default()
        }
    }

    pub fn with_limits(mut self, limits: EnclosingLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Place an instance of a model already decomposed in `library`.
    pub fn place(
        &mut self,
        library: &ModelLibrary,
        model_id: &str,
        transform: ModelTransform,
    ) -> Result<&PlacedModel, SimError> {
        let model = library
            .get(model_id)
            .ok_or_else(|| SimError::UnknownModel(model_id.to_owned()))?;
        if !transform.is_finite() {
            return Err(SimError::InvalidPlacement(model_id.to_owned()));
        }

        let boxes = transform.apply(&model.boxes);
        let enclosing = enclosing_box(&boxes, &self.limits).unwrap_or_else(|| {
            Aabb::from_center_half_extents(transform.translation, Default::default())
        });
        log::debug!(
            "Placed `{model_id}` at {:?} with {} boxes",
            transform.translation,
            boxes.len()
        );

        let index = self.models.len();
        self.models.push(PlacedModel {
            model_id: model_id.to_owned(),
            transform,
            boxes: StaticBoxes::new(boxes),
            enclosing,
        });
        Ok(&self.models[index])
    }

    #[inline]
    pub fn models(&self) -> &[PlacedModel] {
        &self.models
    }

    #[inline]
    pub fn voxels(&self) -> &VoxelGrid {
        &self.voxels
    }

    #[inline]
    pub fn voxels_mut(&mut self) -> &mut VoxelGrid {
        &mut self.voxels
    }

    /// Placements whose enclosing box touches `region`.
    pub fn models_near<'a>(&'a self, region: &'a Aabb) -> impl Iterator<Item = &'a PlacedModel> {
        self.models
            .iter()
            .filter(move |m| overlaps_closed(&m.enclosing, region))
    }

    /// Freeze for sharing across tick workers.
    pub fn into_shared(self) -> Arc<Self> {
        log::info!(
            "Static world ready: {} models, {} voxels",
            self.models.len(),
            self.voxels.len()
        );
        Arc::new(self)
    }

    /// Native collider definitions for every model box, then every voxel, with ids from 0.
    pub fn to_static_defs(&self) -> Vec<WorldStaticDef> {
        let model_boxes = self.models.iter().flat_map(|m| m.boxes.boxes().iter().copied());
        let all: Vec<Aabb> = model_boxes.chain(self.voxels.solid_boxes()).collect();
        static_defs_from_boxes(0, &all)
    }
}

impl ObstacleSource for StaticWorld {
    fn collect(&self, region: &Aabb, out: &mut Vec<Aabb>) {
        self.voxels.collect(region, out);
        for model in &self.models {
            model.boxes.collect(region, out);
        }
    }
}
