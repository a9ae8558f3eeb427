//! Model collision library.
//!
//! Decomposes each model's collision mesh once and caches the local-space boxes by model id.
//! Placement into the world (rotation, scale, translation) happens later, per instance, in
//! [`StaticWorld`](crate::world::StaticWorld).
//!
//! The cache is an explicit value owned by the host. Decomposed data is immutable and shared
//! through `Arc`, so placed instances and worker threads read it without locking.

use std::{collections::HashMap, sync::Arc};

use physics::{
    Aabb, CollisionMesh, Obb, SurfaceOptions, decompose, decompose_surface,
};

use crate::{constants::MAX_MODEL_EXTENT, error::SimError};

/// How meshes are turned into boxes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DecomposeMode {
    /// Coarse grid over the mesh vertices (at most 5 cells per axis).
    Vertices,
    /// Cells crossed by triangles, merged into larger boxes.
    Surface(SurfaceOptions),
}

impl Default for DecomposeMode {
    fn default() -> Self {
        DecomposeMode::Surface(SurfaceOptions::default())
    }
}

/// Decomposed collision for one model, in model-local space.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelCollision {
    pub boxes: Vec<Obb>,
    /// Mesh bounds.
    pub bounds: Aabb,
}

/// Cache of decomposed models keyed by model id.
#[derive(Debug, Default)]
pub struct ModelLibrary {
    models: HashMap<String, Arc<ModelCollision>>,
    mode: DecomposeMode,
    max_extent: Option<f32>,
}

impl ModelLibrary {
    pub fn new(mode: DecomposeMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Override [`MAX_MODEL_EXTENT`].
    pub fn with_max_extent(mut self, max_extent: f32) -> Self {
        self.max_extent = Some(max_extent);
        self
    }

    #[inline]
    pub fn max_extent(&self) -> f32 {
        self.max_extent.unwrap_or(MAX_MODEL_EXTENT)
    }

    #[inline]
    pub fn mode(&self) -> DecomposeMode {
        self.mode
    }

    /// Decompose and cache `mesh` under `model_id`, or return the cached entry.
    ///
    /// Meshes that are empty or larger than the extent limit are rejected.
    pub fn insert(
        &mut self,
        model_id: &str,
        mesh: &CollisionMesh,
    ) -> Result<Arc<ModelCollision>, SimError> {
        if let Some(existing) = self.models.get(model_id) {
            return Ok(Arc::clone(existing));
        }

        let max_extent = self.max_extent();
        let bounds = match mesh.bounds() {
            Some(bounds) if mesh.is_reasonable(max_extent) => bounds,
            _ => {
                return Err(SimError::UnreasonableMesh {
                    model: model_id.to_owned(),
                    max_extent,
                });
            }
        };

        let boxes = match &self.mode {
            DecomposeMode::Vertices => decompose(mesh.vertices(), 3),
            DecomposeMode::Surface(options) => decompose_surface(mesh, options),
        };
        log::info!(
            "Decomposed model `{model_id}` into {} boxes ({} vertices)",
            boxes.len(),
            mesh.vertex_count()
        );

        let entry = Arc::new(ModelCollision { boxes, bounds });
        self.models.insert(model_id.to_owned(), Arc::clone(&entry));
        Ok(entry)
    }

    #[inline]
    pub fn get(&self, model_id: &str) -> Option<Arc<ModelCollision>> {
        self.models.get(model_id).cloned()
    }

    pub fn remove(&mut self, model_id: &str) -> Option<Arc<ModelCollision>> {
        self.models.remove(model_id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn clear(&mut self) {
        self.models.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use physics::Vec3;

    fn crate_mesh() -> CollisionMesh {
        CollisionMesh::cuboid(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn caches_by_model_id() {
        let mut library = ModelLibrary::new(DecomposeMode::Vertices);
        let first = library.insert("crate", &crate_mesh()).unwrap();
        // A different mesh under the same id returns the cached entry.
        let other = CollisionMesh::cuboid(Vec3::zeros(), Vec3::repeat(3.0));
        let second = library.insert("crate", &other).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(library.len(), 1);
        assert!(library.get("crate").is_some());
        assert!(library.remove("crate").is_some());
        assert!(library.is_empty());
    }

    #[test]
    fn vertex_mode_matches_decompose() {
        let mut library = ModelLibrary::new(DecomposeMode::Vertices);
        let mesh = crate_mesh();
        let entry = library.insert("crate", &mesh).unwrap();
        assert_eq!(entry.boxes, decompose(mesh.vertices(), 3));
        assert_eq!(entry.bounds, mesh.bounds().unwrap());
    }

    #[test]
    fn surface_mode_covers_the_mesh() {
        let mut library = ModelLibrary::default();
        let entry = library.insert("crate", &crate_mesh()).unwrap();
        assert!(!entry.boxes.is_empty());
        let covered = entry
            .boxes
            .iter()
            .map(|b| b.aabb())
            .reduce(|a, b| a.union(&b))
            .unwrap();
        assert!((covered.min - Vec3::zeros()).norm() < 1.0e-3);
        assert!((covered.max - Vec3::repeat(1.0)).norm() < 1.0e-3);
    }

    #[test]
    fn rejects_empty_and_oversized_meshes() {
        let mut library = ModelLibrary::default().with_max_extent(10.0);
        let empty = CollisionMesh::new(Vec::new(), Vec::new());
        assert!(matches!(
            library.insert("empty", &empty),
            Err(SimError::UnreasonableMesh { .. })
        ));

        let huge = CollisionMesh::cuboid(Vec3::zeros(), Vec3::repeat(50.0));
        assert_eq!(
            library.insert("huge", &huge).unwrap_err(),
            SimError::UnreasonableMesh {
                model: "huge".into(),
                max_extent: 10.0
            }
        );
        assert!(library.is_empty());
    }
}
