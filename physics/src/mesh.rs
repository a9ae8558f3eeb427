use crate::collision::{Aabb, Vec3};

/// Immutable triangle soup used as decomposition input.
///
/// `vertices` is a flat `[x, y, z, x, y, z, ...]` buffer (stride 3). `indices` holds three entries
/// per triangle; when it is empty the vertices are read as consecutive triangles.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollisionMesh {
    vertices: Vec<f32>,
    indices: Vec<u32>,
}

impl CollisionMesh {
    pub fn new(vertices: Vec<f32>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub fn from_positions(positions: &[Vec3], indices: Vec<u32>) -> Self {
        let vertices = positions.iter().flat_map(|p| [p.x, p.y, p.z]).collect();
        Self { vertices, indices }
    }

    /// Closed box mesh (12 triangles) between `min` and `max`.
    pub fn cuboid(min: Vec3, max: Vec3) -> Self {
        let b = Aabb::new(min, max);
        let corners: Vec<Vec3> = (0..8)
            .map(|i| {
                Vec3::new(
                    if i & 1 == 0 { b.min.x } else { b.max.x },
                    if i & 2 == 0 { b.min.y } else { b.max.y },
                    if i & 4 == 0 { b.min.z } else { b.max.z },
                )
            })
            .collect();
        #[rustfmt::skip]
        let indices = vec![
            0, 2, 1, 1, 2, 3, // -z
            4, 5, 6, 5, 7, 6, // +z
            0, 1, 4, 1, 5, 4, // -y
            2, 6, 3, 3, 6, 7, // +y
            0, 4, 2, 2, 4, 6, // -x
            1, 3, 5, 3, 7, 5, // +x
        ];
        Self::from_positions(&corners, indices)
    }

    #[inline]
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    #[inline]
    pub fn vertex(&self, i: usize) -> Option<Vec3> {
        let v = self.vertices.get(i * 3..i * 3 + 3)?;
        Some(Vec3::new(v[0], v[1], v[2]))
    }

    /// Triangles with all-finite corners. Out-of-range indices are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        let count = if self.indices.is_empty() {
            self.vertex_count() / 3
        } else {
            self.indices.len() / 3
        };
        (0..count).filter_map(move |t| {
            let corner = |k: usize| {
                let i = if self.indices.is_empty() {
                    t * 3 + k
                } else {
                    self.indices[t * 3 + k] as usize
                };
                self.vertex(i)
            };
            let tri = [corner(0)?, corner(1)?, corner(2)?];
            tri.iter()
                .all(|v| v.iter().all(|c| c.is_finite()))
                .then_some(tri)
        })
    }

    /// Bounds over all finite vertices, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<Aabb> {
        bounds_of(&self.vertices, 3)
    }

    /// Rejects meshes that are empty or larger than `max_extent` on any axis.
    pub fn is_reasonable(&self, max_extent: f32) -> bool {
        match self.bounds() {
            Some(b) => b.extents().iter().all(|e| *e <= max_extent),
            None => false,
        }
    }
}

/// Bounds of a strided vertex buffer, ignoring non-finite vertices.
pub(crate) fn bounds_of(vertices: &[f32], stride: usize) -> Option<Aabb> {
    if stride < 3 {
        return None;
    }
    vertices
        .chunks_exact(stride)
        .map(|v| Vec3::new(v[0], v[1], v[2]))
        .filter(|v| v.iter().all(|c| c.is_finite()))
        .fold(None, |acc: Option<Aabb>, v| match acc {
            Some(b) => Some(b.union(&Aabb { min: v, max: v })),
            None => Some(Aabb { min: v, max: v }),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuboid_mesh_has_twelve_triangles_within_bounds() {
        let mesh = CollisionMesh::cuboid(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 2.0, 1.0));
        let tris: Vec<_> = mesh.triangles().collect();
        assert_eq!(tris.len(), 12);
        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.min, Vec3::new(-1.0, 0.0, -1.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 2.0, 1.0));
        assert!(mesh.is_reasonable(8.0));
        assert!(!mesh.is_reasonable(1.5));
    }

    #[test]
    fn out_of_range_indices_are_skipped() {
        let mesh = CollisionMesh::new(vec![0.0; 9], vec![0, 1, 2, 0, 1, 9]);
        assert_eq!(mesh.triangles().count(), 1);
    }

    #[test]
    fn non_indexed_soup_is_read_in_threes() {
        let mesh = CollisionMesh::new((0..18).map(|v| v as f32).collect(), Vec::new());
        assert_eq!(mesh.triangles().count(), 2);
    }

    #[test]
    fn bounds_skip_non_finite_vertices() {
        let verts = vec![0.0, 0.0, 0.0, f32::NAN, 5.0, 5.0, 1.0, 1.0, 1.0];
        let b = bounds_of(&verts, 3).unwrap();
        assert_eq!(b.max, Vec3::new(1.0, 1.0, 1.0));
        assert!(bounds_of(&[], 3).is_none());
        assert!(CollisionMesh::default().bounds().is_none());
    }
}
