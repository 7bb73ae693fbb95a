//! Renderer-agnostic triangle mesh data.
//!
//! Meshes here are plain vertex/index buffers as they come out of a scene
//! file or a scene-building function. The renderer converts them into its
//! own intersectable meshes.

use flow_math::{Mat4, Vec3};
use thiserror::Error;

/// Structural problems with a mesh's index buffer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    #[error("index count {0} is not a multiple of 3")]
    IndexCount(usize),

    #[error("index {index} at position {position} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        position: usize,
        index: u32,
        vertex_count: usize,
    },
}

/// A mesh consisting of vertex positions and triangle indices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create a new mesh from positions and indices.
    ///
    /// The index buffer is not checked here; call [`Mesh::validate`].
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }

    /// A quad `a b c d` (in winding order) split into two triangles.
    ///
    /// The face normal follows `(b - a) x (c - a)`.
    pub fn quad(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Self {
        Self::new(vec![a, b, c, d], vec![0, 1, 2, 2, 3, 0])
    }

    /// Check the index buffer against the vertex buffer.
    pub fn validate(&self) -> Result<(), MeshError> {
        validate_indices(&self.indices, self.positions.len())
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Apply a local-to-world matrix to every vertex.
    ///
    /// A mirroring matrix (negative determinant) also reverses each
    /// triangle's winding so face normals keep pointing the same way
    /// relative to the surface.
    pub fn transformed(mut self, matrix: &Mat4) -> Self {
        if *matrix == Mat4::IDENTITY {
            return self;
        }
        for position in &mut self.positions {
            *position = matrix.transform_point3(*position);
        }
        if matrix.determinant() < 0.0 {
            self = self.flipped();
        }
        self
    }

    /// Reverse the winding of every triangle.
    pub fn flipped(mut self) -> Self {
        for tri in self.indices.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
        self
    }
}

/// Check that `indices` form whole triangles over `vertex_count` vertices.
pub fn validate_indices(indices: &[u32], vertex_count: usize) -> Result<(), MeshError> {
    if indices.len() % 3 != 0 {
        return Err(MeshError::IndexCount(indices.len()));
    }

    match indices
        .iter()
        .enumerate()
        .find(|(_, &index)| index as usize >= vertex_count)
    {
        Some((position, &index)) => Err(MeshError::IndexOutOfRange {
            position,
            index,
            vertex_count,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_creation() {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let mesh = Mesh::new(positions, vec![0, 1, 2]);

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_quad_winding() {
        let quad = Mesh::quad(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );

        assert_eq!(quad.triangle_count(), 2);
        for tri in quad.indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|i| quad.positions[tri[i] as usize]);
            assert!((b - a).cross(c - a).z > 0.0);
        }
    }

    #[test]
    fn test_validate_rejects_partial_triangle() {
        let mesh = Mesh::new(vec![Vec3::ZERO; 3], vec![0, 1]);
        assert_eq!(mesh.validate(), Err(MeshError::IndexCount(2)));
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mesh = Mesh::new(vec![Vec3::ZERO; 3], vec![0, 1, 3]);
        assert_eq!(
            mesh.validate(),
            Err(MeshError::IndexOutOfRange {
                position: 2,
                index: 3,
                vertex_count: 3
            })
        );
    }

    #[test]
    fn test_empty_mesh_is_valid() {
        let mesh = Mesh::default();
        assert!(mesh.validate().is_ok());
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_transformed() {
        let mesh = Mesh::new(vec![Vec3::ZERO, Vec3::X], vec![])
            .transformed(&Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0)));

        assert_eq!(mesh.positions[0], Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(mesh.positions[1], Vec3::new(1.0, 5.0, 0.0));
    }

    #[test]
    fn test_mirrored_keeps_facing() {
        let mesh = Mesh::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, 2])
            .transformed(&Mat4::from_scale(Vec3::new(-1.0, 1.0, 1.0)));

        assert_eq!(mesh.indices, vec![0, 2, 1]);
        let [a, b, c] = [0, 1, 2].map(|i| mesh.positions[mesh.indices[i] as usize]);
        assert!((b - a).cross(c - a).z > 0.0);
    }
}
