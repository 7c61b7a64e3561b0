use glam::Vec3;
use thiserror::Error;

/// Problems found by [`MeshBuffers::validate`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    #[error("index count {0} is not a multiple of 3")]
    RaggedIndices(usize),
    #[error("index {index} at slot {slot} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        slot: usize,
        index: u32,
        vertex_count: usize,
    },
    #[error("vertex {0} has a non-finite coordinate")]
    NonFiniteVertex(usize),
}

/// Vertex positions plus a flat triangle list, three indices per triangle.
/// The only geometry representation passed between generation phases.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    pub fn new(positions: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }

    pub fn with_capacity(vertices: usize, indices: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(indices),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn position(&self, index: u32) -> Vec3 {
        Vec3::from_array(self.positions[index as usize])
    }

    /// Corner positions of every triangle, in index order
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                self.position(tri[0]),
                self.position(tri[1]),
                self.position(tri[2]),
            ]
        })
    }

    /// Append a triangle with three fresh, unshared vertices
    pub fn push_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) {
        let base = self.positions.len() as u32;
        self.positions
            .extend_from_slice(&[a.to_array(), b.to_array(), c.to_array()]);
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }

    /// Check the triangle list is whole, in range, and every vertex is finite
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::RaggedIndices(self.indices.len()));
        }

        let vertex_count = self.positions.len();
        if let Some(slot) = self
            .indices
            .iter()
            .position(|&index| index as usize >= vertex_count)
        {
            return Err(MeshError::IndexOutOfRange {
                slot,
                index: self.indices[slot],
                vertex_count,
            });
        }

        if let Some(vertex) = self
            .positions
            .iter()
            .position(|p| p.iter().any(|c| !c.is_finite()))
        {
            return Err(MeshError::NonFiniteVertex(vertex));
        }

        Ok(())
    }

    /// Unit normal per triangle, zero for degenerate triangles
    pub fn face_normals(&self) -> Vec<[f32; 3]> {
        self.triangles()
            .map(|[a, b, c]| (b - a).cross(c - a).normalize_or_zero().to_array())
            .collect()
    }

    /// Raw position bytes for GPU upload
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Raw index bytes for GPU upload
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}
