use glam::Vec3;

use crate::buffers::MeshBuffers;
use crate::params::{GenerationParameters, TerraceHeights, TerrainKind};
use crate::weld::VertexWelder;

/// Height differences below this are treated as a flat edge when cutting
pub const PLANE_EPSILON: f32 = 1e-4;

/// Terraced geometry: floor triangles first, then wall triangles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TerracedMesh {
    pub buffers: MeshBuffers,
    /// Number of leading triangles that are floor; the rest are walls
    pub floor_triangle_count: usize,
}

impl TerracedMesh {
    pub fn floor_indices(&self) -> &[u32] {
        &self.buffers.indices[..self.floor_triangle_count * 3]
    }

    pub fn wall_indices(&self) -> &[u32] {
        &self.buffers.indices[self.floor_triangle_count * 3..]
    }

    pub fn wall_triangle_count(&self) -> usize {
        self.buffers.triangle_count() - self.floor_triangle_count
    }
}

/// A triangle by corner position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
}

impl Triangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    /// Same triangle starting from the next corner; winding is kept
    pub fn rotated(self) -> Self {
        Self::new(self.b, self.c, self.a)
    }

    pub fn corners(&self) -> [Vec3; 3] {
        [self.a, self.b, self.c]
    }
}

/// How a terrain kind measures and sets vertex height
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeightMetric {
    /// Height is `y`
    Vertical,
    /// Height is distance from the origin
    Radial,
}

impl HeightMetric {
    pub fn for_kind(kind: TerrainKind) -> Self {
        match kind {
            TerrainKind::Planar => HeightMetric::Vertical,
            TerrainKind::Spherical => HeightMetric::Radial,
        }
    }

    pub fn height(self, v: Vec3) -> f32 {
        match self {
            HeightMetric::Vertical => v.y,
            HeightMetric::Radial => v.length(),
        }
    }

    pub fn with_height(self, v: Vec3, height: f32) -> Vec3 {
        match self {
            HeightMetric::Vertical => Vec3::new(v.x, height, v.z),
            HeightMetric::Radial => v.normalize_or_zero() * height,
        }
    }

    /// Point where the segment from `lower` to `higher` crosses `plane`
    pub fn intersect(self, lower: Vec3, higher: Vec3, plane: f32) -> Vec3 {
        let lower_height = self.height(lower);
        let span = self.height(higher) - lower_height;
        if span.abs() < PLANE_EPSILON {
            return (lower + higher) * 0.5;
        }

        let t = ((plane - lower_height) / span).clamp(0.0, 1.0);
        lower.lerp(higher, t)
    }
}

/// Slice a sculpted mesh into flat terraces joined by vertical walls
pub fn terrace(
    mesh: MeshBuffers,
    heights: &TerraceHeights,
    params: &GenerationParameters,
) -> TerracedMesh {
    let mut builder = TerraceBuilder::new(HeightMetric::for_kind(params.kind), mesh.vertex_count());

    if heights.is_empty() {
        for [a, b, c] in mesh.triangles() {
            builder.floor_triangle(a, b, c);
        }
    } else {
        for [a, b, c] in mesh.triangles() {
            builder.slice(Triangle::new(a, b, c), heights.as_slice());
        }
    }

    let result = builder.finish();
    log::debug!(
        "Terraced {} triangles into {} floor + {} wall triangles over {} vertices",
        mesh.triangle_count(),
        result.floor_triangle_count,
        result.wall_triangle_count(),
        result.buffers.vertex_count()
    );
    result
}

struct TerraceBuilder {
    metric: HeightMetric,
    welder: VertexWelder,
    floor: Vec<u32>,
    walls: Vec<u32>,
}

impl TerraceBuilder {
    fn new(metric: HeightMetric, input_vertices: usize) -> Self {
        Self {
            metric,
            welder: VertexWelder::with_capacity(input_vertices),
            floor: Vec::with_capacity(input_vertices * 2),
            walls: Vec::with_capacity(input_vertices),
        }
    }

    fn finish(self) -> TerracedMesh {
        let floor_triangle_count = self.floor.len() / 3;
        let mut indices = self.floor;
        indices.extend_from_slice(&self.walls);

        TerracedMesh {
            buffers: MeshBuffers::new(self.welder.into_positions(), indices),
            floor_triangle_count,
        }
    }

    fn slice(&mut self, tri: Triangle, heights: &[f32]) {
        let mut emitted = false;

        for (k, &height) in heights.iter().enumerate() {
            let previous = if k == 0 { height } else { heights[k - 1] };
            let above = tri.corners().map(|v| self.metric.height(v) > height);

            match above.iter().filter(|&&is_above| is_above).count() {
                0 => {
                    // Ends between the previous plane and this one
                    if !emitted {
                        self.flat_triangle(tri, previous);
                    }
                    return;
                }
                1 => {
                    if !emitted {
                        self.flat_triangle(tri, previous);
                        emitted = true;
                    }
                    if previous < height {
                        let tri = rotate_to_front(tri, above, true);
                        self.cut_one_above(tri, height, previous);
                    }
                }
                2 => {
                    if !emitted {
                        self.flat_triangle(tri, previous);
                        emitted = true;
                    }
                    if previous < height {
                        let tri = rotate_to_front(tri, above, false);
                        self.cut_two_above(tri, height, previous);
                    }
                }
                _ => {}
            }
        }

        if !emitted {
            if let Some(&top) = heights.last() {
                self.flat_triangle(tri, top);
            }
        }
    }

    /// `tri.a` above the plane, `b` and `c` below
    fn cut_one_above(&mut self, tri: Triangle, height: f32, previous: f32) {
        let ab = self.metric.intersect(tri.b, tri.a, height);
        let ca = self.metric.intersect(tri.c, tri.a, height);

        let peak = self.metric.with_height(tri.a, height);
        let start = self.metric.with_height(ab, height);
        let end = self.metric.with_height(ca, height);
        self.floor_triangle(peak, start, end);

        self.wall_below(start, end, previous);
    }

    /// `tri.a` below the plane, `b` and `c` above
    fn cut_two_above(&mut self, tri: Triangle, height: f32, previous: f32) {
        let ab = self.metric.intersect(tri.a, tri.b, height);
        let ca = self.metric.intersect(tri.a, tri.c, height);

        let ab = self.metric.with_height(ab, height);
        let b = self.metric.with_height(tri.b, height);
        let c = self.metric.with_height(tri.c, height);
        let ca = self.metric.with_height(ca, height);
        self.floor_quad(ab, b, c, ca);

        self.wall_below(ca, ab, previous);
    }

    /// Wall under a floor edge the floor traverses from `start` to `end`.
    /// The wall runs the edge the other way so both faces wind consistently.
    fn wall_below(&mut self, start: Vec3, end: Vec3, previous: f32) {
        let start_bottom = self.metric.with_height(start, previous);
        let end_bottom = self.metric.with_height(end, previous);
        self.wall_quad(end, start, start_bottom, end_bottom);
    }

    fn flat_triangle(&mut self, tri: Triangle, height: f32) {
        let [a, b, c] = tri.corners().map(|v| self.metric.with_height(v, height));
        self.floor_triangle(a, b, c);
    }

    fn floor_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) {
        let tri = self.weld(a, b, c);
        if let Some(tri) = tri {
            self.floor.extend_from_slice(&tri);
        }
    }

    fn floor_quad(&mut self, a: Vec3, b: Vec3, c: Vec3, d: Vec3) {
        self.floor_triangle(a, b, d);
        self.floor_triangle(b, c, d);
    }

    fn wall_quad(&mut self, a: Vec3, b: Vec3, c: Vec3, d: Vec3) {
        for (p, q, r) in [(a, b, d), (b, c, d)] {
            if let Some(tri) = self.weld(p, q, r) {
                self.walls.extend_from_slice(&tri);
            }
        }
    }

    /// Welded indices, or None when the triangle collapses to a line or point
    fn weld(&mut self, a: Vec3, b: Vec3, c: Vec3) -> Option<[u32; 3]> {
        let tri = [
            self.welder.insert(a),
            self.welder.insert(b),
            self.welder.insert(c),
        ];
        (tri[0] != tri[1] && tri[1] != tri[2] && tri[2] != tri[0]).then_some(tri)
    }
}

/// Rotate so the corner that differs from the other two comes first.
/// `lone_above` says whether that corner is the single one above the plane
/// or the single one below it.
fn rotate_to_front(tri: Triangle, above: [bool; 3], lone_above: bool) -> Triangle {
    match above.iter().position(|&is_above| is_above == lone_above) {
        Some(1) => tri.rotated(),
        Some(2) => tri.rotated().rotated(),
        _ => tri,
    }
}
