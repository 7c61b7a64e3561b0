use glam::Vec3;

use crate::buffers::MeshBuffers;
use crate::params::TerrainKind;

/// Hard ceiling on the triangle count a fragmentation pass may produce
pub const TRIANGLE_CEILING: usize = 25_000;

/// Outcome of a fragmentation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentReport {
    pub requested_depth: u32,
    pub applied_depth: u32,
    pub triangle_count: usize,
    /// True when the ceiling stopped subdivision before `requested_depth`
    pub truncated: bool,
}

/// Subdivide every triangle into four, `depth - 1` times
pub fn fragment(mesh: MeshBuffers, depth: u32, kind: TerrainKind) -> MeshBuffers {
    fragment_with_report(mesh, depth, kind).0
}

/// [`fragment`], also reporting how deep it actually went.
/// Depth 1 (or 0) hands the input back untouched.
pub fn fragment_with_report(
    mesh: MeshBuffers,
    depth: u32,
    kind: TerrainKind,
) -> (MeshBuffers, FragmentReport) {
    let mut report = FragmentReport {
        requested_depth: depth,
        applied_depth: 1,
        triangle_count: mesh.triangle_count(),
        truncated: false,
    };

    let sphere_radius = match kind {
        TerrainKind::Spherical => mesh
            .positions
            .first()
            .map(|p| Vec3::from_array(*p).length())
            .unwrap_or(1.0),
        TerrainKind::Planar => 0.0,
    };

    let mut current = mesh;
    while report.applied_depth < depth {
        let projected = current.triangle_count() * 4;
        if projected > TRIANGLE_CEILING {
            log::warn!(
                "Fragmentation stopped at depth {} of {}: {} triangles would exceed the ceiling of {}",
                report.applied_depth,
                depth,
                projected,
                TRIANGLE_CEILING
            );
            report.truncated = true;
            break;
        }

        current = subdivide(&current, |a, b| get_midpoint(a, b, kind, sphere_radius));
        report.applied_depth += 1;
    }

    report.triangle_count = current.triangle_count();
    (current, report)
}

/// One 4-way split of every triangle, with fresh vertices for every child
fn subdivide<F>(mesh: &MeshBuffers, midpoint: F) -> MeshBuffers
where
    F: Fn(Vec3, Vec3) -> Vec3,
{
    let triangles = mesh.triangle_count() * 4;
    let mut result = MeshBuffers::with_capacity(triangles * 3, triangles * 3);

    for [v0, v1, v2] in mesh.triangles() {
        let m01 = midpoint(v0, v1);
        let m12 = midpoint(v1, v2);
        let m20 = midpoint(v2, v0);

        result.push_triangle(v0, m01, m20);
        result.push_triangle(m01, v1, m12);
        result.push_triangle(m20, m12, v2);
        result.push_triangle(m01, m12, m20);
    }

    result
}

fn get_midpoint(a: Vec3, b: Vec3, kind: TerrainKind, sphere_radius: f32) -> Vec3 {
    let middle = (a + b) * 0.5;
    match kind {
        // Keep it spherical
        TerrainKind::Spherical => middle.normalize_or_zero() * sphere_radius,
        TerrainKind::Planar => middle,
    }
}
