use glam::Vec3;

use crate::buffers::MeshBuffers;
use crate::params::{GenerationParameters, TerrainKind, MIN_RADIUS, MIN_SIDES};

// Unit-sphere icosahedron coordinates: (±1, ±t, 0) normalized, t = golden ratio
const ICO_A: f32 = 0.525_731_1;
const ICO_B: f32 = 0.850_650_8;

/// Icosahedron corners on the unit sphere
pub const ICOSAHEDRON_VERTICES: [[f32; 3]; 12] = [
    [-ICO_A, ICO_B, 0.0],
    [ICO_A, ICO_B, 0.0],
    [-ICO_A, -ICO_B, 0.0],
    [ICO_A, -ICO_B, 0.0],
    [0.0, -ICO_A, ICO_B],
    [0.0, ICO_A, ICO_B],
    [0.0, -ICO_A, -ICO_B],
    [0.0, ICO_A, -ICO_B],
    [ICO_B, 0.0, -ICO_A],
    [ICO_B, 0.0, ICO_A],
    [-ICO_B, 0.0, -ICO_A],
    [-ICO_B, 0.0, ICO_A],
];

/// The 20 icosahedron faces. Order and winding feed every later phase, so never reorder.
#[rustfmt::skip]
pub const ICOSAHEDRON_FACES: [u32; 60] = [
    0, 11, 5,  0, 5, 1,  0, 1, 7,  0, 7, 10,  0, 10, 11,
    1, 5, 9,  5, 11, 4,  11, 10, 2,  10, 7, 6,  7, 1, 8,
    3, 9, 4,  3, 4, 2,  3, 2, 6,  3, 6, 8,  3, 8, 9,
    4, 9, 5,  2, 4, 11,  6, 2, 10,  8, 6, 7,  9, 8, 1,
];

/// Generate the zero-level base mesh for a job
pub fn generate(params: &GenerationParameters) -> MeshBuffers {
    let mesh = match params.kind {
        TerrainKind::Planar => generate_polygon(params.sides, params.radius),
        TerrainKind::Spherical => generate_icosahedron(params.sphere_radius()),
    };

    log::debug!(
        "Base shape ({:?}): {} vertices, {} triangles",
        params.kind,
        mesh.vertex_count(),
        mesh.triangle_count()
    );

    mesh
}

/// Regular polygon in the XZ plane at y = 0, fanned from vertex 0
pub fn generate_polygon(sides: u32, radius: f32) -> MeshBuffers {
    let sides = sides.max(MIN_SIDES);
    let radius = radius.abs().max(MIN_RADIUS);

    let positions = (0..sides)
        .map(|i| {
            let angle = std::f32::consts::TAU * i as f32 / sides as f32;
            [angle.cos() * radius, 0.0, angle.sin() * radius]
        })
        .collect();

    let mut indices = Vec::with_capacity((sides as usize - 2) * 3);
    for i in 1..sides - 1 {
        indices.extend_from_slice(&[0, i, i + 1]);
    }

    MeshBuffers::new(positions, indices)
}

/// Icosahedron scaled to `radius`
pub fn generate_icosahedron(radius: f32) -> MeshBuffers {
    let radius = radius.abs().max(MIN_RADIUS);

    let positions = ICOSAHEDRON_VERTICES
        .iter()
        .map(|&p| (Vec3::from_array(p).normalize() * radius).to_array())
        .collect();

    MeshBuffers::new(positions, ICOSAHEDRON_FACES.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_counts_and_ring() {
        for sides in 3..=10 {
            let mesh = generate_polygon(sides, 10.0);

            assert_eq!(mesh.vertex_count(), sides as usize);
            assert_eq!(mesh.index_count(), (sides as usize - 2) * 3);
            for p in &mesh.positions {
                assert_eq!(p[1], 0.0);
                let horizontal = (p[0] * p[0] + p[2] * p[2]).sqrt();
                assert!((horizontal - 10.0).abs() < 1e-4);
            }
            assert!(mesh.validate().is_ok());
        }
    }

    #[test]
    fn test_polygon_fan() {
        let mesh = generate_polygon(6, 10.0);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3, 0, 3, 4, 0, 4, 5]);
    }

    #[test]
    fn test_polygon_guards() {
        let mesh = generate_polygon(1, -0.0);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.index_count(), 3);
        let horizontal = Vec3::from_array(mesh.positions[0]).length();
        assert!((horizontal - MIN_RADIUS).abs() < 1e-6);

        let mesh = generate_polygon(4, -5.0);
        assert!((Vec3::from_array(mesh.positions[1]).length() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_icosahedron() {
        let mesh = generate_icosahedron(7.5);

        assert_eq!(mesh.vertex_count(), 12);
        assert_eq!(mesh.index_count(), 60);
        for p in &mesh.positions {
            assert!((Vec3::from_array(*p).length() - 7.5).abs() < 1e-4);
        }
        assert_eq!(mesh.indices, ICOSAHEDRON_FACES.to_vec());
    }

    #[test]
    fn test_icosahedron_faces_point_outward() {
        let mesh = generate_icosahedron(1.0);
        for ([a, b, c], normal) in mesh.triangles().zip(mesh.face_normals()) {
            let centroid = (a + b + c) / 3.0;
            assert!(centroid.dot(Vec3::from_array(normal)) > 0.0);
        }
    }

    #[test]
    fn test_generate_is_deterministic() {
        for params in [GenerationParameters::planar(), GenerationParameters::spherical()] {
            assert_eq!(generate(&params), generate(&params));
        }
    }

    #[test]
    fn test_generate_spherical_uses_min_height() {
        let params = GenerationParameters {
            min_height: 4.0,
            max_height: 6.0,
            ..GenerationParameters::spherical()
        };
        let mesh = generate(&params);
        assert!((mesh.position(0).length() - 4.0).abs() < 1e-4);
    }
}
