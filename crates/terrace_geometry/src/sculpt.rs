use glam::{Vec2, Vec3};
use noise::Perlin;
use terrace_noise::{fbm, fbm_spherical};

use crate::buffers::MeshBuffers;
use crate::params::{GenerationParameters, TerrainKind};

/// Share of the height range planar noise may displace a vertex by
pub const PLANAR_AMPLITUDE_SCALE: f32 = 0.3;
/// Smallest radius a sculpted spherical vertex may end up at
pub const MIN_SCULPTED_RADIUS: f32 = 0.01;

/// Displace vertices with layered noise. Indices pass through unchanged.
pub fn sculpt(mesh: MeshBuffers, params: &GenerationParameters) -> MeshBuffers {
    let seed = params.terrain_seed();
    let settings = params.octave_settings();
    let noise = Perlin::new(seed.value());
    let delta = params.height_delta();

    let MeshBuffers {
        mut positions,
        indices,
    } = mesh;

    match params.kind {
        TerrainKind::Spherical => {
            let offsets = seed.octave_offsets(settings.octaves);
            for p in positions.iter_mut() {
                let vertex = Vec3::from_array(*p);
                let value = fbm_spherical(&noise, vertex, &offsets, &settings);

                // Map [-1, 1] into the radius band
                let normalized = (0.5 * value + 0.5).clamp(0.0, 1.0);
                let height = (params.min_height + normalized * delta).max(MIN_SCULPTED_RADIUS);

                *p = (vertex.normalize_or_zero() * height).to_array();
            }
        }
        TerrainKind::Planar => {
            let offset = seed.value() as f64;
            let amplitude = delta * PLANAR_AMPLITUDE_SCALE;
            for p in positions.iter_mut() {
                let value = fbm(&noise, Vec2::new(p[0], p[2]), offset, &settings);
                p[1] += value * amplitude;
            }
        }
    }

    MeshBuffers::new(positions, indices)
}
