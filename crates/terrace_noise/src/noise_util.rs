use glam::{DVec3, Vec2, Vec3};
use noise::{NoiseFn, Perlin};

/// Frequency used when a zero, negative or non-finite one is given
pub const MIN_FREQUENCY: f32 = 1e-3;

/// Octave layering for fractal noise sums
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OctaveSettings {
    pub octaves: u32,
    pub frequency: f32,
    pub persistence: f32,
    pub lacunarity: f32,
}

impl Default for OctaveSettings {
    fn default() -> Self {
        Self {
            octaves: 4,
            frequency: 0.05,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

impl OctaveSettings {
    /// Base frequency with the zero/negative guard applied
    pub fn base_frequency(&self) -> f32 {
        if self.frequency.is_finite() && self.frequency > 0.0 {
            self.frequency
        } else {
            MIN_FREQUENCY
        }
    }
}

/// Fractional Brownian Motion (FBM) noise over a plane.
/// Sums `octaves` layers of Perlin noise sampled at `point * frequency + offset`.
/// Amplitude starts at 1 and the sum is NOT normalized, so the result can leave [-1, 1]
/// once more than one octave is layered.
pub fn fbm(noise: &Perlin, point: Vec2, offset: f64, settings: &OctaveSettings) -> f32 {
    let mut value = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = settings.base_frequency();

    for _ in 0..settings.octaves {
        let sample_x = point.x as f64 * frequency as f64 + offset;
        let sample_y = point.y as f64 * frequency as f64 + offset;

        value += noise.get([sample_x, sample_y]) as f32 * amplitude;

        amplitude *= settings.persistence;
        frequency *= settings.lacunarity;
    }

    value
}

/// Approximates a 3D noise field with six planar samples,
/// one per ordered pair of axes, averaged
pub fn pseudo_3d(noise: &Perlin, p: DVec3) -> f64 {
    let xy = noise.get([p.x, p.y]);
    let yz = noise.get([p.y, p.z]);
    let zx = noise.get([p.z, p.x]);
    let yx = noise.get([p.y, p.x]);
    let zy = noise.get([p.z, p.y]);
    let xz = noise.get([p.x, p.z]);

    (xy + yz + zx + yx + zy + xz) / 6.0
}

/// FBM over the pseudo-3D field, for points on a sphere.
/// Each octave is decorrelated by its own offset vector; octaves without an offset are skipped.
pub fn fbm_spherical(
    noise: &Perlin,
    point: Vec3,
    offsets: &[Vec3],
    settings: &OctaveSettings,
) -> f32 {
    let mut value = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = settings.base_frequency();

    for offset in offsets.iter().take(settings.octaves as usize) {
        let sample = point.as_dvec3() * frequency as f64 + offset.as_dvec3();

        value += pseudo_3d(noise, sample) as f32 * amplitude;

        amplitude *= settings.persistence;
        frequency *= settings.lacunarity;
    }

    value
}
