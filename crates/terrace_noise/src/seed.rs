use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seed used when a caller configures zero
pub const FALLBACK_SEED: u32 = 1587;

/// Stream identifier for the octave offset generator
const OCTAVE_OFFSET_STREAM: u32 = 0x0C7A_5EED;

/// Half-extent of the cube octave offsets are drawn from
pub const OCTAVE_OFFSET_RANGE: f32 = 1000.0;

/// Terrain seed for procedural generation.
/// Never zero: a zero seed is remapped to [`FALLBACK_SEED`] on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TerrainSeed {
    value: u32,
}

impl TerrainSeed {
    /// Create a new TerrainSeed, substituting the fallback for zero
    pub fn new(seed: u32) -> Self {
        if seed == 0 {
            log::debug!("Seed 0 remapped to fallback seed {}", FALLBACK_SEED);
            Self {
                value: FALLBACK_SEED,
            }
        } else {
            Self { value: seed }
        }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    /// Hash combine function from Boost C++ library
    /// Formula: seed ^ (value + 0x9e3779b9 + (seed << 6) + (seed >> 2))
    pub fn hash_combine(&self, value: u32) -> u32 {
        let seed = self.value;

        seed ^ (value
            .wrapping_add(0x9e3779b9)
            .wrapping_add(seed << 6)
            .wrapping_add(seed >> 2))
    }

    /// Combine this seed with a value to create a new derived seed
    pub fn combine(&self, value: u32) -> TerrainSeed {
        TerrainSeed::new(self.hash_combine(value))
    }

    /// Deterministic generator for this seed's octave offsets
    pub fn offset_rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.combine(OCTAVE_OFFSET_STREAM).value as u64)
    }

    /// One random offset per octave, each axis in [-OCTAVE_OFFSET_RANGE, OCTAVE_OFFSET_RANGE)
    pub fn octave_offsets(&self, octaves: u32) -> Vec<Vec3> {
        let mut rng = self.offset_rng();
        (0..octaves)
            .map(|_| {
                Vec3::new(
                    rng.gen_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE),
                    rng.gen_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE),
                    rng.gen_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE),
                )
            })
            .collect()
    }
}

impl From<u32> for TerrainSeed {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl Default for TerrainSeed {
    fn default() -> Self {
        Self::new(FALLBACK_SEED)
    }
}
