pub mod noise_util;
pub mod seed;

// Re-export commonly used items
pub use noise_util::{fbm, fbm_spherical, pseudo_3d, OctaveSettings};
pub use seed::TerrainSeed;
