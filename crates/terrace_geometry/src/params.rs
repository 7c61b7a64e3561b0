use serde::{Deserialize, Serialize};
use terrace_noise::{noise_util::MIN_FREQUENCY, OctaveSettings, TerrainSeed};

/// Smallest polygon radius or sphere radius accepted
pub const MIN_RADIUS: f32 = 0.1;
/// Subdivision depth bounds (1 = base shape only)
pub const MIN_DEPTH: u32 = 1;
pub const MAX_DEPTH: u32 = 6;
/// Polygon side bounds for planar terrain
pub const MIN_SIDES: u32 = 3;
pub const MAX_SIDES: u32 = 10;
pub const MAX_OCTAVES: u32 = 16;
/// Height range used when max height does not exceed min height
pub const DEFAULT_HEIGHT_DELTA: f32 = 1.0;

/// Shape of the generated terrain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainKind {
    /// Flat polygon, heights along +Y
    Planar,
    /// Icosphere, heights are distances from the origin
    Spherical,
}

/// Immutable inputs for one terrain job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParameters {
    pub kind: TerrainKind,
    /// Lowest height (planar) or smallest radius (spherical)
    pub min_height: f32,
    /// Highest height (planar) or largest radius (spherical)
    pub max_height: f32,
    /// Subdivision depth, 1..=6
    pub depth: u32,
    /// Polygon sides, planar only
    pub sides: u32,
    /// Polygon radius, planar only
    pub radius: f32,
    pub seed: u32,
    pub frequency: f32,
    pub octaves: u32,
    pub persistence: f32,
    pub lacunarity: f32,
    /// Terrace heights relative to the height range, ascending in 0..=1
    pub relative_terrace_heights: Vec<f32>,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self::planar()
    }
}

impl GenerationParameters {
    pub fn planar() -> Self {
        GenerationParameters {
            kind: TerrainKind::Planar,
            min_height: -5.0,
            max_height: 5.0,
            depth: 5,
            sides: 6,
            radius: 10.0,
            seed: 0,
            frequency: 0.15,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            relative_terrace_heights: vec![0.3, 0.4, 0.5, 0.6, 0.7],
        }
    }

    pub fn spherical() -> Self {
        GenerationParameters {
            kind: TerrainKind::Spherical,
            min_height: 10.0,
            max_height: 12.0,
            depth: 5,
            sides: 3,
            radius: 10.0,
            seed: 0,
            frequency: 0.25,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            relative_terrace_heights: vec![0.45, 0.5, 0.55, 0.6, 0.7],
        }
    }

    /// Clamp every field into its valid range.
    /// This is the only place parameter violations are handled; nothing downstream fails on them.
    pub fn sanitized(&self) -> Self {
        let mut params = self.clone();

        params.depth = params.depth.clamp(MIN_DEPTH, MAX_DEPTH);
        params.sides = params.sides.clamp(MIN_SIDES, MAX_SIDES);
        params.radius = params.radius.abs().max(MIN_RADIUS);

        if !params.min_height.is_finite() {
            params.min_height = 0.0;
        }
        if params.kind == TerrainKind::Spherical {
            params.min_height = params.min_height.max(MIN_RADIUS);
        }
        if !(params.max_height > params.min_height) || !params.max_height.is_finite() {
            log::warn!(
                "max height {} does not exceed min height {}, using a range of {}",
                params.max_height,
                params.min_height,
                DEFAULT_HEIGHT_DELTA
            );
            params.max_height = params.min_height + DEFAULT_HEIGHT_DELTA;
        }

        if !(params.frequency > 0.0) || !params.frequency.is_finite() {
            params.frequency = MIN_FREQUENCY;
        }
        params.octaves = params.octaves.min(MAX_OCTAVES);
        if params.octaves > 1 {
            if !(params.persistence > 0.0 && params.persistence < 1.0) {
                params.persistence = 0.5;
            }
            if !(params.lacunarity > 1.0) || !params.lacunarity.is_finite() {
                params.lacunarity = 2.0;
            }
        }

        params.relative_terrace_heights = normalize_relative(&params.relative_terrace_heights);
        params
    }

    /// Height range, with the zero/negative range guard applied
    pub fn height_delta(&self) -> f32 {
        let delta = self.max_height - self.min_height;
        if delta > 0.0 && delta.is_finite() {
            delta
        } else {
            DEFAULT_HEIGHT_DELTA
        }
    }

    /// Radius of the base icosahedron
    pub fn sphere_radius(&self) -> f32 {
        self.min_height.abs().max(MIN_RADIUS)
    }

    pub fn terrain_seed(&self) -> TerrainSeed {
        TerrainSeed::new(self.seed)
    }

    pub fn octave_settings(&self) -> OctaveSettings {
        OctaveSettings {
            octaves: self.octaves,
            frequency: self.frequency,
            persistence: self.persistence,
            lacunarity: self.lacunarity,
        }
    }

    pub fn terrace_heights(&self) -> TerraceHeights {
        TerraceHeights::from_relative(
            self.min_height,
            self.height_delta(),
            &self.relative_terrace_heights,
        )
    }
}

/// Absolute terrace heights for a job, ascending and free of duplicates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TerraceHeights {
    heights: Vec<f32>,
}

impl TerraceHeights {
    /// `min + relative * delta` for every valid relative height
    pub fn from_relative(min: f32, delta: f32, relative: &[f32]) -> Self {
        let heights = normalize_relative(relative)
            .into_iter()
            .map(|r| min + r * delta)
            .collect::<Vec<_>>();
        Self::from_absolute(heights)
    }

    pub fn from_absolute(mut heights: Vec<f32>) -> Self {
        heights.retain(|h| h.is_finite());
        heights.sort_by(|a, b| a.total_cmp(b));
        heights.dedup();
        Self { heights }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.heights
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    pub fn lowest(&self) -> Option<f32> {
        self.heights.first().copied()
    }

    pub fn highest(&self) -> Option<f32> {
        self.heights.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.heights.iter().copied()
    }
}

fn normalize_relative(relative: &[f32]) -> Vec<f32> {
    let mut heights: Vec<f32> = relative
        .iter()
        .filter(|r| r.is_finite())
        .map(|r| r.clamp(0.0, 1.0))
        .collect();
    heights.sort_by(|a, b| a.total_cmp(b));
    heights.dedup();
    heights
}
