use std::collections::HashMap;

use glam::Vec3;

/// Distance under which two positions are the same vertex
pub const WELD_EPSILON: f32 = 1e-4;

/// Deduplicates near-coincident vertices.
///
/// Positions are hashed by their cell on an `epsilon`-sized grid. A lookup probes the
/// 27 cells around the query, so any registered vertex within `epsilon` is found in
/// O(1) amortized time. The first vertex registered in a neighbourhood wins.
#[derive(Debug, Clone)]
pub struct VertexWelder {
    epsilon: f32,
    cells: HashMap<[i64; 3], Vec<u32>>,
    positions: Vec<[f32; 3]>,
}

impl Default for VertexWelder {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexWelder {
    pub fn new() -> Self {
        Self::with_epsilon(WELD_EPSILON)
    }

    pub fn with_epsilon(epsilon: f32) -> Self {
        Self {
            epsilon: epsilon.abs().max(f32::MIN_POSITIVE),
            cells: HashMap::new(),
            positions: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut welder = Self::new();
        welder.cells.reserve(capacity);
        welder.positions.reserve(capacity);
        welder
    }

    fn cell_of(&self, p: Vec3) -> [i64; 3] {
        let cell = (p / self.epsilon).floor();
        [cell.x as i64, cell.y as i64, cell.z as i64]
    }

    /// Index of an existing vertex within epsilon of `p`, if any
    pub fn find(&self, p: Vec3) -> Option<u32> {
        let [cx, cy, cz] = self.cell_of(p);
        let epsilon_sq = self.epsilon * self.epsilon;

        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(bucket) = self.cells.get(&[cx + dx, cy + dy, cz + dz]) else {
                        continue;
                    };
                    for &index in bucket {
                        let q = Vec3::from_array(self.positions[index as usize]);
                        let d = (q - p).abs();
                        if d.x > self.epsilon || d.y > self.epsilon || d.z > self.epsilon {
                            continue;
                        }
                        if d.length_squared() <= epsilon_sq {
                            return Some(index);
                        }
                    }
                }
            }
        }

        None
    }

    /// Index for `p`, registering it if no vertex lies within epsilon
    pub fn insert(&mut self, p: Vec3) -> u32 {
        if let Some(index) = self.find(p) {
            return index;
        }

        let index = self.positions.len() as u32;
        let cell = self.cell_of(p);
        self.positions.push(p.to_array());
        self.cells.entry(cell).or_default().push(index);
        index
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn into_positions(self) -> Vec<[f32; 3]> {
        self.positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_position_same_index() {
        let mut welder = VertexWelder::new();
        let a = welder.insert(Vec3::new(1.0, 2.0, 3.0));
        let b = welder.insert(Vec3::new(1.0, 2.0, 3.0));
        let c = welder.insert(Vec3::new(1.0 + 0.5e-4, 2.0, 3.0 - 0.5e-4));

        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(welder.len(), 1);
    }

    #[test]
    fn test_distinct_positions() {
        let mut welder = VertexWelder::new();
        let a = welder.insert(Vec3::ZERO);
        let b = welder.insert(Vec3::new(1e-3, 0.0, 0.0));

        assert_ne!(a, b);
        assert_eq!(welder.len(), 2);
    }

    #[test]
    fn test_across_cell_boundary() {
        // Straddles a grid line, still within epsilon
        let mut welder = VertexWelder::new();
        let a = welder.insert(Vec3::new(0.99999e-4, 0.0, 0.0));
        let b = welder.insert(Vec3::new(1.00001e-4, 0.0, 0.0));
        assert_eq!(a, b);

        let mut welder = VertexWelder::new();
        let c = welder.insert(Vec3::new(-0.4e-4, 0.0, 0.0));
        let d = welder.insert(Vec3::new(0.4e-4, 0.0, 0.0));
        assert_eq!(c, d);
    }

    #[test]
    fn test_length_counts_epsilon_classes() {
        let mut welder = VertexWelder::new();
        let centers = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 5.0, -2.0),
            Vec3::new(-3.5, 0.25, 8.0),
        ];
        let jitter = [
            Vec3::ZERO,
            Vec3::new(2e-5, 0.0, 0.0),
            Vec3::new(0.0, -3e-5, 1e-5),
            Vec3::new(-1e-5, 1e-5, -1e-5),
        ];

        for (i, center) in centers.iter().enumerate() {
            let first = welder.insert(*center);
            assert_eq!(first, i as u32);
            for j in &jitter {
                assert_eq!(welder.insert(*center + *j), first);
            }
        }
        assert_eq!(welder.len(), centers.len());
        assert_eq!(welder.into_positions()[1], [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_find_without_insert() {
        let mut welder = VertexWelder::new();
        assert_eq!(welder.find(Vec3::ONE), None);
        welder.insert(Vec3::ONE);
        assert_eq!(welder.find(Vec3::ONE), Some(0));
        assert!(!welder.is_empty());
    }

    #[test]
    fn test_positions_keep_first_insert() {
        let mut welder = VertexWelder::new();
        welder.insert(Vec3::new(2.0, 0.0, 0.0));
        welder.insert(Vec3::new(2.0 + 0.5e-4, 0.0, 0.0));
        welder.insert(Vec3::Y);

        assert_eq!(welder.positions(), &[[2.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    }
}
