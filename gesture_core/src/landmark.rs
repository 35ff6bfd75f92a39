//! Landmarks and samples.
//!
//! Coordinates are taken exactly as the landmark extractor produced them;
//! nothing here rescales, centres or re-orders points.

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// One tracked keypoint's 3-D position.
///
/// Serialised as a bare `[x, y, z]` array.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Landmark {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Landmark { x, y, z }
    }

    /// Squared Euclidean distance to `other` over all three coordinates.
    pub fn distance_squared(&self, other: &Landmark) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx*dx + dy*dy + dz*dz
    }
}

impl From<[f64; 3]> for Landmark {
    fn from([x, y, z]: [f64; 3]) -> Self { Landmark { x, y, z } }
}

impl From<Landmark> for [f64; 3] {
    fn from(l: Landmark) -> Self { [l.x, l.y, l.z] }
}

/// One full ordered set of landmarks captured at an instant.
///
/// Index `i` of one sample corresponds to index `i` of another.
pub type Sample = Vec<Landmark>;

// ════════════════════════════════════════════════════════════════════════════
// Distance
// ════════════════════════════════════════════════════════════════════════════

/// Sum of squared landmark distances between two samples.
///
/// Only the first `min(a.len(), b.len())` positions are compared; extra
/// landmarks on either side are ignored and the sum is not divided by the
/// number of positions compared.  An empty sample yields 0.
pub fn sample_distance(a: &[Landmark], b: &[Landmark]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(p, q)| p.distance_squared(q))
        .sum()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(x: f64, y: f64, z: f64) -> Sample {
        vec![Landmark::new(x, y, z); 21]
    }

    #[test]
    fn identical_samples_have_zero_distance() {
        let a = hand(0.3, 0.7, -0.1);
        assert_eq!(sample_distance(&a, &a.clone()), 0.0);
    }

    #[test]
    fn any_differing_coordinate_gives_positive_distance() {
        let a = hand(0.3, 0.7, -0.1);
        for axis in 0..3 {
            let mut b = a.clone();
            match axis {
                0 => b[20].x += 0.01,
                1 => b[20].y += 0.01,
                _ => b[20].z += 0.01,
            }
            assert!(sample_distance(&a, &b) > 0.0, "axis {} ignored", axis);
        }
    }

    #[test]
    fn distance_sums_squares_without_normalising() {
        // 21 × (0.4² + 0.4²) = 6.72
        let d = sample_distance(&hand(0.5, 0.5, 0.0), &hand(0.9, 0.9, 0.0));
        assert!((d - 6.72).abs() < 1e-4, "got {}", d);
    }

    #[test]
    fn mismatched_lengths_compare_common_prefix() {
        let long  = hand(1.0, 0.0, 0.0);
        let short = vec![Landmark::new(0.0, 0.0, 0.0); 2];
        assert_eq!(sample_distance(&long, &short), 2.0);
        assert_eq!(sample_distance(&short, &long), 2.0);
    }

    #[test]
    fn tiny_coordinate_gap_is_still_positive() {
        let a = [Landmark::new(1e-24, 0.0, 0.0)];
        let b = [Landmark::default()];
        assert!(sample_distance(&a, &b) > 0.0);
    }

    #[test]
    fn huge_coordinate_gap_stays_finite() {
        let a = [Landmark::new(1e30, -1e30, 0.0)];
        let b = [Landmark::default()];
        let d = sample_distance(&a, &b);
        assert!(d.is_finite() && d > 0.0, "got {}", d);
    }

    #[test]
    fn empty_sample_contributes_nothing() {
        assert_eq!(sample_distance(&[], &hand(1.0, 1.0, 1.0)), 0.0);
    }

    #[test]
    fn landmark_serialises_as_triple() {
        let json = serde_json::to_string(&Landmark::new(0.5, 0.25, -1.0)).unwrap();
        assert_eq!(json, "[0.5,0.25,-1.0]");
        let back: Landmark = serde_json::from_str("[1,2,3]").unwrap();
        assert_eq!(back, Landmark::new(1.0, 2.0, 3.0));
    }
}
