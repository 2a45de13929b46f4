//! Paired density sampling: shared reference centers, per-field counts.
//!
//! The same reference sample must be reused for every field measured within
//! one comparison. Centers are drawn from the whole active subset with no
//! regard to event labels, so neither the observed nor the baseline
//! distribution is favored by center placement.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;

use crate::core::embedding::Point;
use crate::core::grid::GridIndex;

/// Draw `k` distinct point indices from `0..len` without replacement.
///
/// Deterministic in (len, k, seed). `k` larger than `len` is clamped; the
/// caller decides whether the clamp deserves a diagnostic.
pub fn reference_sample(len: usize, k: usize, seed: u64) -> Vec<usize> {
    let k = k.min(len);
    let mut rng = StdRng::seed_from_u64(seed);
    index::sample(&mut rng, len, k).into_vec()
}

/// Resolve reference indices to coordinates, preserving sample order.
pub fn reference_coords(points: &[Point], sample: &[usize]) -> Vec<[f64; 2]> {
    sample.iter().map(|&i| [points[i].x, points[i].y]).collect()
}

/// Neighbor-count vector for one event field at the shared centers.
///
/// Pure in its inputs and order-preserving: `output[i]` counts the indexed
/// events within `radius` of `centers[i]`, so paired tests and per-center
/// diagnostics line up index-for-index.
pub fn density_sample(index: &GridIndex, centers: &[[f64; 2]], radius: f64) -> Vec<u32> {
    index.count_within_batch(centers, radius)
}

/// Mean of a density sample; 0 for an empty sample.
pub fn mean_density(sample: &[u32]) -> f64 {
    if sample.is_empty() {
        return 0.0;
    }
    sample.iter().map(|&c| c as f64).sum::<f64>() / sample.len() as f64
}
