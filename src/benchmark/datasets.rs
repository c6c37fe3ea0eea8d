//! Synthetic shingle buffers for recall evaluation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::distance::l2_distance_squared;
use crate::rerank::sort_ranked;
use crate::shingle::shingles;

/// A flat shingle buffer plus held-out queries.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// `n_train * dimension` values, the buffer handed to `preprocess`.
    pub buffer: Vec<f32>,
    /// Query vectors, each of `dimension` values.
    pub queries: Vec<Vec<f32>>,
    /// Shingle size.
    pub dimension: usize,
}

impl Dataset {
    /// Number of shingles in the buffer.
    pub fn n_train(&self) -> usize {
        self.buffer.len() / self.dimension.max(1)
    }

    pub fn n_test(&self) -> usize {
        self.queries.len()
    }
}

/// Uniform random shingles in `[-1, 1]^d`.
///
/// # Arguments
///
/// * `n_train` - Number of shingles in the buffer
/// * `n_test` - Number of query vectors
/// * `dimension` - Shingle size
/// * `seed` - Random seed for reproducibility
pub fn create_benchmark_dataset(
    n_train: usize,
    n_test: usize,
    dimension: usize,
    seed: u64,
) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);

    let buffer: Vec<f32> = (0..n_train * dimension)
        .map(|_| rng.random_range(-1.0f32..=1.0))
        .collect();

    let queries: Vec<Vec<f32>> = (0..n_test)
        .map(|_| {
            (0..dimension)
                .map(|_| rng.random_range(-1.0f32..=1.0))
                .collect()
        })
        .collect();

    Dataset {
        buffer,
        queries,
        dimension,
    }
}

/// Clustered shingles: Gaussian noise around `n_clusters` random centers.
///
/// Queries are drawn the same way, so each has genuine near neighbors.
pub fn create_clustered_dataset(
    n_train: usize,
    n_test: usize,
    dimension: usize,
    n_clusters: usize,
    cluster_std: f32,
    seed: u64,
) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let n_clusters = n_clusters.max(1);

    let centers: Vec<Vec<f32>> = (0..n_clusters)
        .map(|_| {
            (0..dimension)
                .map(|_| rng.random_range(-1.0f32..=1.0))
                .collect()
        })
        .collect();

    let sample_near_center = |rng: &mut StdRng, center: &[f32]| -> Vec<f32> {
        center
            .iter()
            .map(|&c| {
                // Box-Muller
                let u1: f32 = rng.random::<f32>().max(f32::MIN_POSITIVE);
                let u2: f32 = rng.random();
                let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos();
                c + z * cluster_std
            })
            .collect()
    };

    let mut buffer = Vec::with_capacity(n_train * dimension);
    for _ in 0..n_train {
        let cluster_idx = rng.random_range(0..n_clusters);
        buffer.extend(sample_near_center(&mut rng, &centers[cluster_idx]));
    }

    let queries: Vec<Vec<f32>> = (0..n_test)
        .map(|_| {
            let cluster_idx = rng.random_range(0..n_clusters);
            sample_near_center(&mut rng, &centers[cluster_idx])
        })
        .collect();

    Dataset {
        buffer,
        queries,
        dimension,
    }
}

/// Exact k nearest shingles of `query` by brute force.
///
/// Same ordering rule as the index: distance, then shingle index.
pub fn compute_ground_truth(
    query: &[f32],
    buffer: &[f32],
    dimension: usize,
    k: usize,
) -> Vec<usize> {
    let mut distances: Vec<(usize, f32)> = shingles(buffer, dimension)
        .filter_map(|s| l2_distance_squared(query, &s.value).ok().map(|d| (s.index, d)))
        .collect();
    sort_ranked(&mut distances);
    distances.into_iter().take(k).map(|(id, _)| id).collect()
}

/// Ground truth for every query of `dataset`.
pub fn compute_all_ground_truth(dataset: &Dataset, k: usize) -> Vec<Vec<usize>> {
    dataset
        .queries
        .iter()
        .map(|query| compute_ground_truth(query, &dataset.buffer, dataset.dimension, k))
        .collect()
}
