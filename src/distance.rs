//! Distance metrics.
//!
//! Two metrics are used by the index: Euclidean (L2) distance for exact
//! reranking of candidates, and Hamming distance between binary codes for
//! bucket selection (see [`BinaryCode::hamming_distance`]).
//!
//! Unlike a sentinel-returning distance, every function here reports a length
//! mismatch as [`LshError::DimensionMismatch`].
//!
//! [`BinaryCode::hamming_distance`]: crate::hash::BinaryCode::hamming_distance

use crate::error::{LshError, Result};

/// Dot product of two equal-length slices.
///
/// Callers are responsible for checking lengths; extra elements of the longer
/// slice are ignored.
#[inline]
#[must_use]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Squared L2 distance.
#[inline]
pub fn l2_distance_squared(a: &[f32], b: &[f32]) -> Result<f32> {
    LshError::check_dim(a.len(), b.len())?;
    Ok(a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum())
}

/// L2 (Euclidean) distance: `sqrt(sum((a_i - b_i)^2))`.
#[inline]
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> Result<f32> {
    l2_distance_squared(a, b).map(f32::sqrt)
}
