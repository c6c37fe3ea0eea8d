//! Shingles: fixed-size vectors cut from a flat buffer.

use serde::{Deserialize, Serialize};

/// One `d`-dimensional vector extracted from the buffer.
///
/// `index` is the ordinal of the vector in the buffer, so its first
/// coordinate lives at `buffer[index * d]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shingle {
    pub index: usize,
    pub value: Vec<f32>,
}

impl Shingle {
    pub fn new(index: usize, value: Vec<f32>) -> Self {
        Self { index, value }
    }

    /// Dimension of the vector.
    pub fn dimension(&self) -> usize {
        self.value.len()
    }
}

/// Number of complete shingles of size `dimension` in `buffer`.
///
/// Returns 0 for a zero dimension.
pub fn shingle_count(buffer: &[f32], dimension: usize) -> usize {
    if dimension == 0 {
        0
    } else {
        buffer.len() / dimension
    }
}

/// Iterate the complete shingles of `buffer`.
///
/// Stops as soon as fewer than `dimension` values remain, so a partial
/// trailing shingle is never produced. A zero dimension yields nothing.
pub fn shingles(buffer: &[f32], dimension: usize) -> impl Iterator<Item = Shingle> + '_ {
    let n = shingle_count(buffer, dimension);
    (0..n).map(move |i| {
        let start = i * dimension;
        Shingle::new(i, buffer[start..start + dimension].to_vec())
    })
}
