//! A single LSH hash table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::guard::{SearchGuard, POLL_INTERVAL};
use super::random_projection::{BinaryCode, Hyperplanes};
use crate::error::{LshError, Result};
use crate::shingle::Shingle;

/// One hash table: a projection matrix and the buckets it induces.
///
/// Buckets are sparse (only codes that occur are stored) and kept in
/// lexicographic key order. Each bucket holds full copies of its shingles so
/// that reranking never goes back to the source buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    hyperplanes: Hyperplanes,
    buckets: BTreeMap<BinaryCode, Vec<Shingle>>,
}

impl Table {
    /// Partition `shingles` by `encode(H·value)`.
    ///
    /// Every shingle lands in exactly one bucket. Fails if a shingle's
    /// dimension differs from the matrix's.
    pub fn build<I>(hyperplanes: Hyperplanes, shingles: I) -> Result<Self>
    where
        I: IntoIterator<Item = Shingle>,
    {
        let mut buckets: BTreeMap<BinaryCode, Vec<Shingle>> = BTreeMap::new();
        for shingle in shingles {
            LshError::check_dim(hyperplanes.dimension(), shingle.dimension())?;
            let code = hyperplanes.hash(&shingle.value)?;
            buckets.entry(code).or_default().push(shingle);
        }
        Ok(Self {
            hyperplanes,
            buckets,
        })
    }

    pub fn hyperplanes(&self) -> &Hyperplanes {
        &self.hyperplanes
    }

    /// Code length `k`.
    pub fn code_length(&self) -> usize {
        self.hyperplanes.num_planes()
    }

    /// Input dimension `d`.
    pub fn dimension(&self) -> usize {
        self.hyperplanes.dimension()
    }

    /// Number of distinct bucket keys.
    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Number of shingles stored across all buckets.
    pub fn num_shingles(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Size of the largest bucket.
    pub fn max_bucket_len(&self) -> usize {
        self.buckets.values().map(Vec::len).max().unwrap_or(0)
    }

    /// Buckets in lexicographic key order.
    pub fn buckets(&self) -> impl Iterator<Item = (&BinaryCode, &[Shingle])> {
        self.buckets.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn bucket(&self, code: &BinaryCode) -> Option<&[Shingle]> {
        self.buckets.get(code).map(Vec::as_slice)
    }

    /// The code this table assigns to `v`.
    pub fn hash(&self, v: &[f32]) -> Result<BinaryCode> {
        self.hyperplanes.hash(v)
    }

    /// The stored key closest to `query_code` in Hamming distance.
    ///
    /// Ties go to the lexicographically smallest key. Returns `None` only for
    /// a table with no buckets.
    pub fn nearest_bucket(&self, query_code: &BinaryCode) -> Result<Option<(&BinaryCode, u32)>> {
        self.nearest_bucket_guarded(query_code, &SearchGuard::none())
    }

    /// [`Table::nearest_bucket`], polling `guard` while scanning.
    pub fn nearest_bucket_guarded(
        &self,
        query_code: &BinaryCode,
        guard: &SearchGuard,
    ) -> Result<Option<(&BinaryCode, u32)>> {
        LshError::check_dim(self.code_length(), query_code.len())?;

        let mut best: Option<(&BinaryCode, u32)> = None;
        // Keys iterate in ascending order, so keeping only strict improvements
        // leaves the smallest key among equally distant ones.
        for (scanned, key) in self.buckets.keys().enumerate() {
            if scanned % POLL_INTERVAL == 0 {
                guard.check()?;
            }
            let dist = key.hamming_distance(query_code)?;
            if best.map_or(true, |(_, d)| dist < d) {
                best = Some((key, dist));
                if dist == 0 {
                    break;
                }
            }
        }
        Ok(best)
    }
}
