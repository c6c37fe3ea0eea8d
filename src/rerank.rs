//! Exact reranking of LSH candidates.

use rayon::prelude::*;

use crate::distance::euclidean_distance;
use crate::error::Result;
use crate::shingle::Shingle;

/// Minimum candidate count before distances are computed on the rayon pool.
const PARALLEL_THRESHOLD: usize = 1024;

/// Re-rank candidates by exact Euclidean distance to `query`.
///
/// Output is ascending by distance, ties broken by ascending shingle index.
/// A candidate whose dimension differs from the query's is an error.
pub fn rerank<'a, I>(query: &[f32], candidates: I) -> Result<Vec<(usize, f32)>>
where
    I: IntoIterator<Item = &'a Shingle>,
{
    let candidates: Vec<&Shingle> = candidates.into_iter().collect();

    let score = |s: &&Shingle| euclidean_distance(query, &s.value).map(|d| (s.index, d));
    let mut ranked: Vec<(usize, f32)> = if candidates.len() >= PARALLEL_THRESHOLD {
        candidates.par_iter().map(score).collect::<Result<_>>()?
    } else {
        candidates.iter().map(score).collect::<Result<_>>()?
    };

    sort_ranked(&mut ranked);
    Ok(ranked)
}

/// [`rerank`], keeping only the best `k`.
pub fn rerank_top_k<'a, I>(query: &[f32], candidates: I, k: usize) -> Result<Vec<(usize, f32)>>
where
    I: IntoIterator<Item = &'a Shingle>,
{
    let mut ranked = rerank(query, candidates)?;
    ranked.truncate(k);
    Ok(ranked)
}

/// Sort `(index, distance)` pairs ascending by distance, then by index.
pub fn sort_ranked(ranked: &mut [(usize, f32)]) {
    ranked.sort_unstable_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LshError;

    #[test]
    fn ranks_by_distance() {
        let shingles = [
            Shingle::new(0, vec![1.0, 2.0]),
            Shingle::new(1, vec![3.0, 4.0]),
        ];
        let ranked = rerank(&[5.0, 6.0], &shingles).unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].0, 1);
        assert!((ranked[0].1 - 8.0_f32.sqrt()).abs() < 1e-6);
        assert_eq!(ranked[1].0, 0);
        assert!((ranked[1].1 - 32.0_f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn equal_distances_order_by_index() {
        let shingles = [
            Shingle::new(7, vec![1.0, 0.0]),
            Shingle::new(3, vec![0.0, 1.0]),
            Shingle::new(5, vec![-1.0, 0.0]),
        ];
        let ranked = rerank(&[0.0, 0.0], &shingles).unwrap();
        let ids: Vec<usize> = ranked.iter().map(|r| r.0).collect();
        assert_eq!(ids, vec![3, 5, 7]);
    }

    #[test]
    fn top_k_truncates() {
        let shingles: Vec<Shingle> = (0..10).map(|i| Shingle::new(i, vec![i as f32])).collect();
        let ranked = rerank_top_k(&[0.0], &shingles, 3).unwrap();
        let ids: Vec<usize> = ranked.iter().map(|r| r.0).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn large_candidate_sets_match_sequential_order() {
        let shingles: Vec<Shingle> = (0..3000)
            .map(|i| Shingle::new(i, vec![((i * 31) % 97) as f32, (i % 13) as f32]))
            .collect();
        let ranked = rerank(&[10.0, 5.0], &shingles).unwrap();
        assert_eq!(ranked.len(), 3000);
        assert!(ranked
            .windows(2)
            .all(|w| w[0].1 < w[1].1 || (w[0].1 == w[1].1 && w[0].0 < w[1].0)));
    }

    #[test]
    fn dimension_mismatch_is_reported() {
        let shingles = [Shingle::new(0, vec![1.0, 2.0, 3.0])];
        assert_eq!(
            rerank(&[1.0, 2.0], &shingles).unwrap_err(),
            LshError::DimensionMismatch {
                expected: 2,
                got: 3
            }
        );
    }
}
