//! Recall of ranked LSH output against brute-force ground truth.

/// Fraction of the true `k` nearest shingles present in the first `k`
/// entries of `ranked`.
///
/// `ranked` is the `(index, distance)` list returned by
/// [`LSHIndex::search_k`](crate::hash::LSHIndex::search_k). When fewer than
/// `k` true neighbors exist, finding all of them counts as full recall.
pub fn recall_at_k(ground_truth: &[usize], ranked: &[(usize, f32)], k: usize) -> f32 {
    let truth = &ground_truth[..ground_truth.len().min(k)];
    if truth.is_empty() {
        return 0.0;
    }
    let found = ranked
        .iter()
        .take(k)
        .filter(|(index, _)| truth.contains(index))
        .count();
    found as f32 / truth.len() as f32
}

/// [`recall_at_k`] averaged over queries, pairing `ground_truths[i]` with
/// `results[i]`.
pub fn mean_recall(ground_truths: &[Vec<usize>], results: &[Vec<(usize, f32)>], k: usize) -> f32 {
    let queries = ground_truths.len().min(results.len());
    if queries == 0 {
        return 0.0;
    }
    let total: f32 = ground_truths
        .iter()
        .zip(results)
        .map(|(truth, ranked)| recall_at_k(truth, ranked, k))
        .sum();
    total / queries as f32
}
