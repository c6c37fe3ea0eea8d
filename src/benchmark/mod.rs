//! Recall evaluation for LSH parameter choices.
//!
//! LSH gives no exactness guarantee: how many true neighbors survive the
//! bucket-selection phase depends on `P1`, `P2` and the data. These helpers
//! generate seeded shingle buffers, compute brute-force ground truth, and
//! score ranked output with recall@k.

pub mod datasets;
pub mod metrics;

pub use datasets::{
    compute_all_ground_truth, compute_ground_truth, create_benchmark_dataset,
    create_clustered_dataset, Dataset,
};
pub use metrics::{mean_recall, recall_at_k};
