//! hyperlsh: random-hyperplane LSH over vector shingles.
//!
//! A buffer of `N·d` values is read as `N` shingles of dimension `d` and
//! indexed by `L` hash tables. Each table projects shingles through its own
//! random `k × d` matrix and buckets them by the sign pattern of the
//! projection. Queries pick, per table, the bucket whose code is nearest in
//! Hamming distance, then rerank the union of those buckets by exact
//! Euclidean distance.
//!
//! - [`hash`]: parameter derivation, encoding, tables and the index
//! - [`rerank`]: exact-distance ranking of candidates
//! - [`benchmark`]: seeded datasets and recall metrics
//!
//! # Choosing P1 and P2
//!
//! `k` and `L` are derived from the shingle count `n` and two collision
//! probabilities, `P1` for near points and `P2` for far points
//! (`0 < P2 < P1 < 1`). A larger gap between them makes `L` small relative
//! to `n`; pushing `P2` towards 1 makes codes long, buckets tiny and the
//! nearest-bucket scan linear in `n`.
//!
//! # Example
//!
//! ```rust
//! use hyperlsh::{LSHIndex, LSHParams};
//!
//! let buffer: Vec<f32> = (0..64).map(|i| (i as f32 * 0.37).sin()).collect();
//! let params = LSHParams::new(0.9, 0.5).with_seed(7);
//! let index = LSHIndex::build(&buffer, 4, params).unwrap();
//!
//! let query = &buffer[8..12];
//! let ranked = index.search(query).unwrap();
//! assert_eq!(ranked[0], (2, 0.0));
//! ```

pub mod benchmark;
pub mod distance;
pub mod error;
pub mod hash;
pub mod rerank;
pub mod shingle;

pub use error::{LshError, Result};
pub use hash::{preprocess, BinaryCode, Hyperplanes, LSHIndex, LSHParams, SearchGuard, Table};
pub use shingle::Shingle;
