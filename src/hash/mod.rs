//! Random-hyperplane Locality Sensitive Hashing.
//!
//! ## The LSH Intuition
//!
//! Traditional hash functions try to *minimize* collisions. LSH does the
//! opposite for similar items:
//!
//! - P[h(a) = h(b)] >= P1 when a and b are near
//! - P[h(a) = h(b)] <= P2 when a and b are far
//!
//! Here a base hash is the sign of a random linear functional: `h(v) = [r·v >= 0]`.
//! A table concatenates `k` of them into a `k`-bit code (AND-composition,
//! far points stop colliding) and the index keeps `L` independent tables
//! (OR-composition, near points collide in at least one). `k` and `L` come
//! from [`params::derive`].
//!
//! ## Pipeline
//!
//! ```text
//! buffer ──► shingles ──► L × Table { H_i, code -> [Shingle] }
//!
//! query ──► per table: code = sign(H_i · q) ──► nearest key by Hamming
//!       ──► union of buckets (dedup by index) ──► exact L2 rerank
//! ```
//!
//! Taking the *nearest* key rather than requiring an exact collision means
//! every table contributes candidates, even when the query's own code was
//! never seen at build time.
//!
//! ```rust
//! use hyperlsh::hash::{LSHIndex, LSHParams};
//!
//! let buffer = [1.0, 2.0, 3.0, 4.0, -1.0, -2.0];
//! let index = LSHIndex::build(&buffer, 2, LSHParams::new(0.9, 0.5).with_seed(42)).unwrap();
//!
//! let ranked = index.search(&[3.0, 4.0]).unwrap();
//! assert_eq!(ranked[0], (1, 0.0));
//! ```
//!
//! ## References
//!
//! - Indyk & Motwani (1998). "Approximate nearest neighbors: towards removing
//!   the curse of dimensionality."
//! - Charikar (2002). "Similarity estimation techniques from rounding algorithms."

pub mod guard;
mod hash_table;
pub mod params;
mod random_projection;
pub mod search;

pub use guard::SearchGuard;
pub use hash_table::Table;
pub use params::{derive, Parameters};
pub use random_projection::{encode, project, BinaryCode, Hyperplanes};
pub use search::{preprocess, IndexStats, LSHIndex, LSHParams};
