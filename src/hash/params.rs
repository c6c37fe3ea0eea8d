//! Amplification parameters `(k, L)` from collision-probability bounds.
//!
//! Given `P1` (minimum collision probability of near points) and `P2`
//! (maximum collision probability of far points) for a single hyperplane,
//! the classic construction (Indyk & Motwani 1998) picks
//!
//! ```text
//! k = ceil( ln(n) / ln(1/P2) )      AND-composition: one table's code length
//! ρ = ln(1/P1) / ln(1/P2)
//! L = ceil( n^ρ )                   OR-composition: number of tables
//! ```
//!
//! Concatenating `k` hyperplanes drives the far-point collision probability
//! down to `P2^k ≈ 1/n`; repeating the construction `L` times brings the
//! near-point recall back up to `1 - (1 - P1^k)^L`.

use serde::{Deserialize, Serialize};

use crate::error::{LshError, Result};

/// Check `0 < p2 < p1 < 1`.
pub fn validate_probabilities(p1: f64, p2: f64) -> Result<()> {
    let in_range = |p: f64| p.is_finite() && p > 0.0 && p < 1.0;
    if !in_range(p1) {
        return Err(LshError::config(format!("P1 must lie in (0, 1), got {p1}")));
    }
    if !in_range(p2) {
        return Err(LshError::config(format!("P2 must lie in (0, 1), got {p2}")));
    }
    if p2 >= p1 {
        return Err(LshError::config(format!(
            "P2 must be strictly less than P1, got P1={p1}, P2={p2}"
        )));
    }
    Ok(())
}

/// Values this close to an integer are treated as that integer before
/// rounding up, so `ln(125) / ln(5)` gives 3 and not 4.
const INTEGER_TOLERANCE: f64 = 1e-9;

/// `ceil(x)`, except that `x` within [`INTEGER_TOLERANCE`] of an integer
/// rounds to it.
fn ceil_tolerant(x: f64) -> f64 {
    let nearest = x.round();
    if (x - nearest).abs() < INTEGER_TOLERANCE {
        nearest
    } else {
        x.ceil()
    }
}

/// Derive the code length `k` and table count `L` for `n` shingles.
///
/// Deterministic in `(n, p1, p2)`, and both outputs are non-decreasing in `n`.
/// A single shingle gives `k = 0`: one empty-code bucket per table.
pub fn derive(n: usize, p1: f64, p2: f64) -> Result<(usize, usize)> {
    validate_probabilities(p1, p2)?;
    if n == 0 {
        return Err(LshError::config("cannot derive parameters for zero shingles"));
    }

    let n = n as f64;
    let inv_p2 = (1.0 / p2).ln();
    let k = ceil_tolerant(n.ln() / inv_p2);
    let rho = (1.0 / p1).ln() / inv_p2;
    let l = ceil_tolerant(n.powf(rho)).max(1.0);

    Ok((k as usize, l as usize))
}

/// Parameters shared by every table of one index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    p1: f64,
    p2: f64,
    dimension: usize,
    n: usize,
    k: usize,
    l: usize,
}

impl Parameters {
    /// Derive `(k, L)` for `n` shingles of the given dimension.
    pub fn derive(n: usize, dimension: usize, p1: f64, p2: f64) -> Result<Self> {
        if dimension == 0 {
            return Err(LshError::config("shingle size must be positive"));
        }
        let (k, l) = derive(n, p1, p2)?;
        Ok(Self {
            p1,
            p2,
            dimension,
            n,
            k,
            l,
        })
    }

    /// Parameters for tables whose amplification was chosen by the caller.
    pub(crate) fn explicit(
        n: usize,
        dimension: usize,
        k: usize,
        l: usize,
        p1: f64,
        p2: f64,
    ) -> Result<Self> {
        validate_probabilities(p1, p2)?;
        Ok(Self {
            p1,
            p2,
            dimension,
            n,
            k,
            l,
        })
    }

    pub fn p1(&self) -> f64 {
        self.p1
    }

    pub fn p2(&self) -> f64 {
        self.p2
    }

    /// Shingle size `d`.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of shingles indexed.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Code length (bits per bucket key).
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of tables.
    pub fn l(&self) -> usize {
        self.l
    }

    /// Whether `2^k` dwarfs `n`, making almost every bucket a singleton and the
    /// nearest-bucket scan linear in `n`.
    pub fn is_sparse_regime(&self) -> bool {
        let log2_n = (self.n.max(1) as f64).log2();
        self.k as f64 > log2_n + 16.0
    }
}
