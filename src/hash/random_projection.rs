//! Random hyperplane projections and sign encoding.
//!
//! A table's hash function is a `k × d` matrix `H`. A vector `v` is projected
//! to `H·v` and each coordinate is reduced to its sign, giving a `k`-bit code.
//! Vectors on the same side of most hyperplanes share most bits, so code
//! Hamming distance tracks angular proximity.
//!
//! Entries of `H` are uniform on `[-1, 1]` rather than Gaussian: the
//! collision geometry differs slightly from Charikar's SimHash, but every
//! row is still a random linear functional whose sign splits the space.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::distance::dot;
use crate::error::{LshError, Result};

const WORD_BITS: usize = 64;

/// A fixed-length binary code.
///
/// Bits are packed MSB-first into 64-bit words, so comparing the words in
/// order is the same as comparing the `"0"`/`"1"` string forms
/// lexicographically. The derived ordering therefore sorts codes exactly like
/// their string keys, which is what the nearest-bucket tie-break relies on.
///
/// Serializes as its string form, so codes can key JSON maps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BinaryCode {
    // Field order matters for the derived `Ord`.
    words: Vec<u64>,
    bits: usize,
}

impl BinaryCode {
    /// An all-zero code of `bits` bits.
    pub fn zeros(bits: usize) -> Self {
        Self {
            words: vec![0; bits.div_ceil(WORD_BITS)],
            bits,
        }
    }

    /// Build a code from individual bits, in index order.
    pub fn from_bits<I: IntoIterator<Item = bool>>(bits: I) -> Self {
        let mut words = Vec::new();
        let mut len = 0;
        for bit in bits {
            if len % WORD_BITS == 0 {
                words.push(0);
            }
            if bit {
                let last = words.len() - 1;
                words[last] |= 1u64 << (WORD_BITS - 1 - len % WORD_BITS);
            }
            len += 1;
        }
        Self { words, bits: len }
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.bits
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Value of bit `i`, or `None` past the end.
    pub fn get(&self, i: usize) -> Option<bool> {
        if i >= self.bits {
            return None;
        }
        let word = self.words[i / WORD_BITS];
        Some((word >> (WORD_BITS - 1 - i % WORD_BITS)) & 1 == 1)
    }

    /// Iterate bits in index order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.bits).filter_map(move |i| self.get(i))
    }

    /// Hamming distance: popcount of the XOR of two equal-length codes.
    ///
    /// Codes of different lengths are a [`LshError::DimensionMismatch`].
    pub fn hamming_distance(&self, other: &BinaryCode) -> Result<u32> {
        LshError::check_dim(self.bits, other.bits)?;
        Ok(self
            .words
            .iter()
            .zip(other.words.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum())
    }
}

impl fmt::Display for BinaryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for BinaryCode {
    type Err = LshError;

    fn from_str(s: &str) -> Result<Self> {
        let bits = s
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(LshError::config(format!(
                    "binary code may only contain '0' and '1', found {other:?}"
                ))),
            })
            .collect::<Result<Vec<bool>>>()?;
        Ok(Self::from_bits(bits))
    }
}

impl Serialize for BinaryCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BinaryCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Sign-encode a projection: bit `i` is 1 iff `projection[i] >= 0`.
pub fn encode(projection: &[f32]) -> BinaryCode {
    BinaryCode::from_bits(projection.iter().map(|&x| x >= 0.0))
}

/// Matrix-vector product `H·v` for a row-major `k × d` matrix.
pub fn project(hyperplanes: &Hyperplanes, v: &[f32]) -> Result<Vec<f32>> {
    hyperplanes.project(v)
}

/// A `k × d` matrix of hyperplane normals, stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperplanes {
    num_planes: usize,
    dimension: usize,
    data: Vec<f32>,
}

impl Hyperplanes {
    /// Wrap a row-major buffer of `num_planes * dimension` entries.
    pub fn new(num_planes: usize, dimension: usize, data: Vec<f32>) -> Result<Self> {
        if dimension == 0 {
            return Err(LshError::config("hyperplane dimension must be positive"));
        }
        if data.len() != num_planes * dimension {
            return Err(LshError::config(format!(
                "hyperplane matrix needs {} entries for {num_planes}x{dimension}, got {}",
                num_planes * dimension,
                data.len()
            )));
        }
        Ok(Self {
            num_planes,
            dimension,
            data,
        })
    }

    /// Build from explicit rows; every row must have the same positive length.
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        let dimension = rows
            .first()
            .map(Vec::len)
            .ok_or_else(|| LshError::config("hyperplane matrix needs at least one row"))?;
        let mut data = Vec::with_capacity(rows.len() * dimension);
        for row in rows {
            LshError::check_dim(dimension, row.len())?;
            data.extend_from_slice(row);
        }
        Self::new(rows.len(), dimension, data)
    }

    /// Sample a matrix with entries i.i.d. uniform on `[-1, 1]`.
    pub fn random<R: Rng + ?Sized>(
        num_planes: usize,
        dimension: usize,
        rng: &mut R,
    ) -> Result<Self> {
        let data = (0..num_planes * dimension)
            .map(|_| rng.random_range(-1.0f32..=1.0))
            .collect();
        Self::new(num_planes, dimension, data)
    }

    /// Number of hyperplanes (`k`, the code length).
    pub fn num_planes(&self) -> usize {
        self.num_planes
    }

    /// Input dimension (`d`).
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Row-major entries.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// `H·v`.
    pub fn project(&self, v: &[f32]) -> Result<Vec<f32>> {
        LshError::check_dim(self.dimension, v.len())?;
        Ok(self
            .data
            .chunks_exact(self.dimension)
            .map(|row| dot(row, v))
            .collect())
    }

    /// `encode(H·v)`.
    pub fn hash(&self, v: &[f32]) -> Result<BinaryCode> {
        self.project(v).map(|p| encode(&p))
    }
}
