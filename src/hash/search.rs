//! Multi-table hyperplane LSH index.
//!
//! Construction (`preprocess`) derives `(k, L)` from the shingle count and the
//! collision-probability bounds, then builds `L` tables, each with its own
//! random `k × d` matrix. Tables share nothing mutable and are built on the
//! rayon pool.
//!
//! Search is two-phase:
//! 1. per table, hash the query and take the bucket whose key is nearest in
//!    Hamming distance (not only an exact collision, so a query always gets
//!    candidates from every table);
//! 2. merge those buckets, deduplicate by shingle index, and rerank by exact
//!    Euclidean distance.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use super::guard::SearchGuard;
use super::hash_table::Table;
use super::params::{validate_probabilities, Parameters};
use super::random_projection::Hyperplanes;
use crate::error::{LshError, Result};
use crate::rerank::rerank;
use crate::shingle::{shingle_count, shingles, Shingle};

/// LSH construction parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LSHParams {
    /// Minimum collision probability for near points.
    pub p1: f64,

    /// Maximum collision probability for far points. Must be below `p1`.
    pub p2: f64,

    /// Base seed; table `i` is seeded with `seed + i`.
    ///
    /// `None` draws a base seed from system entropy at build time.
    pub seed: Option<u64>,

    /// Build and search tables on the rayon pool.
    pub parallel: bool,
}

impl Default for LSHParams {
    fn default() -> Self {
        Self {
            p1: 0.9,
            p2: 0.5,
            seed: None,
            parallel: true,
        }
    }
}

impl LSHParams {
    pub fn new(p1: f64, p2: f64) -> Self {
        Self {
            p1,
            p2,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check `0 < p2 < p1 < 1`.
    pub fn validate(&self) -> Result<()> {
        validate_probabilities(self.p1, self.p2)
    }
}

/// Seed of table `table` under base seed `base`.
pub fn table_seed(base: u64, table: usize) -> u64 {
    base.wrapping_add(table as u64)
}

/// Summary of a built index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub num_shingles: usize,
    pub dimension: usize,
    pub code_length: usize,
    pub num_tables: usize,
    /// Distinct bucket keys, per table.
    pub buckets_per_table: Vec<usize>,
    /// Largest bucket, per table.
    pub max_bucket_per_table: Vec<usize>,
    /// Approximate heap footprint of matrices and stored shingles.
    pub size_bytes: usize,
}

/// Hyperplane LSH index over the shingles of one buffer.
///
/// Deserialized state goes through the same consistency checks as
/// [`LSHIndex::from_tables`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "IndexState")]
pub struct LSHIndex {
    params: LSHParams,
    derived: Option<Parameters>,
    tables: Vec<Table>,
}

/// Unchecked serialized form of [`LSHIndex`].
#[derive(Deserialize)]
struct IndexState {
    params: LSHParams,
    derived: Option<Parameters>,
    tables: Vec<Table>,
}

impl TryFrom<IndexState> for LSHIndex {
    type Error = LshError;

    fn try_from(state: IndexState) -> Result<Self> {
        let IndexState {
            params,
            derived,
            tables,
        } = state;
        params.validate()?;
        let Some(derived) = derived else {
            if !tables.is_empty() {
                return Err(LshError::config("unbuilt index carries tables"));
            }
            return Ok(Self {
                params,
                derived: None,
                tables,
            });
        };

        let (k, d, n) = check_tables(&tables)?;
        LshError::check_dim(derived.dimension(), d)?;
        if (derived.k(), derived.l(), derived.n()) != (k, tables.len(), n) {
            return Err(LshError::config(format!(
                "parameters (k={}, L={}, n={}) do not match tables (k={k}, L={}, n={n})",
                derived.k(),
                derived.l(),
                derived.n(),
                tables.len()
            )));
        }
        Ok(Self {
            params,
            derived: Some(derived),
            tables,
        })
    }
}

/// Code length, dimension and shingle count shared by `tables`.
fn check_tables(tables: &[Table]) -> Result<(usize, usize, usize)> {
    let first = tables
        .first()
        .ok_or_else(|| LshError::config("an index needs at least one table"))?;
    let (k, d, n) = (first.code_length(), first.dimension(), first.num_shingles());
    if n == 0 {
        return Err(LshError::config("tables hold no shingles"));
    }
    for table in &tables[1..] {
        LshError::check_dim(d, table.dimension())?;
        if table.code_length() != k {
            return Err(LshError::config(format!(
                "tables disagree on code length: {k} vs {}",
                table.code_length()
            )));
        }
        if table.num_shingles() != n {
            return Err(LshError::config(format!(
                "tables disagree on shingle count: {n} vs {}",
                table.num_shingles()
            )));
        }
    }
    Ok((k, d, n))
}

impl LSHIndex {
    /// An empty index; call [`LSHIndex::preprocess`] before searching.
    pub fn new(params: LSHParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            derived: None,
            tables: Vec::new(),
        })
    }

    /// Create and populate an index in one step.
    pub fn build(buffer: &[f32], shingle_size: usize, params: LSHParams) -> Result<Self> {
        let mut index = Self::new(params)?;
        index.preprocess(buffer, shingle_size)?;
        Ok(index)
    }

    /// Assemble an index from tables built by the caller.
    ///
    /// All tables must share the same code length and dimension and hold the
    /// same number of shingles. `k` and `L` are taken from the tables rather
    /// than derived.
    pub fn from_tables(tables: Vec<Table>, params: LSHParams) -> Result<Self> {
        params.validate()?;
        let (k, d, n) = check_tables(&tables)?;
        let derived = Parameters::explicit(n, d, k, tables.len(), params.p1, params.p2)?;
        Ok(Self {
            params,
            derived: Some(derived),
            tables,
        })
    }

    /// Build all tables from `buffer`, replacing any previous contents.
    ///
    /// `buffer` is read as consecutive shingles of `shingle_size` values; a
    /// partial trailing shingle is ignored. On any failure the index is left
    /// empty.
    pub fn preprocess(&mut self, buffer: &[f32], shingle_size: usize) -> Result<()> {
        self.derived = None;
        self.tables.clear();

        if shingle_size == 0 {
            return Err(LshError::config("shingle size must be positive"));
        }
        let n = shingle_count(buffer, shingle_size);
        if n == 0 {
            return Err(LshError::config(format!(
                "buffer of {} values holds no shingle of size {shingle_size}",
                buffer.len()
            )));
        }

        let derived = Parameters::derive(n, shingle_size, self.params.p1, self.params.p2)?;
        let (k, l) = (derived.k(), derived.l());
        debug!(
            n,
            d = shingle_size,
            k,
            l,
            p1 = derived.p1(),
            p2 = derived.p2(),
            "derived LSH parameters"
        );
        if derived.is_sparse_regime() {
            warn!(n, k, "2^k far exceeds n, buckets will be mostly singletons");
        }

        let base_seed = match self.params.seed {
            Some(seed) => seed,
            None => {
                let seed = rand::rng().random::<u64>();
                debug!(seed, "no seed configured, drew base seed from entropy");
                seed
            }
        };

        let build_table = |i: usize| -> Result<Table> {
            let mut rng = StdRng::seed_from_u64(table_seed(base_seed, i));
            let hyperplanes = Hyperplanes::random(k, shingle_size, &mut rng)?;
            let table = Table::build(hyperplanes, shingles(buffer, shingle_size))?;
            trace!(table = i, buckets = table.num_buckets(), "built table");
            Ok(table)
        };

        let tables: Vec<Table> = if self.params.parallel {
            (0..l).into_par_iter().map(build_table).collect::<Result<_>>()?
        } else {
            (0..l).map(build_table).collect::<Result<_>>()?
        };

        info!(
            n,
            d = shingle_size,
            k,
            l,
            buckets = tables.iter().map(Table::num_buckets).sum::<usize>(),
            "LSH index built"
        );
        self.tables = tables;
        self.derived = Some(derived);
        Ok(())
    }

    /// All shingles ranked by exact distance to `query`, nearest first.
    ///
    /// Candidates are the union of each table's nearest bucket. Ties in
    /// distance are ordered by ascending shingle index.
    pub fn search(&self, query: &[f32]) -> Result<Vec<(usize, f32)>> {
        self.search_with(query, &SearchGuard::none())
    }

    /// [`LSHIndex::search`], truncated to the `k` nearest.
    pub fn search_k(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        let mut ranked = self.search(query)?;
        ranked.truncate(k);
        Ok(ranked)
    }

    /// [`LSHIndex::search`] under a cancellation guard.
    pub fn search_with(&self, query: &[f32], guard: &SearchGuard) -> Result<Vec<(usize, f32)>> {
        let candidates = self.candidates(query, guard)?;
        guard.check()?;
        rerank(query, candidates.values().copied())
    }

    /// Union of every table's nearest bucket, keyed by shingle index.
    pub fn candidates(
        &self,
        query: &[f32],
        guard: &SearchGuard,
    ) -> Result<BTreeMap<usize, &Shingle>> {
        let derived = self.derived.as_ref().ok_or(LshError::EmptyIndex)?;
        LshError::check_dim(derived.dimension(), query.len())?;

        let buckets: Vec<&[Shingle]> = if self.params.parallel {
            self.tables
                .par_iter()
                .enumerate()
                .map(|(i, table)| selected_bucket(i, table, query, guard))
                .collect::<Result<_>>()?
        } else {
            self.tables
                .iter()
                .enumerate()
                .map(|(i, table)| selected_bucket(i, table, query, guard))
                .collect::<Result<_>>()?
        };

        let mut candidates = BTreeMap::new();
        for shingle in buckets.into_iter().flatten() {
            candidates.entry(shingle.index).or_insert(shingle);
        }
        debug!(
            candidates = candidates.len(),
            tables = self.tables.len(),
            "collected candidates"
        );
        Ok(candidates)
    }

    /// Owned coordinates of the shingles with the given indices.
    ///
    /// Unknown indices are skipped; the rest come back in request order.
    pub fn vectors(&self, ids: &[usize]) -> Result<Vec<Vec<f32>>> {
        let table = self.tables.first().ok_or(LshError::EmptyIndex)?;
        // Every table holds all shingles, so one pass over the first suffices.
        let mut wanted: Vec<(usize, usize)> =
            ids.iter().enumerate().map(|(pos, &id)| (id, pos)).collect();
        wanted.sort_unstable();
        let mut found: Vec<Option<&Shingle>> = vec![None; ids.len()];
        for shingle in table.buckets().flat_map(|(_, bucket)| bucket) {
            let start = wanted.partition_point(|&(id, _)| id < shingle.index);
            for &(_, pos) in wanted[start..].iter().take_while(|&&(id, _)| id == shingle.index) {
                found[pos] = Some(shingle);
            }
        }
        Ok(found
            .into_iter()
            .flatten()
            .map(|s| s.value.clone())
            .collect())
    }

    /// Whether `preprocess` has completed.
    pub fn is_built(&self) -> bool {
        self.derived.is_some()
    }

    pub fn params(&self) -> &LSHParams {
        &self.params
    }

    /// Derived `{P1, P2, d, n, k, L}`, once built.
    pub fn parameters(&self) -> Option<&Parameters> {
        self.derived.as_ref()
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Number of shingles indexed.
    pub fn num_vectors(&self) -> usize {
        self.derived.as_ref().map_or(0, Parameters::n)
    }

    /// Shingle dimension, or 0 before `preprocess`.
    pub fn dimension(&self) -> usize {
        self.derived.as_ref().map_or(0, Parameters::dimension)
    }

    /// Approximate heap footprint in bytes.
    pub fn size_bytes(&self) -> usize {
        let f32_size = std::mem::size_of::<f32>();
        self.tables
            .iter()
            .map(|t| {
                let matrix = t.hyperplanes().as_slice().len() * f32_size;
                let shingles: usize = t
                    .buckets()
                    .map(|(key, bucket)| {
                        key.len().div_ceil(64) * 8
                            + bucket
                                .iter()
                                .map(|s| s.value.len() * f32_size + std::mem::size_of::<Shingle>())
                                .sum::<usize>()
                    })
                    .sum();
                matrix + shingles
            })
            .sum()
    }

    pub fn stats(&self) -> Result<IndexStats> {
        let derived = self.derived.as_ref().ok_or(LshError::EmptyIndex)?;
        Ok(IndexStats {
            num_shingles: derived.n(),
            dimension: derived.dimension(),
            code_length: derived.k(),
            num_tables: self.tables.len(),
            buckets_per_table: self.tables.iter().map(Table::num_buckets).collect(),
            max_bucket_per_table: self.tables.iter().map(Table::max_bucket_len).collect(),
            size_bytes: self.size_bytes(),
        })
    }
}

/// Shingles of the bucket `table` selects for `query`.
fn selected_bucket<'a>(
    i: usize,
    table: &'a Table,
    query: &[f32],
    guard: &SearchGuard,
) -> Result<&'a [Shingle]> {
    let code = table.hash(query)?;
    match table.nearest_bucket_guarded(&code, guard)? {
        Some((key, dist)) => {
            trace!(table = i, query_code = %code, bucket = %key, hamming = dist, "selected bucket");
            Ok(table.bucket(key).unwrap_or(&[]))
        }
        None => Ok(&[]),
    }
}

/// Build an index over `buffer` with the given probability bounds.
///
/// Uses default [`LSHParams`] otherwise (entropy seed, parallel build).
pub fn preprocess(buffer: &[f32], shingle_size: usize, p1: f64, p2: f64) -> Result<LSHIndex> {
    LSHIndex::build(buffer, shingle_size, LSHParams::new(p1, p2))
}
