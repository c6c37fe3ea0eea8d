//! Edge case tests for hyperlsh.
//!
//! Tests unusual inputs and boundary conditions that could cause failures.

use hyperlsh::hash::{BinaryCode, Hyperplanes, LSHIndex, LSHParams, Table};
use hyperlsh::shingle::shingles;
use hyperlsh::{LshError, Shingle};

// =============================================================================
// Buffer shape edge cases
// =============================================================================

#[test]
fn single_shingle_buffer() {
    // n = 1 gives k = 0: every table is one empty-code bucket.
    let index = LSHIndex::build(&[3.0, 4.0], 2, LSHParams::default().with_seed(1)).unwrap();
    let p = index.parameters().unwrap();
    assert_eq!((p.n(), p.k(), p.l()), (1, 0, 1));

    let ranked = index.search(&[0.0, 0.0]).unwrap();
    assert_eq!(ranked, vec![(0, 5.0)]);
}

#[test]
fn trailing_partial_shingle_is_ignored() {
    let buffer = [1.0, 1.0, 2.0, 2.0, 3.0];
    let index = LSHIndex::build(&buffer, 2, LSHParams::default().with_seed(1)).unwrap();
    assert_eq!(index.num_vectors(), 2);
    let ranked = index.search(&[3.0, 3.0]).unwrap();
    assert!(ranked.iter().all(|(id, _)| *id < 2));
}

#[test]
fn dimension_one() {
    let buffer: Vec<f32> = (-10..10).map(|i| i as f32).collect();
    let index = LSHIndex::build(&buffer, 1, LSHParams::default().with_seed(3)).unwrap();
    let ranked = index.search(&[4.0]).unwrap();
    assert_eq!(ranked[0], (14, 0.0));
}

#[test]
fn high_dimension() {
    let dim = 512;
    let buffer: Vec<f32> = (0..dim * 20).map(|i| ((i * 13) as f32).sin()).collect();
    let index = LSHIndex::build(&buffer, dim, LSHParams::default().with_seed(4)).unwrap();
    let ranked = index.search(&buffer[dim * 7..dim * 8]).unwrap();
    assert_eq!(ranked[0], (7, 0.0));
}

// =============================================================================
// Special vector patterns
// =============================================================================

#[test]
fn identical_shingles_share_buckets_and_tie_by_index() {
    let buffer = [1.0, 1.0].repeat(6);
    let index = LSHIndex::build(&buffer, 2, LSHParams::default().with_seed(5)).unwrap();
    for table in index.tables() {
        assert_eq!(table.num_buckets(), 1);
    }
    let ranked = index.search(&[1.0, 1.0]).unwrap();
    let ids: Vec<usize> = ranked.iter().map(|r| r.0).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4, 5]);
    assert!(ranked.iter().all(|r| r.1 == 0.0));
}

#[test]
fn zero_vectors_encode_as_all_ones() {
    let h = Hyperplanes::from_rows(&[vec![1.0, -1.0], vec![-0.5, 0.25]]).unwrap();
    assert_eq!(h.hash(&[0.0, 0.0]).unwrap(), "11".parse::<BinaryCode>().unwrap());
}

#[test]
fn query_with_unseen_code_still_gets_candidates() {
    let h = Hyperplanes::from_rows(&[vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
    // Only codes "11" and "00" are populated.
    let table = Table::build(
        h,
        vec![
            Shingle::new(0, vec![1.0, 1.0]),
            Shingle::new(1, vec![-1.0, -1.0]),
        ],
    )
    .unwrap();
    let index = LSHIndex::from_tables(vec![table], LSHParams::default()).unwrap();

    // [1, -1] encodes to "10": distance 1 from both keys, "00" wins the tie.
    let ranked = index.search(&[1.0, -1.0]).unwrap();
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].0, 1);
}

#[test]
fn non_finite_query_values_do_not_panic() {
    let buffer: Vec<f32> = (0..40).map(|i| i as f32).collect();
    let index = LSHIndex::build(&buffer, 4, LSHParams::default().with_seed(6)).unwrap();
    let ranked = index.search(&[f32::NAN, 1.0, 2.0, 3.0]).unwrap();
    assert!(!ranked.is_empty());
}

// =============================================================================
// Table assembly edge cases
// =============================================================================

#[test]
fn tables_with_mismatched_dimensions_are_rejected() {
    let buffer = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    let a = Table::build(
        Hyperplanes::from_rows(&[vec![1.0, 0.0]]).unwrap(),
        shingles(&buffer, 2),
    )
    .unwrap();
    let b = Table::build(
        Hyperplanes::from_rows(&[vec![1.0, 0.0, 0.0]]).unwrap(),
        shingles(&buffer, 3),
    )
    .unwrap();
    assert!(matches!(
        LSHIndex::from_tables(vec![a, b], LSHParams::default()),
        Err(LshError::DimensionMismatch { .. })
    ));
}

#[test]
fn rebuild_replaces_previous_contents() {
    let mut index = LSHIndex::new(LSHParams::default().with_seed(8)).unwrap();
    index.preprocess(&[1.0, 2.0, 3.0, 4.0], 2).unwrap();
    assert_eq!(index.num_vectors(), 2);
    index.preprocess(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3).unwrap();
    assert_eq!(index.num_vectors(), 2);
    assert_eq!(index.dimension(), 3);
    assert!(index.search(&[1.0, 2.0]).is_err());
    assert_eq!(index.search(&[4.0, 5.0, 6.0]).unwrap()[0], (1, 0.0));
}
