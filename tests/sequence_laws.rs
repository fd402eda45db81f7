#![cfg(feature = "sequence")]
//! Property-based tests for `Sequence<T>`.
//!
//! Verifies the algebraic behaviour of the combinator library against the
//! standard library's eager collections as a model.

use lazyseq::sequence::Sequence;
use proptest::prelude::*;

/// Generates a `Sequence<i32>` together with its model vector.
fn sequence_and_model(max_size: usize) -> impl Strategy<Value = (Sequence<i32>, Vec<i32>)> {
    prop::collection::vec(any::<i32>(), 0..max_size)
        .prop_map(|model| (Sequence::from_vec(model.clone()), model))
}

proptest! {
    // =========================================================================
    // Round-Trips and Measures
    // =========================================================================

    #[test]
    fn prop_roundtrip_is_identity((sequence, model) in sequence_and_model(64)) {
        prop_assert_eq!(sequence.to_vec(), model);
    }

    #[test]
    fn prop_length_matches_the_model((sequence, model) in sequence_and_model(64)) {
        prop_assert_eq!(sequence.length(), model.len());
        prop_assert_eq!(sequence.is_empty(), model.is_empty());
    }

    // =========================================================================
    // Transformations Against the Model
    // =========================================================================

    #[test]
    fn prop_map_matches_iterator_map((sequence, model) in sequence_and_model(64)) {
        let mapped: Vec<i64> = sequence.map(|n| i64::from(n) * 2).to_vec();
        let expected: Vec<i64> = model.iter().map(|n| i64::from(*n) * 2).collect();
        prop_assert_eq!(mapped, expected);
    }

    #[test]
    fn prop_filter_matches_iterator_filter((sequence, model) in sequence_and_model(64)) {
        let kept: Vec<i32> = sequence.filter(|n| n % 2 == 0).to_vec();
        let expected: Vec<i32> = model.into_iter().filter(|n| n % 2 == 0).collect();
        prop_assert_eq!(kept, expected);
    }

    #[test]
    fn prop_take_drop_concat_is_identity(
        (sequence, model) in sequence_and_model(64),
        cut in 0usize..80,
    ) {
        let rebuilt = sequence.take(cut).append(&sequence.drop_first(cut));
        prop_assert_eq!(rebuilt.to_vec(), model);
    }

    #[test]
    fn prop_reverse_is_an_involution((sequence, model) in sequence_and_model(64)) {
        prop_assert_eq!(sequence.reverse().reverse().to_vec(), model);
    }

    #[test]
    fn prop_fold_left_matches_iterator_fold((sequence, model) in sequence_and_model(64)) {
        let folded = sequence.fold_left(0i64, |sum, n| sum + i64::from(n));
        let expected = model.into_iter().map(i64::from).sum::<i64>();
        prop_assert_eq!(folded, expected);
    }

    #[test]
    fn prop_fold_right_agrees_with_fold_left_for_commutative_operations(
        (sequence, _model) in sequence_and_model(64),
    ) {
        let left = sequence.fold_left(0i64, |sum, n| sum + i64::from(n));
        let right = sequence.fold_right(0i64, |n, sum| i64::from(n) + sum);
        prop_assert_eq!(left, right);
    }

    // =========================================================================
    // Equality and Ordering
    // =========================================================================

    #[test]
    fn prop_equality_is_reflexive_and_model_consistent(
        (left_sequence, left_model) in sequence_and_model(32),
        (right_sequence, right_model) in sequence_and_model(32),
    ) {
        prop_assert_eq!(left_sequence.clone(), left_sequence.clone());
        prop_assert_eq!(left_sequence == right_sequence, left_model == right_model);
    }

    #[test]
    fn prop_ordering_matches_the_model(
        (left_sequence, left_model) in sequence_and_model(32),
        (right_sequence, right_model) in sequence_and_model(32),
    ) {
        prop_assert_eq!(left_sequence.cmp(&right_sequence), left_model.cmp(&right_model));
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    #[test]
    fn prop_derivation_never_disturbs_the_source(
        (sequence, model) in sequence_and_model(32),
        prefix in 0usize..40,
    ) {
        let _derived = sequence.take(prefix).append(&sequence.reverse());
        let _ = _derived.to_vec();
        prop_assert_eq!(sequence.to_vec(), model);
    }

    #[test]
    fn prop_memoize_preserves_contents((sequence, model) in sequence_and_model(32)) {
        let memoized = sequence.memoize();
        prop_assert_eq!(memoized.to_vec(), model.clone());
        prop_assert_eq!(memoized.to_vec(), model);
    }
}
