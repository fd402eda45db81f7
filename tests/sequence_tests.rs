#![cfg(feature = "sequence")]
//! Integration tests for `Sequence<T>`.
//!
//! Tests cover:
//! - Construction, round-trips and the one-step dispatch contract
//! - Persistence and structural sharing
//! - Laziness on finite and infinite sequences
//! - Memoization, including one-shot sources
//! - The combinator library and the trampolined aggregate operations
//! - Stack safety at the hundred-thousand-element scale

use lazyseq::adt::{Maybe, Pair};
use lazyseq::sequence;
use lazyseq::sequence::Sequence;
use rstest::rstest;
use std::cell::Cell;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

fn counter() -> (Rc<Cell<usize>>, Rc<Cell<usize>>) {
    let counter = Rc::new(Cell::new(0));
    (Rc::clone(&counter), counter)
}

// =============================================================================
// Construction and Round-Trips
// =============================================================================

#[rstest]
fn native_roundtrip_preserves_order() {
    for elements in [vec![], vec![42], vec![1, 2, 3, 4, 5]] {
        let sequence = Sequence::from_vec(elements.clone());
        assert_eq!(sequence.to_vec(), elements);
    }
}

#[rstest]
fn macro_and_collect_agree() {
    let from_macro = sequence![1, 2, 3];
    let collected: Sequence<i32> = vec![1, 2, 3].into_iter().collect();
    assert_eq!(from_macro, collected);

    let empty: Sequence<i32> = sequence![];
    assert_eq!(empty, Sequence::empty());
}

#[rstest]
fn dispatch_runs_exactly_one_handler_with_the_right_payload() {
    let sequence = sequence![7, 8];
    let (head, tail_first) = sequence.cases(
        |head, tail| (head.force(), tail.first().into_option()),
        || unreachable!("sequence is non-empty"),
    );
    assert_eq!(head, 7);
    assert_eq!(tail_first, Some(8));

    let empty: Sequence<i32> = Sequence::empty();
    assert!(empty.cases(|_, _| false, || true));
}

#[rstest]
fn eager_dispatch_forces_the_head_but_not_the_tail() {
    let (calls, probe) = counter();
    let naturals = Sequence::iterate(0u64, move |n| {
        probe.set(probe.get() + 1);
        n + 1
    });

    let head = naturals.cases_eager(|head, _tail| head, || unreachable!("infinite"));
    assert_eq!(head, 0);
    assert_eq!(calls.get(), 0);
}

// =============================================================================
// Persistence and Structural Sharing
// =============================================================================

#[rstest]
fn sources_survive_derivation_unchanged() {
    let source = sequence![1, 2, 3, 4, 5];
    let derived = source.take(3).append(&sequence![99]);

    assert_eq!(derived.to_vec(), vec![1, 2, 3, 99]);
    assert_eq!(source.to_vec(), vec![1, 2, 3, 4, 5]);
}

#[rstest]
fn cons_shares_the_suffix() {
    let shared = sequence![2, 3];
    let left = Sequence::cons(1, shared.clone());
    let right = Sequence::cons(0, shared.clone());

    assert_eq!(left.to_vec(), vec![1, 2, 3]);
    assert_eq!(right.to_vec(), vec![0, 2, 3]);
    assert_eq!(shared.to_vec(), vec![2, 3]);
}

#[rstest]
fn memoized_suffix_cache_is_shared_between_derivations() {
    let (calls, probe) = counter();
    let source = sequence![1, 2, 3]
        .map(move |n| {
            probe.set(probe.get() + 1);
            n
        })
        .memoize();

    let first_view = source.drop_first(1);
    let second_view = source.drop_first(1);
    assert_eq!(first_view.to_vec(), vec![2, 3]);
    assert_eq!(second_view.to_vec(), vec![2, 3]);
    assert_eq!(source.to_vec(), vec![1, 2, 3]);
    assert_eq!(calls.get(), 3); // every view pulled from the shared caches
}

// =============================================================================
// Laziness
// =============================================================================

#[rstest]
fn take_never_computes_past_the_requested_prefix() {
    let (calls, probe) = counter();
    let naturals = Sequence::iterate(0u64, move |n| {
        probe.set(probe.get() + 1);
        n + 1
    });

    assert_eq!(naturals.take(5).to_vec(), vec![0, 1, 2, 3, 4]);
    assert_eq!(calls.get(), 4); // the sixth element was never computed
}

#[rstest]
fn infinite_sequences_are_partially_consumable() {
    assert_eq!(Sequence::repeat('x').take(3).to_vec(), vec!['x', 'x', 'x']);
    assert_eq!(
        sequence![1, 2].cycle().take(5).to_vec(),
        vec![1, 2, 1, 2, 1]
    );
    assert_eq!(
        Sequence::iterate(1u64, |n| n * 2).take(6).to_vec(),
        vec![1, 2, 4, 8, 16, 32]
    );
}

#[rstest]
fn prefix_queries_stop_at_the_required_depth() {
    let naturals = Sequence::iterate(0u64, |n| n + 1);

    assert_eq!(naturals.get(10).into_option(), Some(10));
    assert_eq!(naturals.find(|n| n % 7 == 0 && *n > 0).into_option(), Some(7));
    assert!(naturals.any(|n| *n > 5));
    assert!(!naturals.all(|n| *n < 3)); // refuted at the fourth element
}

#[rstest]
fn appending_to_an_infinite_sequence_is_harmless() {
    let combined = Sequence::iterate(0, |n| n + 1).append(&sequence![-1]);
    assert_eq!(combined.take(4).to_vec(), vec![0, 1, 2, 3]);
}

#[rstest]
fn map_and_filter_are_lazy() {
    let (calls, probe) = counter();
    let mapped = Sequence::iterate(0u64, |n| n + 1).map(move |n| {
        probe.set(probe.get() + 1);
        n * 10
    });

    assert_eq!(calls.get(), 0);
    assert_eq!(mapped.filter(|n| n % 20 == 0).take(2).to_vec(), vec![0, 20]);
    assert!(calls.get() <= 3); // only the scanned prefix was mapped
}

// =============================================================================
// Memoization
// =============================================================================

#[rstest]
fn unmemoized_sequences_recompute_per_traversal() {
    let (calls, probe) = counter();
    let mapped = sequence![1, 2, 3].map(move |n| {
        probe.set(probe.get() + 1);
        n * 2
    });

    assert_eq!(mapped.to_vec(), vec![2, 4, 6]);
    assert_eq!(mapped.to_vec(), vec![2, 4, 6]);
    assert_eq!(calls.get(), 6);
}

#[rstest]
fn memoize_caches_per_node() {
    let (calls, probe) = counter();
    let memoized = sequence![1, 2, 3]
        .map(move |n| {
            probe.set(probe.get() + 1);
            n * 2
        })
        .memoize();

    assert_eq!(memoized.to_vec(), vec![2, 4, 6]);
    assert_eq!(memoized.to_vec(), vec![2, 4, 6]);
    assert_eq!(calls.get(), 3);
}

#[rstest]
fn memoize_makes_one_shot_sources_retraversable() {
    let (pulls, probe) = counter();
    let wrapped = Sequence::from_iterator(vec![1, 2, 3].into_iter().inspect(move |_| {
        probe.set(probe.get() + 1);
    }));

    assert_eq!(wrapped.to_vec(), vec![1, 2, 3]);
    assert_eq!(wrapped.to_vec(), vec![1, 2, 3]); // no truncation, no re-pulling
    assert_eq!(pulls.get(), 3);
}

#[rstest]
fn partially_forced_memoized_sequences_resume_where_they_stopped() {
    let (pulls, probe) = counter();
    let wrapped = Sequence::from_iterator((0..10).inspect(move |_| {
        probe.set(probe.get() + 1);
    }));

    assert_eq!(wrapped.take(2).to_vec(), vec![0, 1]);
    assert_eq!(pulls.get(), 2);
    assert_eq!(wrapped.take(4).to_vec(), vec![0, 1, 2, 3]);
    assert_eq!(pulls.get(), 4);
}

// =============================================================================
// Stack Safety
// =============================================================================

#[rstest]
fn length_of_one_hundred_thousand_elements() {
    let sequence = Sequence::from_iterator(0u64..100_000);
    assert_eq!(sequence.length(), 100_000);
}

#[rstest]
fn long_fully_evaluated_spines_drop_without_overflow() {
    let sequence = Sequence::from_iterator(0u64..200_000);
    assert_eq!(sequence.length(), 200_000);
    drop(sequence);
}

#[rstest]
fn deep_equality_is_stack_safe() {
    let left = Sequence::from_iterator(0u64..100_000);
    let right = Sequence::from_iterator(0u64..100_000);
    assert_eq!(left, right);
}

#[rstest]
fn eager_right_fold_is_stack_safe() {
    let total = Sequence::from_iterator(0u64..100_000).fold_right(0u64, |element, sum| element + sum);
    assert_eq!(total, 4_999_950_000);
}

#[rstest]
fn boolean_aggregation_is_stack_safe() {
    let flags = Sequence::from_iterator(std::iter::repeat(true).take(100_000));
    assert!(flags.and());
    assert!(flags.or());
}

// =============================================================================
// Folds
// =============================================================================

#[rstest]
fn fold_left_is_eager_and_ordered() {
    let concatenated = sequence!["a", "b", "c"]
        .fold_left(String::new(), |mut accumulated, element| {
            accumulated.push_str(element);
            accumulated
        });
    assert_eq!(concatenated, "abc");
}

#[rstest]
fn fold_right_builds_from_the_end() {
    let rebuilt = sequence![1, 2, 3].fold_right(Vec::new(), |element, mut rest| {
        rest.insert(0, element);
        rest
    });
    assert_eq!(rebuilt, vec![1, 2, 3]);
}

#[rstest]
fn lazy_right_fold_stops_at_the_first_zero() {
    let (seen, probe) = counter();
    let product = sequence![3, 5, 0, 7, 9].fold_right_lazy(1, move |element, rest| {
        probe.set(probe.get() + 1);
        if element == 0 { 0 } else { element * rest.force() }
    });

    assert_eq!(product, 0);
    assert_eq!(seen.get(), 3); // 3, 5 and the zero; never 7 or 9
}

#[rstest]
fn reduce_left_handles_empty_and_nonempty() {
    assert_eq!(sequence![1, 2, 3, 4].reduce_left(|a, b| a + b).into_option(), Some(10));
    assert!(Sequence::<i32>::empty().reduce_left(|a, b| a + b).is_nothing());
}

// =============================================================================
// Combinators
// =============================================================================

#[rstest]
fn take_while_and_drop_while_split_on_the_predicate() {
    let sequence = sequence![2, 4, 5, 6];
    assert_eq!(sequence.take_while(|n| n % 2 == 0).to_vec(), vec![2, 4]);
    assert_eq!(sequence.drop_while(|n| n % 2 == 0).to_vec(), vec![5, 6]);
    assert_eq!(sequence.drop_first(2).to_vec(), vec![5, 6]);
    assert!(sequence.drop_first(9).is_empty());
}

#[rstest]
fn flat_map_concatenates_in_order() {
    let doubled = sequence![1, 2, 3].flat_map(|n| sequence![n, n * 10]);
    assert_eq!(doubled.to_vec(), vec![1, 10, 2, 20, 3, 30]);
}

#[rstest]
fn flatten_skips_empty_inner_sequences() {
    let nested = sequence![sequence![1], Sequence::empty(), sequence![2, 3]];
    assert_eq!(nested.flatten().to_vec(), vec![1, 2, 3]);
}

#[rstest]
fn zip_pairs_by_position_and_stops_at_the_shorter() {
    let zipped = sequence![1, 2, 3].zip(&sequence!["a", "b"]);
    let collected: Vec<(i32, &str)> = zipped.map(|pair| pair.split()).to_vec();
    assert_eq!(collected, vec![(1, "a"), (2, "b")]);
}

#[rstest]
fn zip_components_force_independently() {
    let (left_calls, left_probe) = counter();
    let left = sequence![1, 2].map(move |n| {
        left_probe.set(left_probe.get() + 1);
        n
    });
    let (right_calls, right_probe) = counter();
    let right = sequence![10, 20].map(move |n| {
        right_probe.set(right_probe.get() + 1);
        n
    });

    let firsts: Vec<i32> = left.zip(&right).map(|pair| pair.first()).to_vec();
    assert_eq!(firsts, vec![1, 2]);
    assert_eq!(left_calls.get(), 2);
    assert_eq!(right_calls.get(), 0); // the right components were never forced
}

#[rstest]
fn zip_with_index_and_unzip_roundtrip() {
    let indexed = sequence!["a", "b", "c"].zip_with_index();
    let unzipped: Pair<Sequence<usize>, Sequence<&str>> = indexed.unzip();
    assert_eq!(unzipped.first().to_vec(), vec![0, 1, 2]);
    assert_eq!(unzipped.second().to_vec(), vec!["a", "b", "c"]);
}

#[rstest]
fn intersperse_reverse_and_sort() {
    assert_eq!(sequence![1, 2, 3].intersperse(0).to_vec(), vec![1, 0, 2, 0, 3]);
    assert_eq!(sequence![1, 2, 3].reverse().to_vec(), vec![3, 2, 1]);
    assert_eq!(sequence![3, 1, 2].sorted().to_vec(), vec![1, 2, 3]);
    assert_eq!(
        sequence![3, 1, 2].sort_by(|a, b| b.cmp(a)).to_vec(),
        vec![3, 2, 1]
    );
}

#[rstest]
fn group_by_preserves_first_occurrence_order() {
    let grouped = sequence![1, 2, 3, 4, 5, 6].group_by(|n| n % 3);
    let collected: Vec<(i32, Vec<i32>)> = grouped
        .map(|pair| (pair.first(), pair.second().to_vec()))
        .to_vec();
    assert_eq!(
        collected,
        vec![(1, vec![1, 4]), (2, vec![2, 5]), (0, vec![3, 6])]
    );
}

#[rstest]
fn partition_splits_lazily_over_the_shared_source() {
    let split = sequence![1, 2, 3, 4, 5].partition(|n| n % 2 == 0);
    assert_eq!(split.first().to_vec(), vec![2, 4]);
    assert_eq!(split.second().to_vec(), vec![1, 3, 5]);
}

#[rstest]
fn windows_slide_and_grouped_chunks() {
    let windows: Vec<Vec<i32>> = sequence![1, 2, 3, 4].windows(2).map(|w| w.to_vec()).to_vec();
    assert_eq!(windows, vec![vec![1, 2], vec![2, 3], vec![3, 4]]);

    let chunks: Vec<Vec<i32>> = sequence![1, 2, 3, 4, 5].grouped(2).map(|c| c.to_vec()).to_vec();
    assert_eq!(chunks, vec![vec![1, 2], vec![3, 4], vec![5]]);

    // windows over an infinite source stay lazy
    let infinite: Vec<Vec<u64>> = Sequence::iterate(0u64, |n| n + 1)
        .windows(3)
        .take(2)
        .map(|w| w.to_vec())
        .to_vec();
    assert_eq!(infinite, vec![vec![0, 1, 2], vec![1, 2, 3]]);
}

// =============================================================================
// Queries and Comparisons
// =============================================================================

#[rstest]
fn first_last_and_contains() {
    let sequence = sequence![1, 2, 3];
    assert_eq!(sequence.first().into_option(), Some(1));
    assert_eq!(sequence.last().into_option(), Some(3));
    assert_eq!(sequence.rest().to_vec(), vec![2, 3]);
    assert!(sequence.contains(&2));
    assert!(!sequence.contains(&9));

    let empty: Sequence<i32> = Sequence::empty();
    assert!(empty.first().is_nothing());
    assert!(empty.last().is_nothing());
}

#[rstest]
fn range_is_inclusive_on_both_ends() {
    assert_eq!(Sequence::range(1, 5).to_vec(), vec![1, 2, 3, 4, 5]);
    assert_eq!(Sequence::range(3, 3).to_vec(), vec![3]);
    assert!(Sequence::range(4, 3).is_empty());
}

#[rstest]
fn lexicographic_ordering() {
    assert!(sequence![1, 2] < sequence![1, 3]);
    assert!(sequence![1, 2] < sequence![1, 2, 0]); // proper prefix orders first
    assert!(sequence![2] > sequence![1, 9, 9]);
    assert_eq!(
        sequence![1, 2].cmp(&sequence![1, 2]),
        std::cmp::Ordering::Equal
    );
}

#[rstest]
fn equal_sequences_hash_identically() {
    let eager = sequence![1, 2, 3];
    let lazy = Sequence::range(1, 3).map(|n| n as i32);

    let mut eager_hasher = DefaultHasher::new();
    eager.hash(&mut eager_hasher);
    let mut lazy_hasher = DefaultHasher::new();
    lazy.hash(&mut lazy_hasher);

    assert_eq!(eager, lazy);
    assert_eq!(eager_hasher.finish(), lazy_hasher.finish());
}

#[rstest]
fn maybe_converts_to_a_sequence() {
    assert_eq!(Maybe::just(5).to_sequence().to_vec(), vec![5]);
    assert!(Maybe::<i32>::nothing().to_sequence().is_empty());
}
