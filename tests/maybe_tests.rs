#![cfg(feature = "adt")]
//! Unit tests for the `Maybe<T>` type.
//!
//! Tests cover:
//! - Dispatch exhaustiveness in both lazy and eager forms
//! - Payload laziness and cache sharing
//! - The accessor family, including the panicking contract
//! - Boundary conversions from Option and fallible computations

use lazyseq::adt::Maybe;
use lazyseq::control::Deferred;
use rstest::rstest;
use std::cell::Cell;
use std::rc::Rc;

// =============================================================================
// Dispatch
// =============================================================================

#[rstest]
fn exactly_one_handler_runs() {
    let present = Maybe::just(42);
    let result = present.cases(|n| n, || unreachable!("value is present"));
    assert_eq!(result, 42);

    let absent: Maybe<i32> = Maybe::nothing();
    let result = absent.cases(|_| unreachable!("value is absent"), || -1);
    assert_eq!(result, -1);
}

#[rstest]
fn lazy_dispatch_hands_over_the_suspended_payload() {
    let ran = Rc::new(Cell::new(false));
    let probe = Rc::clone(&ran);
    let value = Maybe::defer(move || {
        probe.set(true);
        42
    });

    let payload = value.cases_lazy(|payload| payload, || unreachable!("value is present"));
    assert!(!ran.get()); // the handler received it unforced
    assert_eq!(payload.force_cloned(), 42);
    assert!(ran.get());
}

// =============================================================================
// Laziness
// =============================================================================

#[rstest]
fn variant_checks_never_force_the_payload() {
    let value: Maybe<i32> = Maybe::defer(|| panic!("must not be forced"));
    assert!(value.is_just());
    assert!(!value.is_nothing());
}

#[rstest]
fn map_composes_without_forcing() {
    let runs = Rc::new(Cell::new(0));
    let probe = Rc::clone(&runs);
    let mapped = Maybe::defer(move || {
        probe.set(probe.get() + 1);
        21
    })
    .map(|n| n * 2)
    .map(|n| n - 2);

    assert_eq!(runs.get(), 0);
    assert_eq!(mapped.into_option(), Some(40));
    assert_eq!(runs.get(), 1);
}

#[rstest]
fn clones_share_the_payload_cache() {
    let runs = Rc::new(Cell::new(0));
    let probe = Rc::clone(&runs);
    let value = Maybe::defer(move || {
        probe.set(probe.get() + 1);
        42
    });
    let copy = value.clone();

    assert_eq!(value.get_or_else(0), 42);
    assert_eq!(copy.get_or_else(0), 42);
    assert_eq!(runs.get(), 1);
}

#[rstest]
fn just_deferred_adopts_an_existing_cache() {
    let deferred = Deferred::new(|| 7);
    let value = Maybe::just_deferred(deferred.clone());

    assert_eq!(value.get_or_else(0), 7);
    assert!(deferred.is_evaluated());
}

// =============================================================================
// Accessors
// =============================================================================

#[rstest]
fn accessor_family_behaves() {
    assert_eq!(Maybe::just(1).get_or_else(9), 1);
    assert_eq!(Maybe::nothing().get_or_else(9), 9);
    assert_eq!(Maybe::nothing().get_or_else_with(|| 9), 9);
    assert_eq!(Maybe::just(1).or_else(|| Maybe::just(2)).get_or_else(0), 1);
    assert_eq!(Maybe::nothing().or_else(|| Maybe::just(2)).get_or_else(0), 2);
    assert_eq!(Maybe::just(4).flat_map(|n| Maybe::just(n * 10)).get_or_else(0), 40);
    assert!(Maybe::just(4).flat_map(|_: i32| Maybe::<i32>::nothing()).is_nothing());
}

#[rstest]
#[should_panic(expected = "called `Maybe::unwrap()` on a `Nothing` value")]
fn unwrap_on_nothing_is_a_contract_violation() {
    let absent: Maybe<i32> = Maybe::nothing();
    let _ = absent.unwrap();
}

#[rstest]
#[should_panic(expected = "configuration missing")]
fn expect_reports_the_caller_message() {
    let absent: Maybe<i32> = Maybe::nothing();
    let _ = absent.expect("configuration missing");
}

#[rstest]
fn ok_or_else_builds_the_error_lazily_and_fresh_per_call() {
    let builds = Cell::new(0);

    let present = Maybe::just(1).ok_or_else(|| {
        builds.set(builds.get() + 1);
        "unused"
    });
    assert_eq!(present, Ok(1));
    assert_eq!(builds.get(), 0); // never built on the success path

    for expected in 1..=3 {
        let absent: Maybe<i32> = Maybe::nothing();
        let result = absent.ok_or_else(|| {
            builds.set(builds.get() + 1);
            "absent"
        });
        assert_eq!(result, Err("absent"));
        assert_eq!(builds.get(), expected); // one fresh error per call
    }
}

// =============================================================================
// Boundary Conversions
// =============================================================================

#[rstest]
fn option_roundtrip() {
    for option in [None, Some(3)] {
        let maybe: Maybe<i32> = option.into();
        let back: Option<i32> = maybe.into();
        assert_eq!(back, option);
    }
}

#[rstest]
fn from_fallible_discards_the_error() {
    assert_eq!(Maybe::from_fallible(|| "42".parse::<i32>()).into_option(), Some(42));
    assert!(Maybe::from_fallible(|| "nope".parse::<i32>()).is_nothing());
}

#[rstest]
fn filter_forces_and_tests() {
    assert_eq!(Maybe::just(4).filter(|n| n % 2 == 0).into_option(), Some(4));
    assert!(Maybe::just(3).filter(|n| n % 2 == 0).is_nothing());
    assert!(Maybe::<i32>::nothing().filter(|_| true).is_nothing());
}

#[rstest]
fn equality_is_structural() {
    assert_eq!(Maybe::just(1), Maybe::defer(|| 1));
    assert_ne!(Maybe::just(1), Maybe::just(2));
    assert_ne!(Maybe::just(1), Maybe::nothing());
    assert_eq!(Maybe::<i32>::nothing(), Maybe::nothing());
}
