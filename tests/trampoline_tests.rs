#![cfg(feature = "control")]
//! Unit tests for the `Trampoline<A>` type.
//!
//! Tests cover:
//! - Done/More construction and the driver loop
//! - Stack safety at depths that would overflow native recursion
//! - Partial application through call/call2
//! - Single-stepping with resume
//! - map/flat_map/then composition

use lazyseq::control::Trampoline;
use rstest::rstest;
use std::ops::ControlFlow;

// =============================================================================
// Construction and Driving
// =============================================================================

#[rstest]
fn done_yields_its_value() {
    assert_eq!(Trampoline::done(42).run(), 42);
}

#[rstest]
fn more_defers_one_step() {
    let trampoline = Trampoline::more(|| Trampoline::done(42));
    assert_eq!(trampoline.run(), 42);
}

#[rstest]
fn run_is_stack_safe_for_deep_recursion() {
    fn count_down(n: u64) -> Trampoline<u64> {
        if n == 0 {
            Trampoline::done(0)
        } else {
            Trampoline::call(count_down, n - 1)
        }
    }

    assert_eq!(count_down(1_000_000).run(), 0);
}

#[rstest]
fn map_chains_are_stack_safe() {
    // not tail recursive: every level composes a map over the result
    fn depth(n: u64) -> Trampoline<u64> {
        if n == 0 {
            Trampoline::done(0)
        } else {
            Trampoline::call(depth, n - 1).map(|below| below + 1)
        }
    }

    assert_eq!(depth(200_000).run(), 200_000);
}

// =============================================================================
// Partial Application
// =============================================================================

#[rstest]
fn call2_applies_curried_arguments() {
    fn power(base: u64, exponent: u32) -> Trampoline<u64> {
        if exponent == 0 {
            Trampoline::done(1)
        } else {
            Trampoline::call2(power, base, exponent - 1).map(move |rest| rest * base)
        }
    }

    assert_eq!(power(2, 10).run(), 1024);
}

#[rstest]
fn mutual_recursion_through_call() {
    fn is_even(n: u64) -> Trampoline<bool> {
        if n == 0 {
            Trampoline::done(true)
        } else {
            Trampoline::call(is_odd, n - 1)
        }
    }

    fn is_odd(n: u64) -> Trampoline<bool> {
        if n == 0 {
            Trampoline::done(false)
        } else {
            Trampoline::call(is_even, n - 1)
        }
    }

    assert!(is_even(250_000).run());
    assert!(!is_odd(250_000).run());
}

// =============================================================================
// Single Stepping
// =============================================================================

#[rstest]
fn resume_distinguishes_done_from_more() {
    match Trampoline::done(7).resume() {
        ControlFlow::Break(value) => assert_eq!(value, 7),
        ControlFlow::Continue(_) => panic!("expected completion"),
    }

    match Trampoline::more(|| Trampoline::done(7)).resume() {
        ControlFlow::Continue(step) => assert_eq!(step().run(), 7),
        ControlFlow::Break(_) => panic!("expected a suspended step"),
    }
}

#[rstest]
fn resume_unwraps_composition_states() {
    let composed = Trampoline::done(21).flat_map(|n| Trampoline::done(n * 2));
    match composed.resume() {
        ControlFlow::Break(value) => assert_eq!(value, 42),
        ControlFlow::Continue(_) => panic!("expected completion"),
    }
}

// =============================================================================
// Composition
// =============================================================================

#[rstest]
fn map_transforms_the_result() {
    assert_eq!(Trampoline::done(21).map(|n| n * 2).run(), 42);
}

#[rstest]
fn flat_map_sequences_computations() {
    let result = Trampoline::more(|| Trampoline::done(20))
        .flat_map(|n| Trampoline::more(move || Trampoline::done(n + 22)));
    assert_eq!(result.run(), 42);
}

#[rstest]
fn then_discards_the_first_result() {
    let result = Trampoline::done("ignored").then(Trampoline::done(42));
    assert_eq!(result.run(), 42);
}

#[rstest]
fn erroring_steps_propagate_immediately() {
    let trampoline: Trampoline<i32> = Trampoline::more(|| panic!("step failed"));
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| trampoline.run()));
    assert!(result.is_err());
}
