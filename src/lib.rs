//! # lazyseq
//!
//! A small functional runtime substrate for Rust: immutable, lazily
//! evaluated, memoizing algebraic containers built on top of a
//! deferred-evaluation primitive and a stack-safe recursion substrate.
//!
//! ## Overview
//!
//! The crate is organised bottom-up:
//!
//! - **Control Structures**: [`control::Deferred`] (run-at-most-once
//!   suspension with cached outcomes), [`control::SyncDeferred`] (its
//!   thread-safe sibling), [`control::Trampoline`] (recursion as data,
//!   driven by an iterative loop) and fixed-point combinators
//!   ([`control::fix`], [`control::recurse`]) for anonymous recursion.
//! - **Algebraic Data Types**: [`adt::Maybe`], [`adt::Either`] and
//!   [`adt::Pair`], minimal tagged containers whose payloads stay deferred
//!   until a dispatch handler asks for them.
//! - **Persistent Sequence**: [`sequence::Sequence`], a recursively
//!   defined, lazily evaluated cons list with structural sharing, optional
//!   per-node memoization and a combinator library that is safe on
//!   infinite inputs.
//!
//! ## Feature Flags
//!
//! - `control`: Deferred, Trampoline and fixed-point combinators
//! - `adt`: Maybe, Either and Pair
//! - `sequence`: the persistent lazy sequence
//! - `sync`: the thread-safe `SyncDeferred` (pulls in `parking_lot`)
//! - `full`: enable all features
//!
//! ## Example
//!
//! ```rust
//! use lazyseq::prelude::*;
//!
//! let naturals = Sequence::iterate(0u64, |n| n + 1);
//! let squares: Vec<u64> = naturals.map(|n| n * n).take(5).to_vec();
//! assert_eq!(squares, vec![0, 1, 4, 9, 16]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and functions.
///
/// # Usage
///
/// ```rust
/// use lazyseq::prelude::*;
/// ```
pub mod prelude {

    #[cfg(feature = "control")]
    pub use crate::control::*;

    #[cfg(feature = "adt")]
    pub use crate::adt::*;

    #[cfg(feature = "sequence")]
    pub use crate::sequence::*;
}

#[cfg(feature = "control")]
pub mod control;

#[cfg(feature = "adt")]
pub mod adt;

#[cfg(feature = "sequence")]
pub mod sequence;
