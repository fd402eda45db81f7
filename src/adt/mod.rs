//! Minimal algebraic data types with deferred payloads.
//!
//! This module provides three small tagged containers:
//!
//! - [`Maybe`]: zero or one value
//! - [`Either`]: exactly one value, on one of two arms
//! - [`Pair`]: exactly two values, each independently lazy
//!
//! All three hold their payloads as [`Deferred`](crate::control::Deferred)
//! values, are built only through named constructors, and expose one-step
//! dispatch in two flavours: an eager one that forces the payload before
//! the handler runs, and a lazy one that hands the still-deferred payload
//! to the handler. Exactly one handler executes per dispatch.
//!
//! # Examples
//!
//! ```rust
//! use lazyseq::adt::{Either, Maybe};
//!
//! let present = Maybe::just(21).map(|n| n * 2);
//! assert_eq!(present.get_or_else(0), 42);
//!
//! let failure: Either<&str, i32> = Either::left("boom");
//! let message = failure.cases(|error| format!("failed: {error}"), |n| n.to_string());
//! assert_eq!(message, "failed: boom");
//! ```

mod either;
mod maybe;
mod pair;

pub use either::Either;
pub use maybe::Maybe;
pub use pair::Pair;
