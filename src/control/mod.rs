//! Control structures for lazy evaluation and stack-safe recursion.
//!
//! This module provides the two foundational mechanisms the rest of the
//! crate is built from:
//!
//! - [`Deferred`]: a shareable, memoizing suspension of a zero-argument
//!   computation (run at most once, outcome cached)
//! - [`SyncDeferred`]: the thread-safe variant of [`Deferred`]
//! - [`Trampoline`]: recursion represented as data and driven by an
//!   iterative loop, safe for unbounded depth
//! - [`fix`] / [`recurse`]: fixed-point combinators for recursive
//!   closures that never need a name
//!
//! # Examples
//!
//! ## Deferred Evaluation
//!
//! ```rust
//! use lazyseq::control::Deferred;
//!
//! let deferred = Deferred::new(|| {
//!     println!("Computing...");
//!     42
//! });
//! // "Computing..." is not printed yet
//!
//! let value = deferred.force();
//! // Now "Computing..." is printed and value is 42
//! assert_eq!(*value, 42);
//! ```
//!
//! ## Stack-Safe Recursion
//!
//! ```rust
//! use lazyseq::control::Trampoline;
//!
//! fn count_down(n: u64) -> Trampoline<u64> {
//!     if n == 0 {
//!         Trampoline::done(0)
//!     } else {
//!         Trampoline::more(move || count_down(n - 1))
//!     }
//! }
//!
//! assert_eq!(count_down(100_000).run(), 0);
//! ```

mod deferred;
mod fix;
#[cfg(feature = "sync")]
mod sync_deferred;
mod trampoline;

pub use deferred::{Deferred, PoisonedError};
pub use fix::{RecFn, RecFn2, RecTramp, RecTramp2, fix, fix2, fix2_tramp, fix_tramp, recurse, recurse2};
#[cfg(feature = "sync")]
pub use sync_deferred::SyncDeferred;
pub use trampoline::Trampoline;
