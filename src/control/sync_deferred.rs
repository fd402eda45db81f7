//! Thread-safe deferred evaluation with memoization.
//!
//! This module provides [`SyncDeferred<T>`], the thread-safe sibling of
//! [`Deferred`](super::Deferred). The single-execution guarantee is upheld
//! under concurrent forcing by an exclusive lock scoped to the first
//! evaluation: the winning thread runs the computation while competitors
//! block on the lock, then read the freshly installed cache.
//!
//! # Re-entry Warning
//!
//! Calling `force()` from within the computation on the same value
//! deadlocks, because the evaluation lock is already held. Keep wrapped
//! computations free of self-references.
//!
//! # Examples
//!
//! ```rust
//! use lazyseq::control::SyncDeferred;
//! use std::thread;
//!
//! let deferred = SyncDeferred::new(|| 42);
//!
//! let handles: Vec<_> = (0..8)
//!     .map(|_| {
//!         let deferred = deferred.clone();
//!         thread::spawn(move || deferred.force())
//!     })
//!     .collect();
//!
//! // Every thread observes the same value; the computation ran once.
//! for handle in handles {
//!     assert_eq!(handle.join().unwrap(), 42);
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use super::deferred::PoisonedError;

/// The internal state of a [`SyncDeferred`] value.
///
/// The `Poisoned` marker is installed before the computation runs; if the
/// computation panics the state never advances, so later forces fail
/// loudly instead of rerunning a computation whose side effects may have
/// partially happened.
enum SyncState<T> {
    /// The computation has not run yet.
    Unevaluated(Box<dyn FnOnce() -> T + Send>),
    /// The computation is running, or it panicked.
    Poisoned,
    /// The computation finished and its result is cached.
    Evaluated(T),
}

/// A thread-safe, shareable, memoizing suspension of a computation.
///
/// `SyncDeferred<T>` defers its computation until the first
/// [`force`](SyncDeferred::force) and caches the result. Clones share the
/// cache slot. When several threads race on the first force, exactly one
/// executes the computation; the rest block until the cache is filled.
///
/// Results are handed out by clone, which keeps the lock hold time short
/// and avoids tying guard lifetimes to caller scopes.
///
/// # Examples
///
/// ```rust
/// use lazyseq::control::SyncDeferred;
///
/// let deferred = SyncDeferred::new(|| "expensive".len());
/// assert!(!deferred.is_evaluated());
/// assert_eq!(deferred.force(), 9);
/// ```
pub struct SyncDeferred<T> {
    state: Arc<Mutex<SyncState<T>>>,
}

impl<T> Clone for SyncDeferred<T> {
    /// Returns a handle sharing the same cache slot.
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T: 'static> SyncDeferred<T> {
    /// Creates a new thread-safe deferred value.
    ///
    /// The computation will not run until `force()` is invoked through
    /// some clone of this value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::control::SyncDeferred;
    ///
    /// let deferred = SyncDeferred::new(|| {
    ///     println!("Initializing...");
    ///     42
    /// });
    /// // Nothing printed yet
    /// ```
    #[inline]
    pub fn new<F>(computation: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        Self {
            state: Arc::new(Mutex::new(SyncState::Unevaluated(Box::new(computation)))),
        }
    }

    /// Wraps a fallible computation, pinning its error behind an [`Arc`].
    ///
    /// The cached `Result` is cloned on every force, so a failing
    /// computation replays the *same* error allocation to every thread,
    /// assertable with [`Arc::ptr_eq`].
    #[inline]
    pub fn catching<F, E>(computation: F) -> SyncDeferred<Result<T, Arc<E>>>
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        E: 'static,
    {
        SyncDeferred::new(move || computation().map_err(Arc::new))
    }
}

impl<T> SyncDeferred<T> {
    /// Creates a thread-safe deferred value that is already evaluated.
    #[inline]
    pub fn ready(value: T) -> Self {
        Self {
            state: Arc::new(Mutex::new(SyncState::Evaluated(value))),
        }
    }

    /// Forces evaluation and returns a clone of the cached value.
    ///
    /// The first call runs the computation under the evaluation lock;
    /// concurrent callers block until the cache is filled, then read it.
    /// Later calls only take the lock long enough to clone the cache.
    ///
    /// # Panics
    ///
    /// - If the computation panics; the value is poisoned and all later
    ///   forces panic as well.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::control::SyncDeferred;
    ///
    /// let deferred = SyncDeferred::new(|| 21 * 2);
    /// assert_eq!(deferred.force(), 42);
    /// ```
    pub fn force(&self) -> T
    where
        T: Clone,
    {
        let mut state = self.state.lock();
        match &*state {
            SyncState::Evaluated(value) => return value.clone(),
            SyncState::Poisoned => panic!("sync deferred value has been poisoned"),
            SyncState::Unevaluated(_) => {}
        }

        let SyncState::Unevaluated(computation) =
            std::mem::replace(&mut *state, SyncState::Poisoned)
        else {
            unreachable!("state checked above")
        };

        // The lock is held across the first evaluation on purpose: a racing
        // force must block here rather than run the computation a second
        // time. If the computation unwinds, the lock is released and the
        // state stays poisoned.
        let value = computation();
        *state = SyncState::Evaluated(value.clone());
        value
    }

    /// Returns a clone of the value if it has already been computed.
    ///
    /// Never triggers evaluation.
    pub fn get(&self) -> Option<T>
    where
        T: Clone,
    {
        match &*self.state.lock() {
            SyncState::Evaluated(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// Returns whether the value has been computed.
    #[inline]
    pub fn is_evaluated(&self) -> bool {
        matches!(&*self.state.lock(), SyncState::Evaluated(_))
    }

    /// Returns whether the computation panicked on an earlier force.
    #[inline]
    pub fn is_poisoned(&self) -> bool {
        matches!(&*self.state.lock(), SyncState::Poisoned)
    }

    /// Consumes the deferred value and returns the result.
    ///
    /// Forces the computation if it has not run yet.
    ///
    /// # Errors
    ///
    /// Returns [`PoisonedError`] if the computation panicked earlier.
    pub fn try_into_inner(self) -> Result<T, PoisonedError>
    where
        T: Clone,
    {
        match Arc::try_unwrap(self.state) {
            Ok(mutex) => match mutex.into_inner() {
                SyncState::Evaluated(value) => Ok(value),
                SyncState::Unevaluated(computation) => Ok(computation()),
                SyncState::Poisoned => Err(PoisonedError),
            },
            Err(state) => {
                let shared = Self { state };
                if shared.is_poisoned() {
                    Err(PoisonedError)
                } else {
                    Ok(shared.force())
                }
            }
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SyncDeferred<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.state.lock() {
            SyncState::Evaluated(value) => {
                formatter.debug_tuple("SyncDeferred").field(value).finish()
            }
            SyncState::Unevaluated(_) => formatter
                .debug_tuple("SyncDeferred")
                .field(&"<unevaluated>")
                .finish(),
            SyncState::Poisoned => formatter
                .debug_tuple("SyncDeferred")
                .field(&"<poisoned>")
                .finish(),
        }
    }
}

static_assertions::assert_impl_all!(SyncDeferred<i32>: Send, Sync);
