//! Deferred evaluation with memoization.
//!
//! This module provides [`Deferred<T>`], a shareable suspension of a
//! zero-argument computation. The computation runs at most once across the
//! lifetime of the value and all of its clones; every later read observes
//! the cached outcome.
//!
//! # Error Replay
//!
//! A fallible computation is wrapped as `Deferred<Result<T, Rc<E>>>` (see
//! [`Deferred::catching`]). Because the cached `Result` is cloned on every
//! read, the *same* error allocation is handed back each time, so callers
//! can assert replay identity with [`Rc::ptr_eq`]. The cache, not the
//! underlying source, is authoritative after the first force.
//!
//! # Examples
//!
//! ```rust
//! use lazyseq::control::Deferred;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let runs = Rc::new(Cell::new(0));
//! let probe = Rc::clone(&runs);
//! let deferred = Deferred::new(move || {
//!     probe.set(probe.get() + 1);
//!     42
//! });
//!
//! assert_eq!(runs.get(), 0); // Not run yet
//!
//! let copy = deferred.clone();
//! assert_eq!(*deferred.force(), 42);
//! assert_eq!(*copy.force(), 42); // Served from the shared cache
//! assert_eq!(runs.get(), 1);
//! ```

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

/// The internal state of a [`Deferred`] value.
///
/// Transitions are one-way: `Unevaluated` moves to `Evaluated` on a
/// successful force, or sticks at `Poisoned` if the computation panics.
/// The `Poisoned` marker is also installed while the computation runs, so
/// a re-entrant force fails with a descriptive panic instead of aborting
/// on a `RefCell` borrow error.
enum DeferredState<T> {
    /// The computation has not run yet.
    Unevaluated(Box<dyn FnOnce() -> T>),
    /// The computation is currently running, or it panicked.
    Poisoned,
    /// The computation finished and its result is cached.
    Evaluated(T),
}

/// Error returned when a [`Deferred`] value cannot produce its result.
///
/// Returned by [`Deferred::try_into_inner`] when the wrapped computation
/// panicked on an earlier force.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoisonedError;

impl fmt::Display for PoisonedError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "deferred value has been poisoned")
    }
}

impl std::error::Error for PoisonedError {}

/// A shareable, memoizing suspension of a zero-argument computation.
///
/// `Deferred<T>` defers its computation until the first [`force`] and
/// caches the result. Cloning a `Deferred` shares the cache slot, so a
/// force through any clone satisfies every other clone as well. This
/// co-ownership is what the sequence types rely on for structural sharing
/// of suspended suffixes.
///
/// # Thread Safety
///
/// `Deferred` is intentionally `!Send + !Sync`; the single-execution
/// guarantee therefore holds trivially within a thread. For values shared
/// between threads use [`SyncDeferred`](super::SyncDeferred).
///
/// # Examples
///
/// ```rust
/// use lazyseq::control::Deferred;
///
/// let deferred = Deferred::new(|| "expensive".len());
/// assert!(!deferred.is_evaluated());
/// assert_eq!(*deferred.force(), 9);
/// assert!(deferred.is_evaluated());
/// ```
///
/// [`force`]: Deferred::force
pub struct Deferred<T> {
    state: Rc<RefCell<DeferredState<T>>>,
}

impl<T> Clone for Deferred<T> {
    /// Returns a handle sharing the same cache slot.
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T: 'static> Deferred<T> {
    /// Creates a new deferred value with the given computation.
    ///
    /// The computation will not run until [`force`](Deferred::force) is
    /// invoked on this value or one of its clones.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::control::Deferred;
    ///
    /// let deferred = Deferred::new(|| {
    ///     println!("Initializing...");
    ///     42
    /// });
    /// // Nothing printed yet
    /// ```
    #[inline]
    pub fn new<F>(computation: F) -> Self
    where
        F: FnOnce() -> T + 'static,
    {
        Self {
            state: Rc::new(RefCell::new(DeferredState::Unevaluated(Box::new(
                computation,
            )))),
        }
    }

    /// Wraps a fallible computation, pinning its error behind an [`Rc`].
    ///
    /// The cached `Result` is cloned on every force, so a failing
    /// computation replays the *same* error allocation each time.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::control::Deferred;
    /// use std::rc::Rc;
    ///
    /// let deferred = Deferred::catching(|| "not a number".parse::<i32>());
    /// let first = deferred.force_cloned().unwrap_err();
    /// let second = deferred.force_cloned().unwrap_err();
    /// assert!(Rc::ptr_eq(&first, &second));
    /// ```
    #[inline]
    pub fn catching<F, E>(computation: F) -> Deferred<Result<T, Rc<E>>>
    where
        F: FnOnce() -> Result<T, E> + 'static,
        E: 'static,
    {
        Deferred::new(move || computation().map_err(Rc::new))
    }
}

impl<T> Deferred<T> {
    /// Creates a deferred value that is already evaluated.
    ///
    /// Useful when an eagerly available value has to flow through an API
    /// that expects laziness.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::control::Deferred;
    ///
    /// let deferred = Deferred::ready(42);
    /// assert!(deferred.is_evaluated());
    /// assert_eq!(*deferred.force(), 42);
    /// ```
    #[inline]
    pub fn ready(value: T) -> Self {
        Self {
            state: Rc::new(RefCell::new(DeferredState::Evaluated(value))),
        }
    }

    /// Forces evaluation and returns a reference to the cached value.
    ///
    /// The first call through any clone runs the computation; every later
    /// call reads the cache. The returned [`Ref`] keeps a shared borrow of
    /// the cache slot alive, so drop it before forcing derived values that
    /// share this slot.
    ///
    /// # Panics
    ///
    /// - If the computation panics; the value is poisoned and all later
    ///   forces panic as well.
    /// - If called re-entrantly from inside the computation itself.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::control::Deferred;
    ///
    /// let deferred = Deferred::new(|| 21 * 2);
    /// assert_eq!(*deferred.force(), 42);
    /// ```
    pub fn force(&self) -> Ref<'_, T> {
        let needs_evaluation = {
            match &*self.state.borrow() {
                DeferredState::Evaluated(_) => false,
                DeferredState::Poisoned => panic!("deferred value has been poisoned"),
                DeferredState::Unevaluated(_) => true,
            }
        };

        if needs_evaluation {
            self.evaluate();
        }

        Ref::map(self.state.borrow(), |state| match state {
            DeferredState::Evaluated(value) => value,
            _ => unreachable!("deferred state settled by evaluate()"),
        })
    }

    /// Forces evaluation and returns a clone of the cached value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::control::Deferred;
    ///
    /// let deferred = Deferred::new(|| vec![1, 2, 3]);
    /// assert_eq!(deferred.force_cloned(), vec![1, 2, 3]);
    /// ```
    #[inline]
    pub fn force_cloned(&self) -> T
    where
        T: Clone,
    {
        self.force().clone()
    }

    /// Runs the suspended computation and installs the cache entry.
    ///
    /// The borrow on the state slot is released while the computation
    /// runs; a re-entrant force during that window observes the poisoned
    /// marker rather than a `RefCell` borrow abort.
    fn evaluate(&self) {
        let computation = {
            let mut state = self.state.borrow_mut();
            match &*state {
                DeferredState::Evaluated(_) => return,
                DeferredState::Poisoned => panic!("deferred value has been poisoned"),
                DeferredState::Unevaluated(_) => {}
            }
            let DeferredState::Unevaluated(computation) =
                std::mem::replace(&mut *state, DeferredState::Poisoned)
            else {
                unreachable!("state checked above")
            };
            computation
        };

        let value = computation();
        *self.state.borrow_mut() = DeferredState::Evaluated(value);
    }

    /// Returns a reference to the value if it has already been computed.
    ///
    /// Unlike [`force`](Deferred::force), this never triggers evaluation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::control::Deferred;
    ///
    /// let deferred = Deferred::new(|| 42);
    /// assert!(deferred.get().is_none());
    ///
    /// deferred.force();
    /// assert_eq!(deferred.get().as_deref(), Some(&42));
    /// ```
    pub fn get(&self) -> Option<Ref<'_, T>> {
        let state = self.state.borrow();
        if matches!(&*state, DeferredState::Evaluated(_)) {
            Some(Ref::map(state, |state| match state {
                DeferredState::Evaluated(value) => value,
                _ => unreachable!(),
            }))
        } else {
            None
        }
    }

    /// Returns whether the value has been computed.
    #[inline]
    pub fn is_evaluated(&self) -> bool {
        matches!(&*self.state.borrow(), DeferredState::Evaluated(_))
    }

    /// Returns whether the computation panicked on an earlier force.
    #[inline]
    pub fn is_poisoned(&self) -> bool {
        matches!(&*self.state.borrow(), DeferredState::Poisoned)
    }

    /// Consumes the deferred value and returns the result.
    ///
    /// Forces the computation if it has not run yet. When this handle is
    /// the last one the cached value is moved out; otherwise it is cloned.
    ///
    /// # Errors
    ///
    /// Returns [`PoisonedError`] if the computation panicked earlier.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::control::Deferred;
    ///
    /// let deferred = Deferred::new(|| 42);
    /// assert_eq!(deferred.try_into_inner(), Ok(42));
    /// ```
    pub fn try_into_inner(self) -> Result<T, PoisonedError>
    where
        T: Clone,
    {
        match Rc::try_unwrap(self.state) {
            Ok(cell) => match cell.into_inner() {
                DeferredState::Evaluated(value) => Ok(value),
                DeferredState::Unevaluated(computation) => Ok(computation()),
                DeferredState::Poisoned => Err(PoisonedError),
            },
            Err(state) => {
                let shared = Self { state };
                if shared.is_poisoned() {
                    Err(PoisonedError)
                } else {
                    Ok(shared.force_cloned())
                }
            }
        }
    }
}

// =============================================================================
// Lazy Composition (map, flat_map, zip_with)
// =============================================================================

impl<T: Clone + 'static> Deferred<T> {
    /// Applies a function to the value, producing a new deferred value.
    ///
    /// The source is shared, not consumed: forcing the result also fills
    /// the source's cache.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::control::Deferred;
    ///
    /// let deferred = Deferred::new(|| 21);
    /// let doubled = deferred.map(|x| x * 2);
    ///
    /// assert_eq!(*doubled.force(), 42);
    /// assert!(deferred.is_evaluated());
    /// ```
    pub fn map<U, F>(&self, function: F) -> Deferred<U>
    where
        U: 'static,
        F: FnOnce(T) -> U + 'static,
    {
        let source = self.clone();
        Deferred::new(move || function(source.force_cloned()))
    }

    /// Applies a function returning a deferred value, then flattens.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::control::Deferred;
    ///
    /// let deferred = Deferred::new(|| 21);
    /// let result = deferred.flat_map(|x| Deferred::new(move || x * 2));
    ///
    /// assert_eq!(*result.force(), 42);
    /// ```
    pub fn flat_map<U, F>(&self, function: F) -> Deferred<U>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> Deferred<U> + 'static,
    {
        let source = self.clone();
        Deferred::new(move || function(source.force_cloned()).force_cloned())
    }

    /// Combines two deferred values with a function, lazily.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::control::Deferred;
    ///
    /// let left = Deferred::new(|| 20);
    /// let right = Deferred::new(|| 22);
    /// let sum = left.zip_with(&right, |a, b| a + b);
    ///
    /// assert_eq!(*sum.force(), 42);
    /// ```
    pub fn zip_with<U, V, F>(&self, other: &Deferred<U>, function: F) -> Deferred<V>
    where
        U: Clone + 'static,
        V: 'static,
        F: FnOnce(T, U) -> V + 'static,
    {
        let left = self.clone();
        let right = other.clone();
        Deferred::new(move || function(left.force_cloned(), right.force_cloned()))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl<T: Default + 'static> Default for Deferred<T> {
    /// Creates a deferred value that computes `T::default()`.
    fn default() -> Self {
        Self::new(T::default)
    }
}

impl<T: fmt::Debug> fmt::Debug for Deferred<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.state.borrow() {
            DeferredState::Evaluated(value) => {
                formatter.debug_tuple("Deferred").field(value).finish()
            }
            DeferredState::Unevaluated(_) => formatter
                .debug_tuple("Deferred")
                .field(&"<unevaluated>")
                .finish(),
            DeferredState::Poisoned => formatter
                .debug_tuple("Deferred")
                .field(&"<poisoned>")
                .finish(),
        }
    }
}

static_assertions::assert_not_impl_any!(Deferred<i32>: Send, Sync);
